//! Integration tests against the concrete wire scenarios and the round-trip
//! properties the codec is expected to satisfy.

use std::any::Any;

use etf::{decode, decode_with_bridge, encode, encode_with_bridge, Atom, BitBinary, Compression,
          DecodeError, EncodeError, Export, Fallback, FallbackBridge, Pid, Port, Reference, Term};

fn num(n: i64) -> Term {
    Term::Integer(n.into())
}

#[test]
fn decodes_small_integer_zero() {
    let (term, tail) = decode(&[0x83, 0x61, 0x00]).unwrap();
    assert_eq!(term, num(0));
    assert!(tail.is_empty());
}

#[test]
fn decodes_negative_one() {
    let (term, _) = decode(&[0x83, 0x62, 0xFF, 0xFF, 0xFF, 0xFF]).unwrap();
    assert_eq!(term, num(-1));
}

#[test]
fn decodes_empty_list() {
    let (term, tail) = decode(&[0x83, 0x6A]).unwrap();
    assert!(term.is_nil());
    assert!(tail.is_empty());
}

#[test]
fn decodes_small_list() {
    let (term, _) = decode(&[0x83, 0x6B, 0x00, 0x03, 0x01, 0x02, 0x03]).unwrap();
    assert_eq!(term, Term::List(vec![num(1), num(2), num(3)]));
}

#[test]
fn decodes_ok_tuple() {
    let bytes = [0x83, 0x68, 0x02, 0x64, 0x00, 0x02, 0x6F, 0x6B, 0x61, 0x2A];
    let (term, _) = decode(&bytes).unwrap();
    assert_eq!(term, Term::Tuple(vec![Term::atom("ok").unwrap(), num(42)]));
}

#[test]
fn decodes_boolean_true() {
    let bytes = [0x83, 0x64, 0x00, 0x04, 0x74, 0x72, 0x75, 0x65];
    let (term, _) = decode(&bytes).unwrap();
    assert_eq!(term, Term::Boolean(true));
}

#[test]
fn decodes_empty_binary() {
    let (term, _) = decode(&[0x83, 0x6D, 0x00, 0x00, 0x00, 0x00]).unwrap();
    assert_eq!(term, Term::Binary(Vec::new()));
}

#[test]
fn encodes_empty_tuple() {
    let bytes = encode(&Term::Tuple(Vec::new()), Compression::Off).unwrap();
    assert_eq!(bytes, vec![0x83, 0x68, 0x00]);
}

#[test]
fn encodes_small_list() {
    let term = Term::List(vec![num(1), num(2), num(3)]);
    let bytes = encode(&term, Compression::Off).unwrap();
    assert_eq!(bytes, vec![0x83, 0x6B, 0x00, 0x03, 0x01, 0x02, 0x03]);
}

#[test]
fn encodes_256_as_integer_ext() {
    let bytes = encode(&num(256), Compression::Off).unwrap();
    assert_eq!(bytes, vec![0x83, 0x62, 0x00, 0x00, 0x01, 0x00]);
}

#[test]
fn encodes_negative_one() {
    let bytes = encode(&num(-1), Compression::Off).unwrap();
    assert_eq!(bytes, vec![0x83, 0x62, 0xFF, 0xFF, 0xFF, 0xFF]);
}

#[test]
fn unicode_text_decodes_back_as_a_list_not_text() {
    // Term::Str has no wire tag of its own: it degrades to STRING_EXT or a
    // code-point list, and both decode back as a plain List.
    let latin1 = Term::text("ok");
    let bytes = encode(&latin1, Compression::Off).unwrap();
    let (decoded, _) = decode(&bytes).unwrap();
    assert_eq!(decoded, Term::List(vec![num(b'o' as i64), num(b'k' as i64)]));

    let wide = Term::text("\u{1F600}");
    let bytes = encode(&wide, Compression::Off).unwrap();
    let (decoded, _) = decode(&bytes).unwrap();
    assert_eq!(decoded, Term::List(vec![num(0x1F600)]));
}

#[test]
fn bit_binary_round_trips() {
    let term = Term::BitBinary(BitBinary::new(vec![0xAB], 4).unwrap());
    let bytes = encode(&term, Compression::Off).unwrap();
    let (decoded, _) = decode(&bytes).unwrap();
    assert_eq!(decoded, term);
}

#[test]
fn non_ascii_latin1_atom_round_trips_through_the_public_api() {
    // decode(0x83 0x64 0x00 0x01 0xE9) used to re-encode as a 2-byte UTF-8
    // atom instead of the original single Latin-1 byte.
    let (term, tail) = decode(&[0x83, 0x64, 0x00, 0x01, 0xE9]).unwrap();
    assert_eq!(term, Term::atom("\u{E9}").unwrap());
    assert!(tail.is_empty());

    let bytes = encode(&term, Compression::Off).unwrap();
    assert_eq!(bytes, vec![0x83, 0x64, 0x00, 0x01, 0xE9]);

    let (decoded, _) = decode(&bytes).unwrap();
    assert_eq!(decoded, term);
}

fn sample_terms() -> Vec<Term> {
    vec![
        num(0),
        num(255),
        num(256),
        num(-1),
        num(-9_000_000_000),
        Term::Integer("123456789012345678901234567890".parse().unwrap()),
        Term::Float(3.5),
        Term::atom("hello").unwrap(),
        Term::atom("\u{E9}cole").unwrap(),
        Term::Binary(vec![1, 2, 3]),
        Term::BitBinary(BitBinary::new(vec![0xF0], 3).unwrap()),
        Term::nil(),
        Term::List(vec![num(1), num(2), num(3)]),
        Term::List(vec![Term::atom("a").unwrap(), num(1000)]),
        Term::Tuple(vec![Term::atom("ok").unwrap(), num(1)]),
        Term::Pid(Pid { node: Atom::new("n@host").unwrap(), id: vec![0, 0, 0, 1], serial: vec![0, 0, 0, 0], creation: 0 }),
        Term::Port(Port { node: Atom::new("n@host").unwrap(), id: vec![0, 0, 0, 1], creation: 0 }),
        Term::Reference(Reference::new(Atom::new("n@host").unwrap(), vec![0, 0, 0, 1, 0, 0, 0, 2], 0).unwrap()),
        Term::Export(Export { module: Atom::new("lists").unwrap(), function: Atom::new("reverse").unwrap(), arity: 1 }),
        Term::Boolean(true),
        Term::Boolean(false),
        Term::Null,
    ]
}

#[test]
fn round_trip_holds_for_every_native_term() {
    for term in sample_terms() {
        let bytes = encode(&term, Compression::Off).unwrap();
        let (decoded, tail) = decode(&bytes).unwrap();
        assert_eq!(decoded, term, "round-trip failed for {:?}", term);
        assert!(tail.is_empty());
    }
}

#[test]
fn every_frame_starts_with_version_byte() {
    for term in sample_terms() {
        let bytes = encode(&term, Compression::Off).unwrap();
        assert_eq!(bytes[0], 0x83);
    }
}

#[test]
fn compression_never_grows_the_frame() {
    for term in sample_terms() {
        let plain = encode(&term, Compression::Off).unwrap();
        let compressed = encode(&term, Compression::Default).unwrap();
        assert!(compressed.len() <= plain.len());
    }
}

#[test]
fn idempotent_re_encode() {
    for term in sample_terms() {
        let once = encode(&term, Compression::Off).unwrap();
        let (decoded, _) = decode(&once).unwrap();
        let twice = encode(&decoded, Compression::Off).unwrap();
        assert_eq!(once, twice);
    }
}

#[test]
fn tail_bytes_survive_past_the_frame() {
    let term = num(7);
    let mut bytes = encode(&term, Compression::Off).unwrap();
    let suffix = [9u8, 9, 9];
    bytes.extend_from_slice(&suffix);
    let (_, tail) = decode(&bytes).unwrap();
    assert_eq!(tail, &suffix);
}

#[test]
fn every_truncation_of_a_valid_frame_is_incomplete() {
    let bytes = encode(&Term::List(vec![num(1), num(2), num(3)]), Compression::Off).unwrap();
    for k in 0..bytes.len() {
        match decode(&bytes[..k]) {
            Err(DecodeError::IncompleteData { .. }) => {}
            other => panic!("truncation at {} did not fail IncompleteData: {:?}", k, other),
        }
    }
}

#[test]
fn unsupported_tags_are_rejected() {
    // Tags known not to appear in the §4.3 table and not requiring further
    // bytes before the dispatch match fails: fun (117), export-fun-ref-like
    // markers, and plain garbage bytes.
    for tag in [0u8, 1, 50, 117, 118, 82, 90, 200, 255] {
        match decode(&[0x83, tag]) {
            Err(DecodeError::UnsupportedTag { tag: observed }) => assert_eq!(observed, tag),
            other => panic!("tag {} did not fail UnsupportedTag: {:?}", tag, other),
        }
    }
}

#[test]
fn compressed_frame_round_trips_and_preserves_tail() {
    let term = Term::Binary(vec![42u8; 8192]);
    let mut bytes = encode(&term, Compression::Level(9)).unwrap();
    assert_eq!(bytes[1], 0x50);
    bytes.extend_from_slice(b"trailing");
    let (decoded, tail) = decode(&bytes).unwrap();
    assert_eq!(decoded, term);
    assert_eq!(tail, b"trailing");
}

#[test]
fn pid_with_wrong_width_id_fails_to_encode() {
    let pid = Term::Pid(Pid {
        node: Atom::new("n@host").unwrap(),
        id: vec![0, 0, 0],
        serial: vec![0, 0, 0, 0],
        creation: 0,
    });
    assert!(encode(&pid, Compression::Off).is_err());
}

struct JsonishBridge;

#[derive(Debug, PartialEq)]
struct HostValue(String);

impl FallbackBridge for JsonishBridge {
    fn serialize(&self, value: &(dyn Any + Send + Sync)) -> Option<Vec<u8>> {
        value.downcast_ref::<HostValue>().map(|v| v.0.clone().into_bytes())
    }

    fn deserialize(&self, bytes: &[u8]) -> Option<Term> {
        std::str::from_utf8(bytes).ok().map(|text| Term::atom(text).ok()).flatten()
    }
}

#[test]
fn fallback_bridge_carries_host_native_values() {
    let bridge = JsonishBridge;
    let term = Term::Fallback(Fallback::new(HostValue("greetings".to_string())));
    let bytes = encode_with_bridge(&term, Compression::Off, &bridge).unwrap();
    let (decoded, _) = decode_with_bridge(&bytes, &bridge).unwrap();
    assert_eq!(decoded, Term::atom("greetings").unwrap());
}

#[test]
fn fallback_without_bridge_fails_closed() {
    let term = Term::Fallback(Fallback::new(HostValue("x".to_string())));
    assert!(encode(&term, Compression::Off).is_err());
}

#[test]
fn unrecognized_two_tuple_is_left_as_a_plain_tuple_without_a_bridge() {
    let term = Term::Tuple(vec![Term::atom("python_pickle").unwrap(), Term::Binary(vec![1, 2, 3])]);
    let bytes = encode(&term, Compression::Off).unwrap();
    let (decoded, _) = decode(&bytes).unwrap();
    assert_eq!(decoded, term);
}

#[test]
fn map_encodes_as_a_sorted_proplist() {
    let k1 = Term::atom("a").unwrap();
    let v1 = num(1);
    let k2 = Term::atom("b").unwrap();
    let v2 = num(2);

    // Entries given out of key order...
    let map = Term::Map(vec![(k2.clone(), v2.clone()), (k1.clone(), v1.clone())]);
    // ...must encode identically to the same pairs already sorted by key and
    // written out as a List of 2-tuples (spec §4.4, §9 orddict compatibility).
    let sorted_list = Term::List(vec![
        Term::Tuple(vec![k1, v1]),
        Term::Tuple(vec![k2, v2]),
    ]);

    assert_eq!(
        encode(&map, Compression::Off).unwrap(),
        encode(&sorted_list, Compression::Off).unwrap()
    );
}

#[test]
fn map_decodes_back_as_the_equivalent_sorted_list() {
    let map = Term::Map(vec![(num(2), Term::atom("two").unwrap()), (num(1), Term::atom("one").unwrap())]);
    let bytes = encode(&map, Compression::Off).unwrap();
    let (decoded, _) = decode(&bytes).unwrap();
    assert_eq!(
        decoded,
        Term::List(vec![
            Term::Tuple(vec![num(1), Term::atom("one").unwrap()]),
            Term::Tuple(vec![num(2), Term::atom("two").unwrap()]),
        ])
    );
}

#[test]
fn corrupt_compressed_frame_fails_with_bad_compression() {
    let term = Term::Binary(vec![7u8; 4096]);
    let mut bytes = encode(&term, Compression::Default).unwrap();
    assert_eq!(bytes[1], 0x50);
    // Flip a byte inside the declared uncompressed-size field so it no
    // longer matches what the (untouched) deflate stream actually inflates
    // to.
    bytes[5] ^= 0xFF;
    match decode(&bytes) {
        Err(DecodeError::BadCompression(_)) => {}
        other => panic!("expected BadCompression, got {:?}", other),
    }
}

#[test]
fn corrupt_deflate_stream_fails_with_bad_compression() {
    let term = Term::Binary(vec![7u8; 4096]);
    let mut bytes = encode(&term, Compression::Default).unwrap();
    assert_eq!(bytes[1], 0x50);
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    assert!(matches!(decode(&bytes), Err(DecodeError::BadCompression(_))));
}

#[test]
fn malformed_legacy_float_text_is_rejected() {
    let mut bytes = vec![0x83, 0x63]; // version, FLOAT_EXT (legacy, tag 99)
    bytes.extend_from_slice(b"not a number");
    bytes.resize(2 + 31, 0);
    match decode(&bytes) {
        Err(DecodeError::MalformedLegacyFloat) => {}
        other => panic!("expected MalformedLegacyFloat, got {:?}", other),
    }
}

#[test]
fn legacy_float_text_parses_the_nul_terminated_prefix() {
    let mut bytes = vec![0x83, 0x63];
    bytes.extend_from_slice(b"3.5");
    bytes.resize(2 + 31, 0);
    let (term, _) = decode(&bytes).unwrap();
    assert_eq!(term, Term::Float(3.5));
}

#[test]
fn reference_with_too_many_id_words_fails_to_encode() {
    let reference = Term::Reference(Reference::new(Atom::new("n@host").unwrap(), vec![0u8; 4 * 65536], 0).unwrap());
    match encode(&reference, Compression::Off) {
        Err(EncodeError::EncodeOverflow(words)) => assert_eq!(words, 65536),
        other => panic!("expected EncodeOverflow, got {:?}", other),
    }
}
