//! Term Encoder: picks the most compact legal wire encoding for each term
//! variant, writing into an owned [`ByteWriter`]. Extended with the Fallback
//! Bridge escape hatch for host-native values with no built-in tag.

use std::cmp::Ordering;

use num::bigint::{BigInt, Sign};
use num::ToPrimitive;

use crate::atom::Atom;
use crate::error::EncodeError;
use crate::export::Export;
use crate::fallback::{Fallback, FallbackBridge, FALLBACK_ATOM};
use crate::pid::Pid;
use crate::port::Port;
use crate::reference::Reference;
use crate::tag;
use crate::term::Term;
use crate::writer::ByteWriter;

pub(crate) fn encode_term(
    term: &Term,
    writer: &mut ByteWriter,
    bridge: Option<&dyn FallbackBridge>,
) -> Result<(), EncodeError> {
    match term {
        // Boolean/Null MUST be checked before the generic Atom/Integer paths:
        // they are wire-identical to atoms, and some host representations of
        // true/false compare equal to 0/1.
        Term::Boolean(true) => encode_atom_name(writer, "true"),
        Term::Boolean(false) => encode_atom_name(writer, "false"),
        Term::Null => encode_atom_name(writer, "none"),
        Term::Atom(atom) => encode_atom(writer, atom),
        Term::Str(text) => encode_unicode_text(writer, text, bridge),
        // BitBinary MUST be checked before Binary: it is a refinement of it.
        Term::BitBinary(bit_binary) => encode_bit_binary(writer, bit_binary),
        Term::Binary(bytes) => encode_binary(writer, bytes),
        Term::Integer(value) => encode_integer(writer, value),
        Term::Float(value) => {
            writer.put_u8(tag::NEW_FLOAT_EXT);
            writer.put_f64_be(*value);
            Ok(())
        }
        Term::List(elements) => encode_list(writer, elements, bridge),
        Term::Tuple(elements) => encode_tuple(writer, elements, bridge),
        Term::Map(entries) => encode_map(writer, entries, bridge),
        Term::Pid(pid) => encode_pid(writer, pid),
        Term::Port(port) => encode_port(writer, port),
        Term::Reference(reference) => encode_reference(writer, reference),
        Term::Export(export) => encode_export(writer, export, bridge),
        Term::Fallback(fallback) => encode_fallback(writer, fallback, bridge),
    }
}

/// Maps each `char` back to the single Latin-1 byte it was decoded from
/// (`decode_atom` maps wire byte `b` to `char` `b as char`, so every code
/// point above 0xFF can only come from an atom never produced by this
/// codec's own decoder). Using `str::as_bytes` here instead would emit the
/// *UTF-8* encoding of the name, silently growing a one-byte wire atom into
/// two or more bytes and breaking round-trip for any non-ASCII atom.
fn latin1_bytes(text: &str) -> Result<Vec<u8>, EncodeError> {
    text.chars()
        .map(|c| {
            u8::try_from(c as u32)
                .map_err(|_| EncodeError::InvalidField { field: "atom", expected: 0xFF, found: c as usize })
        })
        .collect()
}

fn encode_atom(writer: &mut ByteWriter, atom: &Atom) -> Result<(), EncodeError> {
    let bytes = latin1_bytes(&atom.name)?;
    encode_atom_bytes(writer, &bytes)
}

fn encode_atom_name(writer: &mut ByteWriter, name: &str) -> Result<(), EncodeError> {
    // Reserved marker atoms (true/false/none/python_pickle) are ASCII, so
    // this is always a no-op byte-for-byte copy.
    encode_atom_bytes(writer, name.as_bytes())
}

fn encode_atom_bytes(writer: &mut ByteWriter, bytes: &[u8]) -> Result<(), EncodeError> {
    // `Atom::new`/`Atom::reserved` already enforce the 255-byte model limit,
    // so this always fits the wire's u16 length field.
    writer.put_u8(tag::ATOM_EXT);
    writer.put_u16_be(bytes.len() as u16);
    writer.put_bytes(bytes);
    Ok(())
}

fn encode_bit_binary(writer: &mut ByteWriter, bit_binary: &crate::bit_binary::BitBinary) -> Result<(), EncodeError> {
    let len = u32::try_from(bit_binary.bytes.len())
        .map_err(|_| EncodeError::EncodeOverflow(bit_binary.bytes.len() as u64))?;
    writer.put_u8(tag::BIT_BINARY_EXT);
    writer.put_u32_be(len);
    writer.put_u8(bit_binary.bits);
    writer.put_bytes(&bit_binary.bytes);
    Ok(())
}

fn encode_binary(writer: &mut ByteWriter, bytes: &[u8]) -> Result<(), EncodeError> {
    let len = u32::try_from(bytes.len()).map_err(|_| EncodeError::EncodeOverflow(bytes.len() as u64))?;
    writer.put_u8(tag::BINARY_EXT);
    writer.put_u32_be(len);
    writer.put_bytes(bytes);
    Ok(())
}

fn encode_integer(writer: &mut ByteWriter, value: &BigInt) -> Result<(), EncodeError> {
    if let Some(byte) = value.to_u8() {
        writer.put_u8(tag::SMALL_INTEGER_EXT);
        writer.put_u8(byte);
        return Ok(());
    }
    if let Some(word) = value.to_i32() {
        writer.put_u8(tag::INTEGER_EXT);
        writer.put_i32_be(word);
        return Ok(());
    }
    encode_big_integer(writer, value)
}

fn encode_big_integer(writer: &mut ByteWriter, value: &BigInt) -> Result<(), EncodeError> {
    let (sign, magnitude) = value.to_bytes_le();
    let sign_byte = match sign {
        Sign::Minus => 1,
        _ => 0,
    };
    if let Ok(len) = u8::try_from(magnitude.len()) {
        writer.put_u8(tag::SMALL_BIG_EXT);
        writer.put_u8(len);
    } else if let Ok(len) = u32::try_from(magnitude.len()) {
        writer.put_u8(tag::LARGE_BIG_EXT);
        writer.put_u32_be(len);
    } else {
        return Err(EncodeError::EncodeOverflow(magnitude.len() as u64));
    }
    writer.put_u8(sign_byte);
    writer.put_bytes(&magnitude);
    Ok(())
}

fn fits_latin1_byte(term: &Term) -> bool {
    matches!(term, Term::Integer(value) if value.to_u8().is_some())
}

/// Host-side Unicode text is not itself a wire tag: it degrades to STRING_EXT
/// when every code point fits a single Latin-1 byte, and otherwise to a List
/// of code-point integers, matching how `term_to_binary` has no notion of a
/// string distinct from a byte list or an interned atom.
fn encode_unicode_text(
    writer: &mut ByteWriter,
    text: &str,
    bridge: Option<&dyn FallbackBridge>,
) -> Result<(), EncodeError> {
    if text.is_empty() {
        writer.put_u8(tag::NIL_EXT);
        return Ok(());
    }
    let code_points: Vec<u32> = text.chars().map(|c| c as u32).collect();
    if code_points.len() <= 65535 && code_points.iter().all(|&cp| cp <= 0xFF) {
        writer.put_u8(tag::STRING_EXT);
        writer.put_u16_be(code_points.len() as u16);
        for cp in code_points {
            writer.put_u8(cp as u8);
        }
        return Ok(());
    }
    let elements: Vec<Term> = code_points.into_iter().map(|cp| Term::Integer(BigInt::from(cp))).collect();
    encode_list(writer, &elements, bridge)
}

fn encode_list(
    writer: &mut ByteWriter,
    elements: &[Term],
    bridge: Option<&dyn FallbackBridge>,
) -> Result<(), EncodeError> {
    if elements.is_empty() {
        writer.put_u8(tag::NIL_EXT);
        return Ok(());
    }
    if elements.len() <= 65535 && elements.iter().all(fits_latin1_byte) {
        writer.put_u8(tag::STRING_EXT);
        writer.put_u16_be(elements.len() as u16);
        for element in elements {
            if let Term::Integer(value) = element {
                writer.put_u8(value.to_u8().expect("checked by fits_latin1_byte"));
            }
        }
        return Ok(());
    }
    let len = u32::try_from(elements.len()).map_err(|_| EncodeError::EncodeOverflow(elements.len() as u64))?;
    writer.put_u8(tag::LIST_EXT);
    writer.put_u32_be(len);
    for element in elements {
        encode_term(element, writer, bridge)?;
    }
    writer.put_u8(tag::NIL_EXT);
    Ok(())
}

fn encode_tuple(
    writer: &mut ByteWriter,
    elements: &[Term],
    bridge: Option<&dyn FallbackBridge>,
) -> Result<(), EncodeError> {
    if let Ok(arity) = u8::try_from(elements.len()) {
        writer.put_u8(tag::SMALL_TUPLE_EXT);
        writer.put_u8(arity);
    } else if let Ok(arity) = u32::try_from(elements.len()) {
        writer.put_u8(tag::LARGE_TUPLE_EXT);
        writer.put_u32_be(arity);
    } else {
        return Err(EncodeError::EncodeOverflow(elements.len() as u64));
    }
    for element in elements {
        encode_term(element, writer, bridge)?;
    }
    Ok(())
}

/// A total order across variants, used only to turn a [`Term::Map`] into a
/// sorted proplist. Order within mixed key types is implementation-defined;
/// this ranks by variant first so the result is at least stable across runs.
fn term_rank(term: &Term) -> u8 {
    match term {
        Term::Integer(_) => 0,
        Term::Float(_) => 1,
        Term::Atom(_) => 2,
        Term::Str(_) => 3,
        Term::Boolean(_) => 4,
        Term::Null => 5,
        Term::BitBinary(_) => 6,
        Term::Binary(_) => 7,
        Term::List(_) => 8,
        Term::Tuple(_) => 9,
        Term::Map(_) => 10,
        Term::Pid(_) => 11,
        Term::Port(_) => 12,
        Term::Reference(_) => 13,
        Term::Export(_) => 14,
        Term::Fallback(_) => 15,
    }
}

fn term_key_cmp(a: &Term, b: &Term) -> Ordering {
    match (a, b) {
        (Term::Integer(x), Term::Integer(y)) => x.cmp(y),
        (Term::Float(x), Term::Float(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Term::Atom(x), Term::Atom(y)) => x.name.cmp(&y.name),
        (Term::Str(x), Term::Str(y)) => x.cmp(y),
        (Term::Boolean(x), Term::Boolean(y)) => x.cmp(y),
        (Term::Binary(x), Term::Binary(y)) => x.cmp(y),
        _ => term_rank(a).cmp(&term_rank(b)),
    }
}

fn encode_map(
    writer: &mut ByteWriter,
    entries: &[(Term, Term)],
    bridge: Option<&dyn FallbackBridge>,
) -> Result<(), EncodeError> {
    let mut sorted: Vec<&(Term, Term)> = entries.iter().collect();
    sorted.sort_by(|(a, _), (b, _)| term_key_cmp(a, b));
    let as_list: Vec<Term> = sorted
        .into_iter()
        .map(|(key, value)| Term::Tuple(vec![key.clone(), value.clone()]))
        .collect();
    encode_list(writer, &as_list, bridge)
}

fn check_exact_len(field: &'static str, bytes: &[u8], expected: usize) -> Result<(), EncodeError> {
    if bytes.len() != expected {
        return Err(EncodeError::InvalidField { field, expected, found: bytes.len() });
    }
    Ok(())
}

fn encode_pid(writer: &mut ByteWriter, pid: &Pid) -> Result<(), EncodeError> {
    check_exact_len("id", &pid.id, 4)?;
    check_exact_len("serial", &pid.serial, 4)?;
    writer.put_u8(tag::PID_EXT);
    encode_atom(writer, &pid.node)?;
    writer.put_bytes(&pid.id);
    writer.put_bytes(&pid.serial);
    writer.put_u8(pid.creation);
    Ok(())
}

fn encode_port(writer: &mut ByteWriter, port: &Port) -> Result<(), EncodeError> {
    check_exact_len("id", &port.id, 4)?;
    writer.put_u8(tag::PORT_EXT);
    encode_atom(writer, &port.node)?;
    writer.put_bytes(&port.id);
    writer.put_u8(port.creation);
    Ok(())
}

/// Always emits NEW_REFERENCE (114), never the legacy REFERENCE (101) tag the
/// decoder also accepts; this asymmetry is deliberate.
fn encode_reference(writer: &mut ByteWriter, reference: &Reference) -> Result<(), EncodeError> {
    if reference.id.is_empty() || reference.id.len() % 4 != 0 {
        return Err(EncodeError::InvalidField {
            field: "id",
            expected: 4,
            found: reference.id.len(),
        });
    }
    let word_count = u16::try_from(reference.id.len() / 4)
        .map_err(|_| EncodeError::EncodeOverflow((reference.id.len() / 4) as u64))?;
    writer.put_u8(tag::NEW_REFERENCE_EXT);
    writer.put_u16_be(word_count);
    encode_atom(writer, &reference.node)?;
    writer.put_u8(reference.creation);
    writer.put_bytes(&reference.id);
    Ok(())
}

fn encode_export(
    writer: &mut ByteWriter,
    export: &Export,
    bridge: Option<&dyn FallbackBridge>,
) -> Result<(), EncodeError> {
    writer.put_u8(tag::EXPORT_EXT);
    encode_atom(writer, &export.module)?;
    encode_atom(writer, &export.function)?;
    encode_term(&Term::Integer(BigInt::from(export.arity)), writer, bridge)
}

fn encode_fallback(
    writer: &mut ByteWriter,
    fallback: &Fallback,
    bridge: Option<&dyn FallbackBridge>,
) -> Result<(), EncodeError> {
    let bridge = bridge.ok_or(EncodeError::UnsupportedType)?;
    let bytes = bridge.serialize(&*fallback.0).ok_or(EncodeError::UnsupportedType)?;
    let wrapped = Term::Tuple(vec![Term::Atom(Atom::reserved(FALLBACK_ATOM)), Term::Binary(bytes)]);
    encode_term(&wrapped, writer, Some(bridge))
}
