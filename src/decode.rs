//! Tag Decoder: recursive-descent parser from wire tag bytes to [`Term`]
//! values, over a borrowing [`ByteReader`] cursor. Narrowed to the tags
//! `term_to_binary` actually emits for the term set this crate carries (no
//! funs, no atom cache references, no UTF-8 atom variants, no native map
//! encoding).

use num::bigint::{BigInt, Sign};
use num::ToPrimitive;

use crate::atom::Atom;
use crate::bit_binary::BitBinary;
use crate::error::DecodeError;
use crate::export::Export;
use crate::fallback::{FallbackBridge, FALLBACK_ATOM};
use crate::pid::Pid;
use crate::port::Port;
use crate::reader::ByteReader;
use crate::reference::Reference;
use crate::tag;
use crate::term::Term;

/// Generous enough for any realistic term; adversarial input that nests
/// deeper fails closed with [`DecodeError::DepthExceeded`] instead of
/// exhausting the native call stack.
pub const DEFAULT_DEPTH_LIMIT: usize = 1000;

pub(crate) fn decode_term<'a>(
    reader: &mut ByteReader<'a>,
    depth: usize,
    limit: usize,
    bridge: Option<&dyn FallbackBridge>,
) -> Result<Term, DecodeError> {
    if depth > limit {
        return Err(DecodeError::DepthExceeded { limit });
    }
    match reader.take_u8()? {
        tag::SMALL_INTEGER_EXT => Ok(Term::Integer(BigInt::from(reader.take_u8()?))),
        tag::INTEGER_EXT => Ok(Term::Integer(BigInt::from(reader.take_i32_be()?))),
        tag::NEW_FLOAT_EXT => Ok(Term::Float(reader.take_f64_be()?)),
        tag::FLOAT_EXT => decode_legacy_float(reader),
        tag::ATOM_EXT => decode_atom(reader),
        tag::NIL_EXT => Ok(Term::nil()),
        tag::STRING_EXT => decode_string(reader),
        tag::LIST_EXT => decode_list(reader, depth, limit, bridge),
        tag::BINARY_EXT => decode_binary(reader),
        tag::SMALL_TUPLE_EXT => {
            let arity = reader.take_u8()? as usize;
            decode_tuple(reader, arity, depth, limit, bridge)
        }
        tag::LARGE_TUPLE_EXT => {
            let arity = reader.take_u32_be()? as usize;
            decode_tuple(reader, arity, depth, limit, bridge)
        }
        tag::SMALL_BIG_EXT => {
            let len = reader.take_u8()? as usize;
            decode_big_integer(reader, len)
        }
        tag::LARGE_BIG_EXT => {
            let len = reader.take_u32_be()? as usize;
            decode_big_integer(reader, len)
        }
        tag::BIT_BINARY_EXT => decode_bit_binary(reader),
        tag::PID_EXT => decode_pid(reader, depth, limit, bridge),
        tag::REFERENCE_EXT => decode_reference_legacy(reader, depth, limit, bridge),
        tag::PORT_EXT => decode_port(reader, depth, limit, bridge),
        tag::NEW_REFERENCE_EXT => decode_new_reference(reader, depth, limit, bridge),
        tag::EXPORT_EXT => decode_export(reader, depth, limit, bridge),
        other => Err(DecodeError::UnsupportedTag { tag: other }),
    }
}

/// Each wire byte becomes the `char` of the same code point (Latin-1 and the
/// first 256 Unicode scalar values coincide). `encode_atom`'s `latin1_bytes`
/// must map back the same way, one byte per `char`, or atoms above ASCII
/// fail to round-trip.
fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&byte| byte as char).collect()
}

fn decode_atom(reader: &mut ByteReader) -> Result<Term, DecodeError> {
    let len = reader.take_u16_be()? as usize;
    let name = latin1_to_string(reader.take(len)?);
    Ok(match name.as_str() {
        "true" => Term::Boolean(true),
        "false" => Term::Boolean(false),
        "none" => Term::Null,
        _ => Term::Atom(Atom::from_wire(name)?),
    })
}

fn decode_string(reader: &mut ByteReader) -> Result<Term, DecodeError> {
    let len = reader.take_u16_be()? as usize;
    let bytes = reader.take(len)?;
    Ok(Term::List(bytes.iter().map(|&byte| Term::Integer(BigInt::from(byte))).collect()))
}

fn decode_list<'a>(
    reader: &mut ByteReader<'a>,
    depth: usize,
    limit: usize,
    bridge: Option<&dyn FallbackBridge>,
) -> Result<Term, DecodeError> {
    let len = reader.take_u32_be()? as usize;
    let mut elements = Vec::with_capacity(len.min(4096));
    for _ in 0..len {
        elements.push(decode_term(reader, depth + 1, limit, bridge)?);
    }
    // The tail term (Nil for a proper list, anything else for an improper
    // one) is discarded unconditionally; this codec does not preserve
    // improper lists.
    decode_term(reader, depth + 1, limit, bridge)?;
    Ok(Term::List(elements))
}

fn decode_binary(reader: &mut ByteReader) -> Result<Term, DecodeError> {
    let len = reader.take_u32_be()? as usize;
    Ok(Term::Binary(reader.take(len)?.to_vec()))
}

fn decode_tuple<'a>(
    reader: &mut ByteReader<'a>,
    arity: usize,
    depth: usize,
    limit: usize,
    bridge: Option<&dyn FallbackBridge>,
) -> Result<Term, DecodeError> {
    let mut elements = Vec::with_capacity(arity);
    for _ in 0..arity {
        elements.push(decode_term(reader, depth + 1, limit, bridge)?);
    }
    if elements.len() == 2 {
        if let (Term::Atom(atom), Term::Binary(bytes)) = (&elements[0], &elements[1]) {
            if atom.is(FALLBACK_ATOM) {
                if let Some(term) = bridge.and_then(|bridge| bridge.deserialize(bytes)) {
                    return Ok(term);
                }
            }
        }
    }
    Ok(Term::Tuple(elements))
}

fn decode_big_integer(reader: &mut ByteReader, len: usize) -> Result<Term, DecodeError> {
    let sign_byte = reader.take_u8()?;
    let magnitude = reader.take(len)?;
    let sign = if sign_byte == 0 { Sign::Plus } else { Sign::Minus };
    Ok(Term::Integer(BigInt::from_bytes_le(sign, magnitude)))
}

fn decode_bit_binary(reader: &mut ByteReader) -> Result<Term, DecodeError> {
    let len = reader.take_u32_be()? as usize;
    let bits = reader.take_u8()?;
    let bytes = reader.take(len)?.to_vec();
    Ok(Term::BitBinary(BitBinary::new_unchecked(bytes, bits)))
}

fn decode_pid<'a>(
    reader: &mut ByteReader<'a>,
    depth: usize,
    limit: usize,
    bridge: Option<&dyn FallbackBridge>,
) -> Result<Term, DecodeError> {
    let node = decode_term(reader, depth + 1, limit, bridge)?.into_atom()?;
    let id = reader.take(4)?.to_vec();
    let serial = reader.take(4)?.to_vec();
    let creation = reader.take_u8()?;
    Ok(Term::Pid(Pid { node, id, serial, creation }))
}

fn decode_port<'a>(
    reader: &mut ByteReader<'a>,
    depth: usize,
    limit: usize,
    bridge: Option<&dyn FallbackBridge>,
) -> Result<Term, DecodeError> {
    let node = decode_term(reader, depth + 1, limit, bridge)?.into_atom()?;
    let id = reader.take(4)?.to_vec();
    let creation = reader.take_u8()?;
    Ok(Term::Port(Port { node, id, creation }))
}

fn decode_reference_legacy<'a>(
    reader: &mut ByteReader<'a>,
    depth: usize,
    limit: usize,
    bridge: Option<&dyn FallbackBridge>,
) -> Result<Term, DecodeError> {
    let node = decode_term(reader, depth + 1, limit, bridge)?.into_atom()?;
    let id = reader.take(4)?.to_vec();
    let creation = reader.take_u8()?;
    Ok(Term::Reference(Reference::new(node, id, creation)?))
}

fn decode_new_reference<'a>(
    reader: &mut ByteReader<'a>,
    depth: usize,
    limit: usize,
    bridge: Option<&dyn FallbackBridge>,
) -> Result<Term, DecodeError> {
    let word_count = reader.take_u16_be()? as usize;
    let node = decode_term(reader, depth + 1, limit, bridge)?.into_atom()?;
    let creation = reader.take_u8()?;
    let id = reader.take(4 * word_count)?.to_vec();
    Ok(Term::Reference(Reference::new(node, id, creation)?))
}

fn decode_export<'a>(
    reader: &mut ByteReader<'a>,
    depth: usize,
    limit: usize,
    bridge: Option<&dyn FallbackBridge>,
) -> Result<Term, DecodeError> {
    let module = decode_term(reader, depth + 1, limit, bridge)?.into_atom()?;
    let function = decode_term(reader, depth + 1, limit, bridge)?.into_atom()?;
    let arity = term_into_u8(decode_term(reader, depth + 1, limit, bridge)?)?;
    Ok(Term::Export(Export { module, function, arity }))
}

fn term_into_u8(term: Term) -> Result<u8, DecodeError> {
    match term {
        Term::Integer(ref n) => match n.to_i64() {
            Some(value) if (0..=255).contains(&value) => Ok(value as u8),
            Some(value) => Err(DecodeError::OutOfRange { value, min: 0, max: 255 }),
            None => Err(DecodeError::OutOfRange { value: i64::MAX, min: 0, max: 255 }),
        },
        _ => Err(DecodeError::UnexpectedType { expected: "integer" }),
    }
}

fn decode_legacy_float(reader: &mut ByteReader) -> Result<Term, DecodeError> {
    let bytes = reader.take(31)?;
    let end = bytes.iter().position(|&byte| byte == 0).unwrap_or(bytes.len());
    let text = std::str::from_utf8(&bytes[..end]).map_err(|_| DecodeError::MalformedLegacyFloat)?;
    text.trim().parse::<f64>().map(Term::Float).map_err(|_| DecodeError::MalformedLegacyFloat)
}
