//! Codec for the Erlang External Term Format (ETF), version 131: the wire
//! format behind `term_to_binary/1` and `binary_to_term/1`. See
//! [`decode`]/[`encode`] for the two entry points.

mod atom;
mod bit_binary;
mod decode;
mod encode;
mod error;
mod export;
mod fallback;
mod framing;
mod pid;
mod port;
mod reader;
mod reference;
mod tag;
mod term;
mod writer;

pub use atom::Atom;
pub use bit_binary::BitBinary;
pub use error::{DecodeError, EncodeError, TermError};
pub use export::Export;
pub use fallback::{Fallback, FallbackBridge};
pub use framing::Compression;
pub use pid::Pid;
pub use port::Port;
pub use reference::Reference;
pub use term::Term;

/// Decodes one framed term from `bytes`, returning it together with the
/// unread suffix so callers can pack several frames back to back. Any
/// `(python_pickle, Binary)` 2-tuple on the wire is left as a plain
/// [`Term::Tuple`]; use [`decode_with_bridge`] to resolve it through a
/// [`FallbackBridge`].
pub fn decode(bytes: &[u8]) -> Result<(Term, &[u8]), DecodeError> {
    framing::decode(bytes, None)
}

/// Like [`decode`], but resolves `(python_pickle, Binary)` 2-tuples through
/// `bridge`.
pub fn decode_with_bridge<'a>(
    bytes: &'a [u8],
    bridge: &dyn FallbackBridge,
) -> Result<(Term, &'a [u8]), DecodeError> {
    framing::decode(bytes, Some(bridge))
}

/// Encodes `term` into a framed byte sequence, optionally deflating the
/// payload. A [`Term::Fallback`] value fails with
/// [`EncodeError::UnsupportedType`]; use [`encode_with_bridge`] to carry it.
pub fn encode(term: &Term, compression: Compression) -> Result<Vec<u8>, EncodeError> {
    framing::encode(term, compression, None)
}

/// Like [`encode`], but routes any [`Term::Fallback`] value through `bridge`.
pub fn encode_with_bridge(
    term: &Term,
    compression: Compression,
    bridge: &dyn FallbackBridge,
) -> Result<Vec<u8>, EncodeError> {
    framing::encode(term, compression, Some(bridge))
}

#[cfg(test)]
mod tests {
    use super::*;
    use num::bigint::BigInt;
    use std::any::Any;
    use std::sync::Arc;

    #[test]
    fn public_round_trip() {
        let term = Term::Tuple(vec![Term::atom("ok").unwrap(), Term::Integer(BigInt::from(42))]);
        let bytes = encode(&term, Compression::Off).unwrap();
        let (decoded, tail) = decode(&bytes).unwrap();
        assert_eq!(decoded, term);
        assert!(tail.is_empty());
    }

    struct EchoBridge;

    impl FallbackBridge for EchoBridge {
        fn serialize(&self, value: &(dyn Any + Send + Sync)) -> Option<Vec<u8>> {
            value.downcast_ref::<Vec<u8>>().cloned()
        }

        fn deserialize(&self, bytes: &[u8]) -> Option<Term> {
            Some(Term::Binary(bytes.to_vec()))
        }
    }

    #[test]
    fn fallback_bridge_round_trips_through_public_api() {
        let bridge = EchoBridge;
        let payload = vec![1u8, 2, 3];
        let term = Term::Fallback(Fallback(Arc::new(payload.clone())));
        let bytes = encode_with_bridge(&term, Compression::Off, &bridge).unwrap();
        let (decoded, _) = decode_with_bridge(&bytes, &bridge).unwrap();
        assert_eq!(decoded, Term::Binary(payload));
    }
}
