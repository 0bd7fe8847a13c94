//! Error taxonomy for the codec. Kept as two closed enums, one per direction,
//! the way the crate this codec is ported from does it.

use thiserror::Error;

/// Errors which can occur while constructing a term value (outside of
/// decoding a wire payload). These enforce the invariants of the opaque
/// runtime-identity types at the API boundary rather than at every call site.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TermError {
    #[error("atom name too long: {0} bytes (max 255)")]
    AtomTooLong(usize),
    #[error("bit binary tail-bit count out of range: {0} (must be 1..=8)")]
    BitBinaryBitsOutOfRange(u8),
    #[error("reference must carry at least one id word")]
    EmptyReferenceId,
}

/// Errors which can occur when decoding a term.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Input exhausted mid-term. Carries the complete buffer that was being
    /// decoded, so a caller can buffer more bytes and retry.
    #[error("incomplete data: needed more bytes than the {} available", input.len())]
    IncompleteData { input: Vec<u8> },

    #[error("unsupported version byte: {version}")]
    BadVersion { version: u8 },

    #[error("bad compression: {0}")]
    BadCompression(String),

    #[error("unsupported term tag: {tag}")]
    UnsupportedTag { tag: u8 },

    #[error("expected a term of type {expected}")]
    UnexpectedType { expected: &'static str },

    #[error("integer {value} out of range {min}..={max}")]
    OutOfRange { value: i64, min: i64, max: i64 },

    #[error("malformed legacy float text")]
    MalformedLegacyFloat,

    #[error("recursion depth limit of {limit} exceeded")]
    DepthExceeded { limit: usize },

    #[error(transparent)]
    Invariant(#[from] TermError),
}

/// Errors which can occur when encoding a term.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("length or arity {0} exceeds the wire-format limit")]
    EncodeOverflow(u64),

    #[error("invalid field {field}: expected {expected} bytes, found {found}")]
    InvalidField {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("no encoding rule for this term and no fallback bridge accepted it")]
    UnsupportedType,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
