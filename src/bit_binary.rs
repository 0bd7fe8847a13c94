use crate::error::TermError;

/// A binary whose bit length is not a multiple of 8; the final byte carries
/// only the high `bits` bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitBinary {
    pub bytes: Vec<u8>,
    pub bits: u8,
}

impl BitBinary {
    /// Builds a bit binary, enforcing `1 <= bits <= 8`.
    pub fn new(bytes: Vec<u8>, bits: u8) -> Result<BitBinary, TermError> {
        if bits == 0 || bits > 8 {
            return Err(TermError::BitBinaryBitsOutOfRange(bits));
        }
        Ok(BitBinary { bytes, bits })
    }

    pub(crate) fn new_unchecked(bytes: Vec<u8>, bits: u8) -> BitBinary {
        BitBinary { bytes, bits }
    }
}
