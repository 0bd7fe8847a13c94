//! Byte Reader: a cursor over an immutable byte slice. Every operation
//! either advances the cursor and returns borrowed bytes, or signals
//! [`DecodeError::IncompleteData`] without mutating anything.

use byteorder::{BigEndian, ByteOrder};

use crate::error::DecodeError;

pub struct ByteReader<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(input: &'a [u8]) -> ByteReader<'a> {
        ByteReader { input, pos: 0 }
    }

    /// The unread suffix of the original input, for framing multiple terms
    /// back-to-back or for diagnostic context on [`DecodeError::IncompleteData`].
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    fn incomplete(&self) -> DecodeError {
        DecodeError::IncompleteData {
            input: self.input.to_vec(),
        }
    }

    pub fn peek_tag(&self) -> Result<u8, DecodeError> {
        self.input.get(self.pos).copied().ok_or_else(|| self.incomplete())
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.input.len() - self.pos < n {
            return Err(self.incomplete());
        }
        let slice = &self.input[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn take_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn take_u16_be(&mut self) -> Result<u16, DecodeError> {
        Ok(BigEndian::read_u16(self.take(2)?))
    }

    pub fn take_u32_be(&mut self) -> Result<u32, DecodeError> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    pub fn take_i32_be(&mut self) -> Result<i32, DecodeError> {
        Ok(BigEndian::read_i32(self.take(4)?))
    }

    pub fn take_f64_be(&mut self) -> Result<f64, DecodeError> {
        Ok(BigEndian::read_f64(self.take(8)?))
    }
}
