//! Byte Writer: an append-only buffer. Unlike the reader, writing never
//! fails on shape — invariants are enforced earlier, at term construction
//! time (see [`crate::error::TermError`]) — so every method here returns
//! `()`.

use byteorder::{BigEndian, WriteBytesExt};

pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> ByteWriter {
        ByteWriter { buf: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> ByteWriter {
        ByteWriter { buf: Vec::with_capacity(capacity) }
    }

    pub fn put_u8(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    pub fn put_u16_be(&mut self, value: u16) {
        self.buf.write_u16::<BigEndian>(value).expect("Vec<u8> write is infallible");
    }

    pub fn put_u32_be(&mut self, value: u32) {
        self.buf.write_u32::<BigEndian>(value).expect("Vec<u8> write is infallible");
    }

    pub fn put_i32_be(&mut self, value: i32) {
        self.buf.write_i32::<BigEndian>(value).expect("Vec<u8> write is infallible");
    }

    pub fn put_f64_be(&mut self, value: f64) {
        self.buf.write_f64::<BigEndian>(value).expect("Vec<u8> write is infallible");
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for ByteWriter {
    fn default() -> ByteWriter {
        ByteWriter::new()
    }
}
