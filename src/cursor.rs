//! Bounds-checked little-endian cursor over a byte buffer
//!
//! Row buffers and localization blobs are walked sequentially with this
//! cursor. Every read advances the position by exactly the width of the type
//! read; a read that would pass the end of the buffer fails with
//! [`Error::OutOfBounds`] and leaves the position untouched.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// Sequential reader over an immutable byte region.
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        ByteCursor { buf, pos: 0 }
    }

    /// Current read position in bytes from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes left between the position and the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, width: usize) -> Result<&'a [u8]> {
        if self.pos + width > self.buf.len() {
            return Err(Error::OutOfBounds {
                position: self.pos,
                width,
                len: self.buf.len(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + width];
        self.pos += width;
        Ok(slice)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(LittleEndian::read_i16(self.take(2)?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(LittleEndian::read_i64(self.take(8)?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(LittleEndian::read_f32(self.take(4)?))
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Raw byte 1 is `true`, anything else is `false`. Shipped tables carry
    /// stray values in bool slots, so this is deliberately not an error.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.take(1)?[0] == 1)
    }

    /// Borrow the next `len` bytes and advance past them.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.take(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_reads() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&7i32.to_le_bytes());
        buf.extend_from_slice(&(-2i64).to_le_bytes());
        buf.extend_from_slice(&1.5f32.to_le_bytes());
        buf.extend_from_slice(&300i16.to_le_bytes());
        buf.push(1);

        let mut cur = ByteCursor::new(&buf);
        assert_eq!(cur.read_i32().unwrap(), 7);
        assert_eq!(cur.read_i64().unwrap(), -2);
        assert_eq!(cur.read_f32().unwrap(), 1.5);
        assert_eq!(cur.read_i16().unwrap(), 300);
        assert!(cur.read_bool().unwrap());
        assert_eq!(cur.position(), buf.len());
        assert_eq!(cur.remaining(), 0);
    }

    #[test]
    fn test_out_of_bounds_read_fails_without_advancing() {
        let buf = [0u8; 3];
        let mut cur = ByteCursor::new(&buf);
        match cur.read_i32() {
            Err(Error::OutOfBounds {
                position,
                width,
                len,
            }) => {
                assert_eq!(position, 0);
                assert_eq!(width, 4);
                assert_eq!(len, 3);
            }
            other => panic!("expected OutOfBounds, got {:?}", other.map(|_| ())),
        }
        assert_eq!(cur.position(), 0);
        assert_eq!(cur.read_i16().unwrap(), 0);
    }

    #[test]
    fn test_bool_maps_nonzero_noncanonical_to_false() {
        let buf = [1u8, 0, 2, 255];
        let mut cur = ByteCursor::new(&buf);
        assert!(cur.read_bool().unwrap());
        assert!(!cur.read_bool().unwrap());
        assert!(!cur.read_bool().unwrap());
        assert!(!cur.read_bool().unwrap());
    }

    #[test]
    fn test_read_bytes() {
        let buf = [1u8, 2, 3, 4];
        let mut cur = ByteCursor::new(&buf);
        assert_eq!(cur.read_bytes(3).unwrap(), &[1, 2, 3]);
        assert!(cur.read_bytes(2).is_err());
        assert_eq!(cur.read_bytes(1).unwrap(), &[4]);
    }
}
