//! Bounds-checked positional reader over the decoded gamedata buffer.

use crate::{ByteString, Error};
use byteorder::{ByteOrder, LE};

/// A positional reader over an immutable byte buffer. Every read checks the
/// remaining length and fails with [`Error::Truncated`] instead of trusting
/// the container's own length fields.
pub struct DataCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DataCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn with_position(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Takes `len` raw bytes, advancing past them.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], Error> {
        match self.data.get(self.pos..self.pos.wrapping_add(len)) {
            Some(chunk) => {
                self.pos += len;
                Ok(chunk)
            },
            None => Err(Error::Truncated { pos: self.pos, wanted: len }),
        }
    }

    pub fn skip(&mut self, len: usize) -> Result<(), Error> {
        self.take(len).map(|_| ())
    }

    pub fn read_u32(&mut self) -> Result<u32, Error> {
        self.take(4).map(LE::read_u32)
    }

    pub fn read_i32(&mut self) -> Result<i32, Error> {
        self.take(4).map(LE::read_i32)
    }

    pub fn read_f64(&mut self) -> Result<f64, Error> {
        self.take(8).map(LE::read_f64)
    }

    /// Reads a 32-bit word as a boolean flag (nonzero means true).
    pub fn read_bool(&mut self) -> Result<bool, Error> {
        self.read_u32().map(|x| x != 0)
    }

    /// Reads a length-prefixed (Pascal-style) string: a u32 byte count
    /// followed by that many raw bytes, with no terminator.
    pub fn read_pas_string(&mut self) -> Result<ByteString, Error> {
        let len = self.read_u32()? as usize;
        self.take(len).map(ByteString::from)
    }

    /// Reads an asset cross-reference index where `-1` means "none".
    pub fn read_index(&mut self) -> Result<Option<u32>, Error> {
        match self.read_i32()? {
            -1 => Ok(None),
            x => Ok(Some(x as u32)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives() {
        let data =
            [0x01, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x03, 0x00, 0x00, 0x00, b'a', b'b', 0x00];
        let mut cur = DataCursor::new(&data);
        assert_eq!(cur.read_u32().unwrap(), 1);
        assert_eq!(cur.read_i32().unwrap(), -1);
        // "ab\0" - embedded NUL is preserved
        assert_eq!(cur.read_pas_string().unwrap().as_ref(), b"ab\x00");
        assert_eq!(cur.remaining(), 0);
    }

    #[test]
    fn truncated_reads() {
        let data = [0x00, 0x01];
        let mut cur = DataCursor::new(&data);
        match cur.read_u32() {
            Err(Error::Truncated { pos: 0, wanted: 4 }) => {},
            other => panic!("expected truncation, got {:?}", other.err()),
        }
        // position is not advanced by a failed read
        assert_eq!(cur.position(), 0);

        let mut cur = DataCursor::new(&[0x10, 0x00, 0x00, 0x00]);
        assert!(matches!(cur.read_pas_string(), Err(Error::Truncated { .. })));
        assert!(matches!(DataCursor::new(&[0; 4]).read_f64(), Err(Error::Truncated { .. })));
    }

    #[test]
    fn index_sentinel() {
        let mut cur = DataCursor::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0x05, 0x00, 0x00, 0x00]);
        assert_eq!(cur.read_index().unwrap(), None);
        assert_eq!(cur.read_index().unwrap(), Some(5));
    }
}
