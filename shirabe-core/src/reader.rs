use crate::error::{DwarfError, Result};
use byteorder::{ReadBytesExt, LE};
use std::io::Cursor;

/// Bounds-checked cursor over a byte slice.
///
/// All DWARF decoding goes through this: fixed-width little-endian reads,
/// LEB128 variable-length integers, and NUL-terminated strings. Every read
/// past the end of the slice is a `Format` error, never a panic.
pub struct SliceReader<'a> {
    cur: Cursor<&'a [u8]>,
}

impl<'a> SliceReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cur: Cursor::new(data),
        }
    }

    pub fn pos(&self) -> usize {
        self.cur.position() as usize
    }

    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.cur.get_ref().len() {
            return Err(DwarfError::format(format!(
                "seek to {pos:#x} past end of section ({:#x} bytes)",
                self.cur.get_ref().len()
            )));
        }
        self.cur.set_position(pos as u64);
        Ok(())
    }

    pub fn remaining(&self) -> usize {
        self.cur.get_ref().len() - self.pos()
    }

    fn truncated(at: usize) -> DwarfError {
        DwarfError::format(format!("truncated data at offset {at:#x}"))
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let at = self.pos();
        self.cur.read_u8().map_err(|_| Self::truncated(at))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let at = self.pos();
        self.cur.read_u16::<LE>().map_err(|_| Self::truncated(at))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let at = self.pos();
        self.cur.read_u32::<LE>().map_err(|_| Self::truncated(at))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let at = self.pos();
        self.cur.read_u64::<LE>().map_err(|_| Self::truncated(at))
    }

    /// Returns `count` bytes as a sub-slice and advances past them.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let at = self.pos();
        let data = *self.cur.get_ref();
        if count > data.len() - at {
            return Err(Self::truncated(at));
        }
        self.cur.set_position((at + count) as u64);
        Ok(&data[at..at + count])
    }

    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.read_bytes(count).map(|_| ())
    }

    /// Reads a NUL-terminated string, advancing past the terminator.
    pub fn read_cstr(&mut self) -> Result<&'a str> {
        let at = self.pos();
        let data = *self.cur.get_ref();
        let rest = &data[at..];
        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| DwarfError::format(format!("unterminated string at {at:#x}")))?;
        self.cur.set_position((at + nul + 1) as u64);
        std::str::from_utf8(&rest[..nul])
            .map_err(|_| DwarfError::format(format!("invalid utf-8 string at {at:#x}")))
    }

    pub fn read_uleb128(&mut self) -> Result<u64> {
        let at = self.pos();
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = self.read_u8()?;
            if shift >= 64 {
                return Err(DwarfError::format(format!("LEB128 overflow at {at:#x}")));
            }
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    pub fn read_sleb128(&mut self) -> Result<i64> {
        let at = self.pos();
        let mut value = 0i64;
        let mut shift = 0u32;
        loop {
            let byte = self.read_u8()?;
            if shift >= 64 {
                return Err(DwarfError::format(format!("LEB128 overflow at {at:#x}")));
            }
            value |= i64::from(byte & 0x7f) << shift;
            shift += 7;
            if byte & 0x80 == 0 {
                if shift < 64 && byte & 0x40 != 0 {
                    value |= -1i64 << shift;
                }
                return Ok(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uleb128_single_and_multi_byte() {
        let mut r = SliceReader::new(&[0x00, 0x7f, 0xe5, 0x8e, 0x26]);
        assert_eq!(r.read_uleb128().unwrap(), 0);
        assert_eq!(r.read_uleb128().unwrap(), 127);
        assert_eq!(r.read_uleb128().unwrap(), 624_485);
    }

    #[test]
    fn sleb128_sign_extension() {
        let mut r = SliceReader::new(&[0x7e, 0x9b, 0xf1, 0x59, 0x02]);
        assert_eq!(r.read_sleb128().unwrap(), -2);
        assert_eq!(r.read_sleb128().unwrap(), -624_485);
        assert_eq!(r.read_sleb128().unwrap(), 2);
    }

    #[test]
    fn truncated_reads_fail() {
        let mut r = SliceReader::new(&[0x01]);
        assert!(r.read_u32().is_err());

        let mut r = SliceReader::new(&[0x80, 0x80]);
        assert!(r.read_uleb128().is_err());
    }

    #[test]
    fn cstr_reads_up_to_nul() {
        let mut r = SliceReader::new(b"abc\0def\0");
        assert_eq!(r.read_cstr().unwrap(), "abc");
        assert_eq!(r.read_cstr().unwrap(), "def");
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn cstr_without_terminator_fails() {
        let mut r = SliceReader::new(b"abc");
        assert!(r.read_cstr().is_err());
    }
}
