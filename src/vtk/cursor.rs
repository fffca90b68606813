//! Byte cursor over a legacy file.
//!
//! Keyword lines are text in both encodings; data blocks are either
//! whitespace separated text or raw big-endian values that start right
//! after the keyword line's newline.

use byteorder::{BigEndian, ReadBytesExt};

use super::format::{Encoding, ScalarType};
use crate::util::{Error, Result};

#[inline]
fn is_space(b: u8) -> bool {
    b.is_ascii_whitespace()
}

pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte offset.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.data.len() && is_space(self.data[self.pos]) {
            self.pos += 1;
        }
    }

    /// True when only whitespace is left.
    pub fn at_end(&mut self) -> bool {
        self.skip_whitespace();
        self.pos >= self.data.len()
    }

    fn token_bytes(&mut self) -> Option<&'a [u8]> {
        self.skip_whitespace();
        if self.pos >= self.data.len() {
            return None;
        }
        let start = self.pos;
        while self.pos < self.data.len() && !is_space(self.data[self.pos]) {
            self.pos += 1;
        }
        Some(&self.data[start..self.pos])
    }

    /// Next whitespace-delimited token, `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<&'a str>> {
        let start = self.pos;
        match self.token_bytes() {
            None => Ok(None),
            Some(bytes) => std::str::from_utf8(bytes)
                .map(Some)
                .map_err(|_| Error::format(start, "non-text bytes where a keyword was expected")),
        }
    }

    /// Next token, failing with a truncation error at end of input.
    pub fn expect_token(&mut self, what: &str) -> Result<&'a str> {
        let pos = self.pos;
        self.next_token()?
            .ok_or_else(|| Error::format(pos, format!("truncated: expected {what}")))
    }

    /// Check the next token case-insensitively without consuming it.
    pub fn peek_is(&self, keyword: &str) -> bool {
        let mut probe = Cursor {
            data: self.data,
            pos: self.pos,
        };
        probe
            .token_bytes()
            .is_some_and(|t| t.eq_ignore_ascii_case(keyword.as_bytes()))
    }

    /// Rest of the current line, without the terminator. Consumes the newline.
    pub fn read_line(&mut self) -> Result<&'a str> {
        let start = self.pos;
        while self.pos < self.data.len() && self.data[self.pos] != b'\n' {
            self.pos += 1;
        }
        let mut end = self.pos;
        if self.pos < self.data.len() {
            self.pos += 1;
        }
        if end > start && self.data[end - 1] == b'\r' {
            end -= 1;
        }
        std::str::from_utf8(&self.data[start..end])
            .map_err(|_| Error::format(start, "header line is not valid text"))
    }

    /// Next line that is not blank. Leading whitespace is skipped.
    pub fn read_nonblank_line(&mut self, what: &str) -> Result<&'a str> {
        loop {
            if self.pos >= self.data.len() {
                return Err(Error::format(self.pos, format!("truncated: expected {what}")));
            }
            let line = self.read_line()?;
            if !line.trim().is_empty() {
                return Ok(line.trim());
            }
        }
    }

    fn parse_ascii<T: std::str::FromStr>(&mut self, what: &str) -> Result<T> {
        let pos = self.pos;
        let tok = self.expect_token(what)?;
        tok.parse::<T>()
            .map_err(|_| Error::format(pos, format!("invalid {what} '{tok}'")))
    }

    fn check_binary_len(&self, count: usize, ty: ScalarType, what: &str) -> Result<()> {
        let needed = count.checked_mul(ty.byte_size());
        match needed {
            Some(n) if n <= self.remaining() => Ok(()),
            _ => Err(Error::format(
                self.pos,
                format!("truncated {what} block: {count} values of {} bytes", ty.byte_size()),
            )),
        }
    }

    /// Read `count` numeric values as `f64`.
    pub fn read_values(
        &mut self,
        count: usize,
        ty: ScalarType,
        encoding: Encoding,
        what: &str,
    ) -> Result<Vec<f64>> {
        match encoding {
            Encoding::Ascii => {
                // Each ASCII value takes at least two bytes.
                let mut out = Vec::with_capacity(count.min(self.remaining() / 2 + 1));
                for _ in 0..count {
                    out.push(self.parse_ascii::<f64>(what)?);
                }
                Ok(out)
            }
            Encoding::Binary => {
                self.check_binary_len(count, ty, what)?;
                let mut rdr = &self.data[self.pos..];
                let mut out = Vec::with_capacity(count);
                for _ in 0..count {
                    let v = match ty {
                        ScalarType::Float => rdr.read_f32::<BigEndian>()? as f64,
                        ScalarType::Double => rdr.read_f64::<BigEndian>()?,
                        _ => read_binary_int(&mut rdr, ty)? as f64,
                    };
                    out.push(v);
                }
                self.pos += count * ty.byte_size();
                Ok(out)
            }
        }
    }

    /// Read `count` integer values (connectivity, offsets, cell types).
    pub fn read_ints(
        &mut self,
        count: usize,
        ty: ScalarType,
        encoding: Encoding,
        what: &str,
    ) -> Result<Vec<i64>> {
        match encoding {
            Encoding::Ascii => {
                let mut out = Vec::with_capacity(count.min(self.remaining() / 2 + 1));
                for _ in 0..count {
                    out.push(self.parse_ascii::<i64>(what)?);
                }
                Ok(out)
            }
            Encoding::Binary => {
                if ty.is_float() {
                    return Err(Error::format(self.pos, format!("{what} must be an integer type")));
                }
                self.check_binary_len(count, ty, what)?;
                let mut rdr = &self.data[self.pos..];
                let mut out = Vec::with_capacity(count);
                for _ in 0..count {
                    out.push(read_binary_int(&mut rdr, ty)?);
                }
                self.pos += count * ty.byte_size();
                Ok(out)
            }
        }
    }
}

fn read_binary_int(rdr: &mut &[u8], ty: ScalarType) -> std::io::Result<i64> {
    Ok(match ty {
        ScalarType::UnsignedChar => rdr.read_u8()? as i64,
        ScalarType::Char => rdr.read_i8()? as i64,
        ScalarType::UnsignedShort => rdr.read_u16::<BigEndian>()? as i64,
        ScalarType::Short => rdr.read_i16::<BigEndian>()? as i64,
        ScalarType::UnsignedInt => rdr.read_u32::<BigEndian>()? as i64,
        ScalarType::Int | ScalarType::IdType => rdr.read_i32::<BigEndian>()? as i64,
        ScalarType::UnsignedLong | ScalarType::UInt64 => rdr.read_u64::<BigEndian>()? as i64,
        ScalarType::Long | ScalarType::Int64 => rdr.read_i64::<BigEndian>()?,
        ScalarType::Float => rdr.read_f32::<BigEndian>()? as i64,
        ScalarType::Double => rdr.read_f64::<BigEndian>()? as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;

    #[test]
    fn test_tokens_and_lines() {
        let mut c = Cursor::new(b"  POINTS 3 float\r\n1 2 3\n");
        assert!(c.peek_is("points"));
        assert_eq!(c.next_token().unwrap(), Some("POINTS"));
        assert_eq!(c.read_line().unwrap(), " 3 float");
        assert_eq!(c.expect_token("x").unwrap(), "1");
        assert_eq!(c.next_token().unwrap(), Some("2"));
        assert_eq!(c.next_token().unwrap(), Some("3"));
        assert_eq!(c.next_token().unwrap(), None);
        assert!(c.at_end());
        assert!(c.expect_token("value").is_err());
    }

    #[test]
    fn test_ascii_values() {
        let mut c = Cursor::new(b"1.5 -2 3e2\n");
        let v = c.read_values(3, ScalarType::Float, Encoding::Ascii, "points").unwrap();
        assert_eq!(v, vec![1.5, -2.0, 300.0]);

        let mut c = Cursor::new(b"1 2 x");
        let err = c.read_ints(3, ScalarType::Int, Encoding::Ascii, "cells").unwrap_err();
        assert!(err.to_string().contains("'x'"));

        let mut c = Cursor::new(b"1 2");
        let err = c.read_values(3, ScalarType::Float, Encoding::Ascii, "points").unwrap_err();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_binary_values() {
        let mut buf = Vec::new();
        buf.write_f32::<BigEndian>(1.25).unwrap();
        buf.write_f32::<BigEndian>(-4.0).unwrap();
        buf.write_i32::<BigEndian>(7).unwrap();
        buf.write_i64::<BigEndian>(-9).unwrap();

        let mut c = Cursor::new(&buf);
        let v = c.read_values(2, ScalarType::Float, Encoding::Binary, "points").unwrap();
        assert_eq!(v, vec![1.25, -4.0]);
        assert_eq!(c.read_ints(1, ScalarType::Int, Encoding::Binary, "cells").unwrap(), vec![7]);
        assert_eq!(c.read_ints(1, ScalarType::Int64, Encoding::Binary, "offsets").unwrap(), vec![-9]);
        assert_eq!(c.pos(), buf.len());

        let mut c = Cursor::new(&buf[..6]);
        assert!(c.read_values(2, ScalarType::Float, Encoding::Binary, "points").is_err());
    }
}
