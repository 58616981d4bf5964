//! Bencode decoding.

use super::value::{Dict, Value};
use crate::{Error, Result};

/// Maximum nesting depth of lists and dictionaries.
///
/// Real torrent files nest a handful of levels deep. The limit keeps a
/// hostile file from exhausting the stack.
pub const MAX_DEPTH: usize = 512;

/// Decodes a complete bencoded document.
///
/// The whole input must be consumed by exactly one value; trailing bytes
/// are rejected so that re-encoding never silently drops data.
///
/// # Errors
///
/// Returns [`Error::InvalidSyntax`] with the byte offset of the problem for
/// truncated input, malformed integers or lengths, non-string or duplicate
/// dictionary keys, excessive nesting, or trailing data.
pub fn decode(input: &[u8]) -> Result<Value> {
    let mut decoder = Decoder {
        data: input,
        pos: 0,
    };
    let value = decoder.read_value(0)?;
    if decoder.pos != input.len() {
        return Err(decoder.error("trailing data after document"));
    }
    Ok(value)
}

struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    fn error(&self, reason: &'static str) -> Error {
        Error::InvalidSyntax {
            offset: self.pos,
            reason,
        }
    }

    fn peek(&self) -> Result<u8> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.error("unexpected end of input"))
    }

    fn next(&mut self) -> Result<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_value(&mut self, depth: usize) -> Result<Value> {
        match self.peek()? {
            b'i' => self.read_integer().map(Value::Integer),
            b'l' => self.read_list(depth),
            b'd' => self.read_dict(depth),
            b'0'..=b'9' => self.read_bytes().map(Value::Bytes),
            _ => Err(self.error("unexpected byte")),
        }
    }

    /// Reads the ASCII digits up to (not including) `terminator`.
    fn read_digits(&mut self, terminator: u8) -> Result<&'a [u8]> {
        let start = self.pos;
        loop {
            let byte = self.peek()?;
            if byte == terminator {
                break;
            }
            if !byte.is_ascii_digit() {
                return Err(self.error("expected digit"));
            }
            self.pos += 1;
        }
        let data = self.data;
        let digits = &data[start..self.pos];
        self.pos += 1;
        Ok(digits)
    }

    fn read_integer(&mut self) -> Result<i64> {
        self.pos += 1; // 'i'
        let start = self.pos;
        let negative = self.peek()? == b'-';
        if negative {
            self.pos += 1;
        }
        let digits = self.read_digits(b'e')?;
        if digits.is_empty() {
            return Err(Error::InvalidSyntax {
                offset: start,
                reason: "empty integer",
            });
        }
        if digits.len() > 1 && digits[0] == b'0' {
            return Err(Error::InvalidSyntax {
                offset: start,
                reason: "leading zero in integer",
            });
        }
        if negative && digits == b"0" {
            return Err(Error::InvalidSyntax {
                offset: start,
                reason: "negative zero",
            });
        }
        // Digits and an optional sign are always ASCII.
        let text = std::str::from_utf8(&self.data[start..self.pos - 1]).map_err(|_| {
            Error::InvalidSyntax {
                offset: start,
                reason: "expected digit",
            }
        })?;
        text.parse::<i64>().map_err(|_| Error::InvalidSyntax {
            offset: start,
            reason: "integer out of range",
        })
    }

    fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let start = self.pos;
        let digits = self.read_digits(b':')?;
        if digits.len() > 1 && digits[0] == b'0' {
            return Err(Error::InvalidSyntax {
                offset: start,
                reason: "leading zero in string length",
            });
        }
        let len = digits.iter().try_fold(0usize, |acc, d| {
            acc.checked_mul(10)?.checked_add(usize::from(d - b'0'))
        });
        let end = len
            .and_then(|len| self.pos.checked_add(len))
            .filter(|end| *end <= self.data.len())
            .ok_or(Error::InvalidSyntax {
                offset: start,
                reason: "string length exceeds input",
            })?;
        let bytes = self.data[self.pos..end].to_vec();
        self.pos = end;
        Ok(bytes)
    }

    fn enter(&self, depth: usize) -> Result<usize> {
        if depth >= MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        Ok(depth + 1)
    }

    fn read_list(&mut self, depth: usize) -> Result<Value> {
        let depth = self.enter(depth)?;
        self.pos += 1; // 'l'
        let mut items = Vec::new();
        while self.peek()? != b'e' {
            items.push(self.read_value(depth)?);
        }
        self.pos += 1;
        Ok(Value::List(items))
    }

    fn read_dict(&mut self, depth: usize) -> Result<Value> {
        let depth = self.enter(depth)?;
        self.pos += 1; // 'd'
        let mut dict = Dict::new();
        while self.peek()? != b'e' {
            let key_offset = self.pos;
            if !self.peek()?.is_ascii_digit() {
                return Err(self.error("dictionary key must be a string"));
            }
            let key = self.read_bytes()?;
            if dict.contains_key(&key) {
                return Err(Error::InvalidSyntax {
                    offset: key_offset,
                    reason: "duplicate dictionary key",
                });
            }
            let value = self.read_value(depth)?;
            dict.insert(key, value);
        }
        self.next()?;
        Ok(Value::Dict(dict))
    }
}
