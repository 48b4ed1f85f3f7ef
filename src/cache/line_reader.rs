//! Strict Line Reader
//!
//! Buffered, byte-exact line reader for the journal. Lines end with `"\n"` or
//! `"\r\n"`; the terminator is stripped. A trailing line with no terminator is
//! reported as [`std::io::ErrorKind::UnexpectedEof`] and remembered, so the
//! caller can tell "ended mid-record" from "ended on a boundary".
//!
//! Only single-byte, ASCII-compatible charsets are accepted. In those, a
//! `\r` or `\n` byte can never be part of another character.

use std::io::{self, Read};

use crate::error::{Error, Result};

/// Default read buffer capacity
pub const DEFAULT_CAPACITY: usize = 8192;

/// Charsets a journal may be read with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// 7-bit US-ASCII
    UsAscii,
    /// ISO-8859-1, one byte per code point
    Latin1,
    /// UTF-8 (ASCII-compatible, newline bytes never appear inside a sequence)
    Utf8,
    /// UTF-16; rejected
    Utf16,
    /// UTF-32; rejected
    Utf32,
}

impl Charset {
    fn is_ascii_compatible(self) -> bool {
        matches!(self, Charset::UsAscii | Charset::Latin1 | Charset::Utf8)
    }

    fn decode(self, bytes: &[u8]) -> io::Result<String> {
        match self {
            Charset::UsAscii => {
                if !bytes.is_ascii() {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "non-ASCII byte in US-ASCII line",
                    ));
                }
                Ok(bytes.iter().map(|&b| b as char).collect())
            }
            Charset::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
            _ => String::from_utf8(bytes.to_vec())
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
        }
    }
}

/// Buffered line reader over a single-byte-per-character stream
pub struct StrictLineReader<R> {
    inner: R,
    charset: Charset,
    buf: Box<[u8]>,
    /// Next unread byte in `buf`
    pos: usize,
    /// One past the last valid byte in `buf`
    end: usize,
    unterminated: bool,
}

impl<R: Read> StrictLineReader<R> {
    /// Create a reader with the default capacity
    pub fn new(inner: R, charset: Charset) -> Result<Self> {
        Self::with_capacity(inner, charset, DEFAULT_CAPACITY)
    }

    /// Create a reader with a custom buffer capacity
    pub fn with_capacity(inner: R, charset: Charset, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidArgument("capacity must be > 0".to_string()));
        }
        if !charset.is_ascii_compatible() {
            return Err(Error::UnsupportedCharset(format!("{:?}", charset)));
        }
        Ok(Self {
            inner,
            charset,
            buf: vec![0u8; capacity].into_boxed_slice(),
            pos: 0,
            end: 0,
            unterminated: false,
        })
    }

    /// Read the next line.
    ///
    /// Returns `Ok(None)` at a clean end of stream. A final line without a
    /// terminator yields an `UnexpectedEof` error and sets
    /// [`has_unterminated_line`](Self::has_unterminated_line).
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        if self.pos >= self.end && !self.fill_buf()? {
            return Ok(None);
        }

        if let Some(i) = find_newline(&self.buf[self.pos..self.end]) {
            let line_end = self.pos + i;
            let mut stop = line_end;
            if stop > self.pos && self.buf[stop - 1] == b'\r' {
                stop -= 1;
            }
            let line = self.charset.decode(&self.buf[self.pos..stop])?;
            self.pos = line_end + 1;
            return Ok(Some(line));
        }

        // Line spans more than one buffer fill.
        let mut acc = Vec::with_capacity(self.end - self.pos + 80);
        loop {
            acc.extend_from_slice(&self.buf[self.pos..self.end]);
            self.pos = self.end;
            if !self.fill_buf()? {
                self.unterminated = true;
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "unterminated line at end of stream",
                ));
            }
            if let Some(i) = find_newline(&self.buf[..self.end]) {
                acc.extend_from_slice(&self.buf[..i]);
                self.pos = i + 1;
                if acc.last() == Some(&b'\r') {
                    acc.pop();
                }
                return self.charset.decode(&acc).map(Some);
            }
        }
    }

    /// True once end of stream was hit inside a line
    pub fn has_unterminated_line(&self) -> bool {
        self.unterminated
    }

    /// Refill the buffer; returns false at end of stream
    fn fill_buf(&mut self) -> io::Result<bool> {
        let n = loop {
            match self.inner.read(&mut self.buf) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        self.pos = 0;
        self.end = n;
        Ok(n > 0)
    }
}

#[inline]
fn find_newline(bytes: &[u8]) -> Option<usize> {
    bytes.iter().position(|&b| b == b'\n')
}

// =============================================================================
// Tests
// =============================================================================
