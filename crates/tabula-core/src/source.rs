//! Character cursors the parser reads from
//!
//! The parser only ever needs one character of lookahead, so a source is
//! anything that can `peek` and `next_char`. [`StrSource`] walks an in-memory
//! string without copying; [`ReadSource`] decodes UTF-8 from any
//! [`std::io::Read`] a chunk at a time.

use std::io::{self, Read};

use crate::error::Result;

const CHUNK_SIZE: usize = 8 * 1024;
const BOM: char = '\u{feff}';

/// A forward-only cursor over characters
pub trait CharSource {
    /// Look at the next character without consuming it
    fn peek(&mut self) -> Result<Option<char>>;

    /// Consume and return the next character
    fn next_char(&mut self) -> Result<Option<char>>;

    /// Whether the source has no characters left
    fn is_at_end(&mut self) -> Result<bool> {
        Ok(self.peek()?.is_none())
    }
}

impl<S: CharSource + ?Sized> CharSource for &mut S {
    fn peek(&mut self) -> Result<Option<char>> {
        (**self).peek()
    }

    fn next_char(&mut self) -> Result<Option<char>> {
        (**self).next_char()
    }
}

/// Zero-copy cursor over a string slice
#[derive(Debug, Clone)]
pub struct StrSource<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> StrSource<'a> {
    /// Create a cursor at the start of `text`
    pub fn new(text: &'a str) -> Self {
        Self { text, offset: 0 }
    }

    /// Byte offset of the next character
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The text not consumed yet
    pub fn remaining(&self) -> &'a str {
        &self.text[self.offset..]
    }
}

impl CharSource for StrSource<'_> {
    #[inline]
    fn peek(&mut self) -> Result<Option<char>> {
        Ok(self.remaining().chars().next())
    }

    #[inline]
    fn next_char(&mut self) -> Result<Option<char>> {
        let c = self.remaining().chars().next();
        if let Some(c) = c {
            self.offset += c.len_utf8();
        }
        Ok(c)
    }

    fn is_at_end(&mut self) -> Result<bool> {
        Ok(self.offset >= self.text.len())
    }
}

/// Buffered UTF-8 cursor over a byte stream
///
/// A leading byte-order mark is skipped. Bytes that are not valid UTF-8 are
/// reported as an [`io::ErrorKind::InvalidData`] error.
pub struct ReadSource<R> {
    reader: R,
    chunk: Box<[u8]>,
    // Undecoded tail of the last chunk (an incomplete UTF-8 sequence)
    pending: Vec<u8>,
    text: String,
    pos: usize,
    eof: bool,
    bom_checked: bool,
}

impl<R: Read> ReadSource<R> {
    /// Wrap a reader
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            chunk: vec![0u8; CHUNK_SIZE].into_boxed_slice(),
            pending: Vec::with_capacity(4),
            text: String::with_capacity(CHUNK_SIZE),
            pos: 0,
            eof: false,
            bom_checked: false,
        }
    }

    /// Get a reference to the underlying reader
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Give the underlying reader back, dropping buffered text
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Make sure at least one decoded character is buffered.
    /// Returns `false` at end of input.
    fn fill(&mut self) -> Result<bool> {
        while self.pos >= self.text.len() {
            if self.eof {
                return Ok(false);
            }

            self.text.clear();
            self.pos = 0;

            let n = match self.reader.read(&mut self.chunk) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            if n == 0 {
                self.eof = true;
                if !self.pending.is_empty() {
                    return Err(invalid_utf8().into());
                }
                continue;
            }

            self.pending.extend_from_slice(&self.chunk[..n]);
            self.decode_pending()?;

            if !self.bom_checked && !self.text.is_empty() {
                self.bom_checked = true;
                if self.text.starts_with(BOM) {
                    log::debug!("skipping UTF-8 byte-order mark");
                    self.pos = BOM.len_utf8();
                }
            }
        }
        Ok(true)
    }

    fn decode_pending(&mut self) -> Result<()> {
        let decoded = match std::str::from_utf8(&self.pending) {
            Ok(s) => {
                self.text.push_str(s);
                self.pending.len()
            }
            Err(e) => {
                // Anything but a sequence cut off by the chunk boundary is bad data
                if e.error_len().is_some() {
                    return Err(invalid_utf8().into());
                }
                let valid = e.valid_up_to();
                if let Ok(s) = std::str::from_utf8(&self.pending[..valid]) {
                    self.text.push_str(s);
                }
                valid
            }
        };
        self.pending.drain(..decoded);
        Ok(())
    }
}

impl<R: Read> CharSource for ReadSource<R> {
    fn peek(&mut self) -> Result<Option<char>> {
        if !self.fill()? {
            return Ok(None);
        }
        Ok(self.text[self.pos..].chars().next())
    }

    fn next_char(&mut self) -> Result<Option<char>> {
        let c = self.peek()?;
        if let Some(c) = c {
            self.pos += c.len_utf8();
        }
        Ok(c)
    }
}

impl<R> std::fmt::Debug for ReadSource<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadSource")
            .field("buffered", &(self.text.len() - self.pos.min(self.text.len())))
            .field("eof", &self.eof)
            .finish()
    }
}

fn invalid_utf8() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8")
}
