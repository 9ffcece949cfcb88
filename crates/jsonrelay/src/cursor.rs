//! Byte cursor over the input with line/column bookkeeping.
//!
//! The cursor hands out one byte at a time and can un-read exactly one byte,
//! which is all the single-token lookahead grammar needs. Coordinates always
//! describe the last byte consumed: `line` is 1-based and incremented on `\n`,
//! `position` is the 0-based column within the line.
use std::io::{self, BufRead, BufReader, Read};

use crate::error::{ErrorKind, ParseError};

/// Location of the cursor in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Coords {
    pub line: usize,
    pub position: usize,
    pub offset: u64,
}

impl Coords {
    fn start() -> Self {
        Self {
            line: 1,
            position: 0,
            offset: 0,
        }
    }

    #[inline]
    fn step(&mut self, byte: u8) {
        self.offset += 1;
        if byte == b'\n' {
            self.line += 1;
            self.position = 0;
        } else {
            self.position += 1;
        }
    }

    fn error(self, kind: ErrorKind) -> ParseError {
        ParseError::new(kind, self.line, self.position, self.offset)
    }
}

pub(crate) struct Cursor<R> {
    reader: BufReader<R>,
    coords: Coords,
    /// Coordinates before the most recent advance, and the byte it returned.
    previous: Option<(Coords, u8)>,
    /// A byte handed back by `push_back`, served before the reader.
    pending: Option<u8>,
    extended_whitespace: bool,
}

impl<R: Read> Cursor<R> {
    pub(crate) fn new(reader: R, extended_whitespace: bool) -> Self {
        Self {
            reader: BufReader::new(reader),
            coords: Coords::start(),
            previous: None,
            pending: None,
            extended_whitespace,
        }
    }

    pub(crate) fn coords(&self) -> Coords {
        self.coords
    }

    /// Builds an error at the current coordinates.
    pub(crate) fn error(&self, kind: impl Into<ErrorKind>) -> ParseError {
        self.coords.error(kind.into())
    }

    /// Returns the next byte, or `None` once the source is exhausted.
    #[inline]
    pub(crate) fn advance(&mut self) -> Result<Option<u8>, ParseError> {
        let byte = match self.pending.take() {
            Some(byte) => byte,
            None => {
                let buf = fill_buf(&mut self.reader).map_err(|err| self.coords.error(err.into()))?;
                let Some(&byte) = buf.first() else {
                    self.previous = None;
                    return Ok(None);
                };
                self.reader.consume(1);
                byte
            }
        };

        self.previous = Some((self.coords, byte));
        self.coords.step(byte);
        Ok(Some(byte))
    }

    /// Un-consumes the byte returned by the last [`advance`](Self::advance).
    ///
    /// Only one level of push-back exists: calling this twice in a row, or
    /// after `advance` reported end of input, is a logic error.
    pub(crate) fn push_back(&mut self) {
        debug_assert!(
            self.previous.is_some(),
            "push_back without a preceding advance"
        );
        if let Some((coords, byte)) = self.previous.take() {
            self.coords = coords;
            self.pending = Some(byte);
        }
    }

    /// Skips whitespace and returns the first other byte.
    pub(crate) fn skip_whitespace(&mut self) -> Result<Option<u8>, ParseError> {
        loop {
            match self.advance()? {
                Some(byte) if self.is_whitespace(byte) => {}
                other => return Ok(other),
            }
        }
    }

    /// Appends bytes to `out` for as long as `keep` accepts them and returns
    /// how many were copied. The first rejected byte is left unread.
    ///
    /// Works on whole buffered chunks; `push_back` is not available right
    /// after a bulk copy.
    pub(crate) fn copy_while(
        &mut self,
        out: &mut Vec<u8>,
        keep: impl Fn(u8) -> bool,
    ) -> Result<usize, ParseError> {
        let mut copied = 0;

        if let Some(byte) = self.pending {
            if !keep(byte) {
                return Ok(0);
            }
            self.pending = None;
            self.coords.step(byte);
            out.push(byte);
            copied += 1;
        }

        loop {
            let buf = fill_buf(&mut self.reader).map_err(|err| self.coords.error(err.into()))?;
            if buf.is_empty() {
                break;
            }

            let run = buf.iter().position(|&b| !keep(b)).unwrap_or(buf.len());
            let exhausted = run == buf.len();
            out.extend_from_slice(&buf[..run]);
            for &b in &buf[..run] {
                self.coords.step(b);
            }
            self.reader.consume(run);
            copied += run;

            if !exhausted {
                break;
            }
        }

        self.previous = None;
        Ok(copied)
    }

    /// Restarts line/column counting, leaving the byte offset untouched.
    pub(crate) fn reset_coordinates(&mut self) {
        self.coords.line = 1;
        self.coords.position = 0;
        self.previous = None;
    }

    #[inline]
    fn is_whitespace(&self, byte: u8) -> bool {
        match byte {
            b'\t' | b'\n' | 0x0B | 0x0C | b'\r' | b' ' => true,
            0x85 | 0xA0 => self.extended_whitespace,
            _ => false,
        }
    }
}

/// `BufReader::fill_buf`, retrying interrupted reads.
fn fill_buf<R: Read>(reader: &mut BufReader<R>) -> io::Result<&[u8]> {
    loop {
        match reader.fill_buf() {
            Ok(_) => break,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(reader.buffer())
}
