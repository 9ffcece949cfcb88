//! Error types surfaced through [`Event::EndOfStream`](crate::Event).
//!
//! Every failure is reported as a [`ParseError`]: an [`ErrorKind`] plus the
//! cursor coordinates at the point of failure. Line numbers are 1-based,
//! positions are 0-based columns within the line, and offsets count bytes
//! consumed from the start of the stream.
use std::{
    fmt, io,
    num::{ParseFloatError, ParseIntError},
    sync::Arc,
};

use thiserror::Error;

/// A terminal parse failure with the location it was detected at.
///
/// ```
/// use jsonrelay::{ErrorKind, Event, Parser};
///
/// let events = Parser::new(&b"{f}"[..]).into_events();
/// let Some(Event::EndOfStream(Some(err))) = events.last() else {
///     panic!("expected a terminal error");
/// };
/// assert_eq!(err.message(), "expected \" but got f");
/// assert_eq!((err.line(), err.position()), (1, 2));
/// assert!(matches!(err.kind(), ErrorKind::Structural(_)));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} at {line}:{position}")]
pub struct ParseError {
    #[source]
    kind: ErrorKind,
    line: usize,
    position: usize,
    offset: u64,
}

impl ParseError {
    pub(crate) fn new(kind: ErrorKind, line: usize, position: usize, offset: u64) -> Self {
        Self {
            kind,
            line,
            position,
            offset,
        }
    }

    /// The category and details of the failure.
    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// The short diagnostic, without location.
    #[must_use]
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// 1-based line of the last byte consumed before the failure.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// 0-based column of the last byte consumed before the failure.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of bytes consumed from the stream before the failure.
    ///
    /// Unlike [`line`](Self::line) and [`position`](Self::position) this is
    /// never reset between documents.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns `true` for [`ErrorKind::UnexpectedEndOfInput`].
    #[must_use]
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, ErrorKind::UnexpectedEndOfInput)
    }
}

/// What went wrong.
#[derive(Error, Debug, Clone)]
pub enum ErrorKind {
    /// A grammar expectation was violated.
    #[error(transparent)]
    Structural(#[from] StructuralError),
    /// The byte source ran out while a production expected more bytes.
    #[error("unexpected end of file")]
    UnexpectedEndOfInput,
    /// A string contained a malformed escape or a raw control byte.
    #[error("unable to decode string into a valid UTF-8 string")]
    EscapeDecode(#[source] EscapeError),
    /// A numeric lexeme was rejected by the integer or float parser.
    #[error(transparent)]
    NumericFormat(#[from] NumericFormatError),
    /// The byte source itself failed.
    #[error("i/o error: {0}")]
    Io(#[source] Arc<io::Error>),
    /// Objects and arrays were nested deeper than
    /// [`ParserOptions::max_depth`](crate::ParserOptions::max_depth).
    #[error("maximum nesting depth of {0} exceeded")]
    DepthLimitExceeded(usize),
}

impl PartialEq for ErrorKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Structural(a), Self::Structural(b)) => a == b,
            (Self::UnexpectedEndOfInput, Self::UnexpectedEndOfInput) => true,
            (Self::EscapeDecode(a), Self::EscapeDecode(b)) => a == b,
            (Self::NumericFormat(a), Self::NumericFormat(b)) => a == b,
            (Self::Io(a), Self::Io(b)) => a.kind() == b.kind(),
            (Self::DepthLimitExceeded(a), Self::DepthLimitExceeded(b)) => a == b,
            _ => false,
        }
    }
}

impl From<EscapeError> for ErrorKind {
    fn from(err: EscapeError) -> Self {
        Self::EscapeDecode(err)
    }
}

impl From<io::Error> for ErrorKind {
    fn from(err: io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

/// A delimiter or value starter that did not match the grammar.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralError {
    /// A specific byte was required.
    #[error("expected {} but got {}", byte(.expected), byte(.found))]
    Expected {
        /// The byte the grammar required at this point.
        expected: u8,
        /// The byte actually read.
        found: u8,
    },
    /// The byte cannot start a value here.
    #[error("unexpected character {}", byte(.0))]
    UnexpectedCharacter(u8),
}

/// Why a string's raw bytes could not be decoded.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeError {
    /// A backslash followed by a letter that is not a JSON escape.
    #[error("unknown escape sequence \\{}", byte(.0))]
    UnknownEscape(u8),
    /// A backslash at the very end of the string.
    #[error("incomplete escape sequence")]
    IncompleteEscape,
    /// `\u` not followed by four hexadecimal digits.
    #[error("invalid unicode escape sequence")]
    InvalidUnicodeEscape,
    /// A byte below 0x20 that was not escaped.
    #[error("unescaped control character {}", byte(.0))]
    ControlCharacter(u8),
    /// A `"` inside the string body that was not escaped.
    #[error("unescaped quote")]
    UnescapedQuote,
}

/// A numeric lexeme that failed to parse under its lexical classification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NumericFormatError {
    /// No `.`, `e` or `E`: parsed as a 64-bit signed integer.
    #[error("invalid integer literal `{lexeme}`: {source}")]
    Integer {
        /// The raw lexeme.
        lexeme: String,
        /// The underlying parse failure.
        source: ParseIntError,
    },
    /// Contains `.`, `e` or `E`: parsed as a 64-bit float.
    #[error("invalid float literal `{lexeme}`: {source}")]
    Float {
        /// The raw lexeme.
        lexeme: String,
        /// The underlying parse failure.
        source: ParseFloatError,
    },
    /// A float whose magnitude does not fit in 64 bits.
    #[error("float literal `{lexeme}` is out of range")]
    OutOfRange {
        /// The raw lexeme.
        lexeme: String,
    },
}

/// Renders a byte for diagnostics: printable ASCII as itself, anything else
/// as an escape.
pub(crate) struct DisplayByte(pub(crate) u8);

impl fmt::Display for DisplayByte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_ascii_graphic() || self.0 == b' ' {
            write!(f, "{}", char::from(self.0))
        } else {
            write!(f, "{}", self.0.escape_ascii())
        }
    }
}

fn byte(b: &u8) -> DisplayByte {
    DisplayByte(*b)
}

#[cfg(any(test, feature = "serde"))]
impl serde::Serialize for ParseError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ParseError", 4)?;
        state.serialize_field("message", &self.message())?;
        state.serialize_field("line", &self.line)?;
        state.serialize_field("position", &self.position)?;
        state.serialize_field("offset", &self.offset)?;
        state.end()
    }
}
