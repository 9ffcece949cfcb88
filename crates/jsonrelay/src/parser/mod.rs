//! Recursive-descent tokenizer.
//!
//! The grammar is the usual JSON one with two relaxations: a stream may hold
//! any number of top-level objects or arrays, and numbers are whatever run of
//! `[0-9+\-.eE]` the standard numeric parsers accept. Every production emits
//! its events as soon as it has recognised them, so memory use is bounded by
//! the longest single string or number plus the nesting depth.
//!
//! Each procedure is entered with the production's first byte already
//! consumed. Failures unwind through [`Halt`] to [`Parser::parse`], which
//! reports grammar errors through [`Event::EndOfStream`] and lets sink
//! refusals stop the parse silently.
use std::io::Read;

use bstr::ByteSlice;
use tracing::{debug, trace};

use crate::{
    cursor::Cursor,
    error::{ErrorKind, ParseError, StructuralError},
    escape,
    event::Event,
    literal::{ExpectedLiteral, Literal, Step},
    number::{NumberLexeme, is_number_byte, starts_number},
    options::{CoordinateMode, ParserOptions},
    sink::{EventSink, SinkError},
};

/// Why a grammar procedure stopped early.
#[derive(Debug)]
enum Halt {
    Error(ParseError),
    Sink(SinkError),
}

impl From<ParseError> for Halt {
    fn from(err: ParseError) -> Self {
        Self::Error(err)
    }
}

impl From<SinkError> for Halt {
    fn from(err: SinkError) -> Self {
        Self::Sink(err)
    }
}

/// A single-use tokenizer over a byte source.
///
/// Parsing consumes the parser: once the terminal [`Event::EndOfStream`] has
/// been emitted the reader has been dropped.
///
/// ```
/// use jsonrelay::{Event, Parser};
///
/// let events = Parser::new(&br#"{"foo": "bar"}"#[..]).into_events();
/// assert_eq!(
///     events,
///     [
///         Event::ObjectStart,
///         Event::ObjectKey,
///         Event::String("foo".into()),
///         Event::ObjectValue,
///         Event::String("bar".into()),
///         Event::ObjectEnd,
///         Event::EndOfStream(None),
///     ]
/// );
/// ```
pub struct Parser<R> {
    cursor: Cursor<R>,
    options: ParserOptions,
    /// Raw bytes of the string or number being lexed.
    scratch: Vec<u8>,
    depth: usize,
}

impl<R: Read> Parser<R> {
    /// Creates a parser with default options.
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, ParserOptions::default())
    }

    /// Creates a parser with the given options.
    pub fn with_options(reader: R, options: ParserOptions) -> Self {
        Self {
            cursor: Cursor::new(reader, options.allow_extended_whitespace),
            options,
            scratch: Vec::new(),
            depth: 0,
        }
    }

    /// Parses the whole stream into `sink`.
    ///
    /// On success and on parse errors alike the last event delivered is an
    /// [`Event::EndOfStream`], and `Ok(())` is returned.
    ///
    /// # Errors
    ///
    /// Returns the [`SinkError`] if the sink refused an event. Nothing further
    /// is emitted in that case, not even the terminal event.
    pub fn parse<S: EventSink + ?Sized>(mut self, sink: &mut S) -> Result<(), SinkError> {
        let error = match self.parse_stream(sink) {
            Ok(()) => None,
            Err(Halt::Error(err)) => {
                debug!(%err, offset = err.offset(), "parse failed");
                #[cfg(any(test, feature = "fuzzing"))]
                assert!(!self.options.panic_on_error, "parse error: {err}");
                Some(err)
            }
            Err(Halt::Sink(err)) => {
                debug!(%err, offset = self.cursor.coords().offset, "sink refused event");
                return Err(err);
            }
        };
        sink.emit(Event::EndOfStream(error))
    }

    /// Parses the whole stream and returns every event, including the
    /// terminal [`Event::EndOfStream`].
    #[must_use]
    pub fn into_events(self) -> Vec<Event> {
        let mut events = Vec::new();
        // Collecting into a vector cannot be refused.
        let _ = self.parse(&mut events);
        events
    }

    fn parse_stream<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), Halt> {
        let mut documents = 0usize;
        loop {
            let Some(mut byte) = self.cursor.skip_whitespace()? else {
                if documents == 0 {
                    return Err(self.cursor.error(ErrorKind::UnexpectedEndOfInput).into());
                }
                return Ok(());
            };

            if documents > 0 {
                if !self.options.allow_multiple_documents {
                    return Err(self.unexpected(byte).into());
                }
                if self.options.coordinates == CoordinateMode::PerDocument {
                    self.cursor.push_back();
                    self.cursor.reset_coordinates();
                    let Some(again) = self.cursor.advance()? else {
                        return Ok(());
                    };
                    byte = again;
                }
            }

            match byte {
                b'{' => self.parse_object(sink)?,
                b'[' => self.parse_array(sink)?,
                other => return Err(self.unexpected(other).into()),
            }
            documents += 1;
            trace!(documents, offset = self.cursor.coords().offset, "document complete");
        }
    }

    fn parse_object<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), Halt> {
        self.enter()?;
        sink.emit(Event::ObjectStart)?;

        let mut byte = self.next_significant()?;
        if byte == b'}' {
            sink.emit(Event::ObjectEnd)?;
            self.leave();
            return Ok(());
        }

        loop {
            sink.emit(Event::ObjectKey)?;
            self.expect(b'"', byte)?;
            let key = self.read_string()?;
            sink.emit(Event::String(key))?;

            let colon = self.next_significant()?;
            self.expect(b':', colon)?;
            sink.emit(Event::ObjectValue)?;
            self.parse_value(sink)?;

            match self.next_significant()? {
                b',' => byte = self.next_significant()?,
                b'}' => break,
                found => return Err(self.expected(b',', found).into()),
            }
        }

        sink.emit(Event::ObjectEnd)?;
        self.leave();
        Ok(())
    }

    fn parse_array<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), Halt> {
        self.enter()?;
        sink.emit(Event::ArrayStart)?;

        if self.next_significant()? == b']' {
            sink.emit(Event::ArrayEnd)?;
            self.leave();
            return Ok(());
        }
        self.cursor.push_back();

        loop {
            self.parse_value(sink)?;
            match self.next_significant()? {
                b',' => {}
                b']' => break,
                found => return Err(self.expected(b',', found).into()),
            }
        }

        sink.emit(Event::ArrayEnd)?;
        self.leave();
        Ok(())
    }

    fn parse_value<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), Halt> {
        let byte = self.next_significant()?;
        if let Some(literal) = ExpectedLiteral::new(byte) {
            return self.parse_literal(literal, sink);
        }
        match byte {
            b'"' => {
                let text = self.read_string()?;
                sink.emit(Event::String(text))?;
            }
            b'{' => self.parse_object(sink)?,
            b'[' => self.parse_array(sink)?,
            b if starts_number(b) => self.parse_number(b, sink)?,
            other => return Err(self.unexpected(other).into()),
        }
        Ok(())
    }

    fn parse_literal<S: EventSink + ?Sized>(
        &mut self,
        mut literal: ExpectedLiteral,
        sink: &mut S,
    ) -> Result<(), Halt> {
        loop {
            let byte = self.next_byte()?;
            match literal.step(byte) {
                Step::NeedMore => {}
                Step::Done(literal) => {
                    let event = match literal {
                        Literal::True => Event::Boolean(true),
                        Literal::False => Event::Boolean(false),
                        Literal::Null => Event::Null,
                    };
                    sink.emit(event)?;
                    return Ok(());
                }
                Step::Reject { expected } => return Err(self.expected(expected, byte).into()),
            }
        }
    }

    fn parse_number<S: EventSink + ?Sized>(&mut self, first: u8, sink: &mut S) -> Result<(), Halt> {
        self.scratch.clear();
        self.scratch.push(first);
        self.cursor.copy_while(&mut self.scratch, is_number_byte)?;

        // A number never ends a document, so the run must be followed by
        // something.
        self.next_byte()?;
        self.cursor.push_back();

        let lexeme = self.scratch.to_str_lossy();
        let number = NumberLexeme::classify(&lexeme)
            .parse()
            .map_err(|err| self.cursor.error(err))?;
        sink.emit(Event::Number(number))?;
        Ok(())
    }

    /// Reads a string body after its opening quote and decodes it.
    fn read_string(&mut self) -> Result<String, ParseError> {
        self.scratch.clear();
        loop {
            self.cursor
                .copy_while(&mut self.scratch, |b| b != b'"' && b != b'\\')?;
            match self.next_byte()? {
                b'"' => break,
                backslash => {
                    // The byte after a backslash is never a terminator.
                    self.scratch.push(backslash);
                    let escaped = self.next_byte()?;
                    self.scratch.push(escaped);
                }
            }
        }
        escape::decode(&self.scratch).map_err(|err| self.cursor.error(err))
    }

    /// The next byte, which must exist.
    fn next_byte(&mut self) -> Result<u8, ParseError> {
        self.cursor
            .advance()?
            .ok_or_else(|| self.cursor.error(ErrorKind::UnexpectedEndOfInput))
    }

    /// The next non-whitespace byte, which must exist.
    fn next_significant(&mut self) -> Result<u8, ParseError> {
        self.cursor
            .skip_whitespace()?
            .ok_or_else(|| self.cursor.error(ErrorKind::UnexpectedEndOfInput))
    }

    fn expect(&self, expected: u8, found: u8) -> Result<(), ParseError> {
        if found == expected {
            Ok(())
        } else {
            Err(self.expected(expected, found))
        }
    }

    fn expected(&self, expected: u8, found: u8) -> ParseError {
        self.cursor
            .error(StructuralError::Expected { expected, found })
    }

    fn unexpected(&self, found: u8) -> ParseError {
        self.cursor.error(StructuralError::UnexpectedCharacter(found))
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        match self.options.max_depth {
            Some(max) if self.depth > max => {
                Err(self.cursor.error(ErrorKind::DepthLimitExceeded(max)))
            }
            _ => Ok(()),
        }
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }
}
