//! An incremental, event-driven JSON tokenizer.
//!
//! `jsonrelay` reads JSON from any [`std::io::Read`] source and reports it as
//! a flat sequence of [`Event`]s: container boundaries, member markers and
//! scalar values. The document is never materialised, so inputs of any size
//! and streams of back-to-back documents are handled without holding more than
//! one string or number in memory at a time.
//!
//! Events go to an [`EventSink`]. Use [`Parser::into_events`] to collect them,
//! implement [`EventSink`] to handle them inline, or [`spawn`] a worker thread
//! and iterate over the resulting [`EventStream`]:
//!
//! ```
//! use jsonrelay::{Event, Number, ParserOptions, spawn};
//!
//! let stream = spawn(&b"[1, 2] [3]"[..], ParserOptions::default()).unwrap();
//! let sum: i64 = stream
//!     .filter_map(|event| match event {
//!         Event::Number(Number::Integer(i)) => Some(i),
//!         _ => None,
//!     })
//!     .sum();
//! assert_eq!(sum, 6);
//! ```
//!
//! Every parse ends with exactly one [`Event::EndOfStream`]. It carries
//! `None` if the input was exhausted after a complete document and the
//! [`ParseError`] that stopped the parse otherwise.

mod cursor;
mod error;
mod escape;
mod event;
mod literal;
mod number;
mod options;
mod parser;
mod sink;
mod stream;

#[cfg(test)]
mod tests;

pub use error::{ErrorKind, EscapeError, NumericFormatError, ParseError, StructuralError};
pub use event::{Event, Number};
pub use options::{CoordinateMode, ParserOptions, StreamOptions};
pub use parser::Parser;
pub use sink::{Canceller, ChannelSink, EventSink, SinkError};
pub use stream::{EventStream, spawn, spawn_with};
