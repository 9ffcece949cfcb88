//! Events emitted by the tokenizer.
//!
//! A parse produces a flat, totally ordered sequence of [`Event`]s terminated
//! by exactly one [`Event::EndOfStream`]. Object members are announced with
//! marker events so that a consumer can tell keys from values without
//! lookahead: [`Event::ObjectKey`] precedes the key's [`Event::String`], and
//! [`Event::ObjectValue`] precedes the member's value.
//!
//! # Examples
//!
//! ```
//! use jsonrelay::{Event, Number, Parser};
//!
//! let events = Parser::new(&br#"{"foo": [1, 2.5]}"#[..]).into_events();
//! assert_eq!(
//!     events,
//!     vec![
//!         Event::ObjectStart,
//!         Event::ObjectKey,
//!         Event::String("foo".to_string()),
//!         Event::ObjectValue,
//!         Event::ArrayStart,
//!         Event::Number(Number::Integer(1)),
//!         Event::Number(Number::Float(2.5)),
//!         Event::ArrayEnd,
//!         Event::ObjectEnd,
//!         Event::EndOfStream(None),
//!     ]
//! );
//! ```
use core::fmt;

use crate::error::ParseError;

/// A JSON number, classified by its spelling.
///
/// A lexeme containing `.`, `e` or `E` is always a [`Number::Float`], even
/// when its value is integral: `10` and `10.0` compare equal through
/// [`as_f64`](Number::as_f64) but are different variants.
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize))]
#[cfg_attr(any(test, feature = "serde"), serde(untagged))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// A lexeme without fraction or exponent.
    Integer(i64),
    /// A lexeme with a fraction or an exponent.
    Float(f64),
}

impl Number {
    /// The numeric value, converting integers to `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Integer(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    /// The integer value, if this number was spelled as an integer.
    #[must_use]
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(i),
            Self::Float(_) => None,
        }
    }

    /// Returns `true` for [`Number::Float`].
    #[must_use]
    pub fn is_float(self) -> bool {
        matches!(self, Self::Float(_))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            // `Debug` keeps the fraction on integral values (`10.0`, not `10`).
            Self::Float(x) => write!(f, "{x:?}"),
        }
    }
}

impl From<i64> for Number {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for Number {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

/// One unit of the tokenizer's output.
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize))]
#[cfg_attr(
    any(test, feature = "serde"),
    serde(tag = "kind", content = "value")
)]
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// `{` was read.
    ObjectStart,
    /// The next [`Event::String`] is a member key.
    ObjectKey,
    /// The next value event belongs to the most recent key.
    ObjectValue,
    /// `}` was read.
    ObjectEnd,
    /// `[` was read.
    ArrayStart,
    /// `]` was read.
    ArrayEnd,
    /// A decoded string, either a key or a value.
    String(String),
    /// A number.
    Number(Number),
    /// `true` or `false`.
    Boolean(bool),
    /// `null`.
    Null,
    /// The final event of every parse; carries the error that ended it, or
    /// `None` when the input was exhausted after a complete document.
    EndOfStream(Option<ParseError>),
}

impl Event {
    /// Returns `true` for [`Event::EndOfStream`].
    #[must_use]
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::EndOfStream(_))
    }

    /// The error carried by a failed [`Event::EndOfStream`].
    #[must_use]
    pub fn error(&self) -> Option<&ParseError> {
        match self {
            Self::EndOfStream(err) => err.as_ref(),
            _ => None,
        }
    }

    /// Returns `true` for events that carry or start a value.
    #[must_use]
    pub fn starts_value(&self) -> bool {
        matches!(
            self,
            Self::ObjectStart
                | Self::ArrayStart
                | Self::String(_)
                | Self::Number(_)
                | Self::Boolean(_)
                | Self::Null
        )
    }
}
