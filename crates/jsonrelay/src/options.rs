use std::time::Instant;

/// How error coordinates are counted once a stream holds more than one
/// top-level document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoordinateMode {
    /// `line` and `position` run continuously across the whole stream.
    #[default]
    StreamAbsolute,
    /// `line` and `position` restart at `1:0` after each top-level document.
    ///
    /// [`ParseError::offset`](crate::ParseError::offset) is still counted
    /// from the start of the stream.
    PerDocument,
}

/// Configuration options for the tokenizer.
///
/// # Examples
///
/// ```rust
/// use jsonrelay::{CoordinateMode, Parser, ParserOptions};
///
/// let options = ParserOptions {
///     coordinates: CoordinateMode::PerDocument,
///     max_depth: Some(64),
///     ..Default::default()
/// };
/// let events = Parser::with_options(&b"{} []"[..], options).into_events();
/// assert!(events.last().unwrap().error().is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Whether to parse several top-level documents from one input stream.
    ///
    /// Documents may be separated by whitespace or written back to back:
    ///
    /// ```json
    /// {"a": 1}{"b": 2}
    /// [1]
    /// [2]
    /// ```
    ///
    /// When `false`, any non-whitespace byte after the first document is an
    /// error.
    ///
    /// # Default
    ///
    /// `true`
    pub allow_multiple_documents: bool,

    /// Whether the bytes 0x85 (NEL) and 0xA0 (NBSP) count as whitespace.
    ///
    /// Vertical tab and form feed are always accepted as whitespace in
    /// addition to the four JSON whitespace characters.
    ///
    /// # Default
    ///
    /// `true`
    pub allow_extended_whitespace: bool,

    /// How `line` and `position` are counted across documents.
    ///
    /// # Default
    ///
    /// [`CoordinateMode::StreamAbsolute`]
    pub coordinates: CoordinateMode,

    /// Maximum nesting depth of objects and arrays.
    ///
    /// The top-level container has depth 1. `None` leaves nesting bounded by
    /// the call stack only.
    ///
    /// # Default
    ///
    /// `None`
    pub max_depth: Option<usize>,

    #[cfg(any(test, feature = "fuzzing"))]
    /// Panic on parse errors instead of reporting them.
    ///
    /// Enabled only in test and fuzzing builds to produce backtraces.
    pub panic_on_error: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            allow_multiple_documents: true,
            allow_extended_whitespace: true,
            coordinates: CoordinateMode::default(),
            max_depth: None,
            #[cfg(any(test, feature = "fuzzing"))]
            panic_on_error: false,
        }
    }
}

/// Configuration for the worker thread started by [`spawn_with`](crate::spawn_with).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOptions {
    /// Number of events the channel buffers ahead of the consumer.
    ///
    /// `0` makes every emission a rendezvous: the worker blocks until the
    /// consumer receives the event.
    ///
    /// # Default
    ///
    /// `0`
    pub capacity: usize,

    /// Point in time after which the parse is aborted at its next emission.
    ///
    /// # Default
    ///
    /// `None`
    pub deadline: Option<Instant>,

    /// Name given to the worker thread.
    ///
    /// # Default
    ///
    /// `"jsonrelay-parser"`
    pub thread_name: String,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            capacity: 0,
            deadline: None,
            thread_name: "jsonrelay-parser".to_string(),
        }
    }
}
