//! Byte-at-a-time matcher for the `true`, `false` and `null` keywords.

/// The keyword being matched and what it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Literal {
    Null,
    True,
    False,
}

/// Outcome of feeding one byte into an [`ExpectedLiteral`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// The byte matched; the keyword has more bytes to go.
    NeedMore,
    /// The byte matched and completed the keyword.
    Done(Literal),
    /// The byte did not match; `expected` is the byte the keyword needed.
    Reject { expected: u8 },
}

/// The bytes still owed by a keyword whose first byte was already read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ExpectedLiteral {
    rest: &'static [u8],
    literal: Literal,
}

impl ExpectedLiteral {
    /// Starts matching after the first byte (`n`, `t` or `f`).
    pub(crate) fn new(first: u8) -> Option<Self> {
        let (rest, literal): (&'static [u8], _) = match first {
            b'n' => (b"ull", Literal::Null),
            b't' => (b"rue", Literal::True),
            b'f' => (b"alse", Literal::False),
            _ => return None,
        };
        Some(Self { rest, literal })
    }

    pub(crate) fn step(&mut self, byte: u8) -> Step {
        let Some((&expected, rest)) = self.rest.split_first() else {
            return Step::Done(self.literal);
        };
        if byte != expected {
            return Step::Reject { expected };
        }
        self.rest = rest;
        if rest.is_empty() {
            Step::Done(self.literal)
        } else {
            Step::NeedMore
        }
    }
}
