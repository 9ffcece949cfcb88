//! Numeric lexemes.
//!
//! A number is the maximal run of bytes from `[0-9+\-.eE]`. The run is not
//! validated against the JSON grammar; it is classified by spelling and then
//! handed to the standard integer or float parser, whose verdict is final.
use crate::{error::NumericFormatError, event::Number};

/// Lexical hint separating integers from floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NumberLexeme<'a> {
    /// No `.` and no exponent.
    Integer(&'a str),
    /// Has a `.` or an exponent.
    Float(&'a str),
}

impl<'a> NumberLexeme<'a> {
    pub(crate) fn classify(lexeme: &'a str) -> Self {
        if lexeme.bytes().any(|b| matches!(b, b'.' | b'e' | b'E')) {
            Self::Float(lexeme)
        } else {
            Self::Integer(lexeme)
        }
    }

    pub(crate) fn parse(self) -> Result<Number, NumericFormatError> {
        match self {
            Self::Integer(lexeme) => lexeme.parse::<i64>().map(Number::Integer).map_err(|source| {
                NumericFormatError::Integer {
                    lexeme: lexeme.to_string(),
                    source,
                }
            }),
            Self::Float(lexeme) => {
                let value = lexeme.parse::<f64>().map_err(|source| NumericFormatError::Float {
                    lexeme: lexeme.to_string(),
                    source,
                })?;
                if !value.is_finite() {
                    return Err(NumericFormatError::OutOfRange {
                        lexeme: lexeme.to_string(),
                    });
                }
                Ok(Number::Float(value))
            }
        }
    }
}

/// Bytes that may appear in a numeric run.
#[inline]
pub(crate) fn is_number_byte(b: u8) -> bool {
    matches!(b, b'0'..=b'9' | b'+' | b'-' | b'.' | b'e' | b'E')
}

/// Bytes that may start a number.
#[inline]
pub(crate) fn starts_number(b: u8) -> bool {
    matches!(b, b'0'..=b'9' | b'+' | b'-')
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("0", Number::Integer(0))]
    #[case("10", Number::Integer(10))]
    #[case("-42", Number::Integer(-42))]
    #[case("+7", Number::Integer(7))]
    #[case("9223372036854775807", Number::Integer(i64::MAX))]
    #[case("10.0", Number::Float(10.0))]
    #[case("1e3", Number::Float(1000.0))]
    #[case("2E-2", Number::Float(0.02))]
    #[case("-0.5", Number::Float(-0.5))]
    fn parses(#[case] lexeme: &str, #[case] expected: Number) {
        assert_eq!(NumberLexeme::classify(lexeme).parse().unwrap(), expected);
    }

    #[rstest]
    #[case::overflow("9223372036854775808")]
    #[case::double_sign("--1")]
    #[case::embedded_sign("1-2")]
    fn rejects_integers(#[case] lexeme: &str) {
        let err = NumberLexeme::classify(lexeme).parse().unwrap_err();
        assert!(matches!(err, NumericFormatError::Integer { .. }), "{err}");
    }

    #[rstest]
    #[case::two_dots("1.2.3")]
    #[case::bare_exponent("e")]
    #[case::trailing_exponent("1e")]
    fn rejects_floats(#[case] lexeme: &str) {
        let err = NumberLexeme::classify(lexeme).parse().unwrap_err();
        assert!(matches!(err, NumericFormatError::Float { .. }), "{err}");
    }

    #[rstest]
    #[case("1e400")]
    #[case("-1e999")]
    #[case("1.8e308")]
    fn rejects_infinite_floats(#[case] lexeme: &str) {
        let err = NumberLexeme::classify(lexeme).parse().unwrap_err();
        assert_eq!(
            err,
            NumericFormatError::OutOfRange {
                lexeme: lexeme.to_string()
            }
        );
    }

    #[test]
    fn tiny_floats_underflow_to_zero() {
        assert_eq!(NumberLexeme::classify("1e-400").parse().unwrap(), Number::Float(0.0));
    }

    #[test]
    fn classification_is_lexical() {
        assert_eq!(NumberLexeme::classify("1"), NumberLexeme::Integer("1"));
        assert_eq!(NumberLexeme::classify("1E0"), NumberLexeme::Float("1E0"));
        assert!(starts_number(b'-'));
        assert!(!starts_number(b'.'));
        assert!(is_number_byte(b'e'));
        assert!(!is_number_byte(b','));
    }
}
