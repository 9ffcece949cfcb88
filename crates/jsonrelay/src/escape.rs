//! Decoding of raw JSON string bodies into UTF-8 text.
//!
//! The parser buffers everything between the opening and closing quote
//! verbatim, then hands the bytes to [`decode`]. A body without backslashes,
//! quotes or control bytes is copied through unchanged. Otherwise escapes are
//! rewritten:
//!
//! - `\"`, `\\`, `\/` and `\'` become the escaped byte itself,
//! - `\b`, `\f`, `\n`, `\r`, `\t` become the matching control byte,
//! - `\uXXXX` becomes the code point; a high surrogate immediately followed by
//!   a low surrogate escape is combined into one supplementary code point, and
//!   any other surrogate becomes U+FFFD.
//!
//! Invalid UTF-8 in the raw bytes is replaced with U+FFFD rather than
//! rejected.
use bstr::{ByteSlice, ByteVec};

use crate::error::EscapeError;

const REPLACEMENT: char = char::REPLACEMENT_CHARACTER;

/// Decodes a raw string body (without the surrounding quotes).
pub(crate) fn decode(raw: &[u8]) -> Result<String, EscapeError> {
    if !raw.iter().any(|&b| needs_decoding(b)) {
        return Ok(raw.to_str_lossy().into_owned());
    }

    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        match raw[i] {
            b'\\' => {
                let escaped = *raw.get(i + 1).ok_or(EscapeError::IncompleteEscape)?;
                i += 2;
                match escaped {
                    b'"' | b'\\' | b'/' | b'\'' => out.push(escaped),
                    b'b' => out.push(0x08),
                    b'f' => out.push(0x0C),
                    b'n' => out.push(b'\n'),
                    b'r' => out.push(b'\r'),
                    b't' => out.push(b'\t'),
                    b'u' => {
                        let unit = hex4(&raw[i..]).ok_or(EscapeError::InvalidUnicodeEscape)?;
                        i += 4;
                        let ch = match unit {
                            0xD800..=0xDBFF => match low_surrogate(&raw[i..]) {
                                Some(low) => {
                                    i += 6;
                                    combine_surrogates(unit, low)
                                }
                                None => REPLACEMENT,
                            },
                            0xDC00..=0xDFFF => REPLACEMENT,
                            _ => char::from_u32(u32::from(unit)).unwrap_or(REPLACEMENT),
                        };
                        out.push_char(ch);
                    }
                    other => return Err(EscapeError::UnknownEscape(other)),
                }
            }
            b'"' => return Err(EscapeError::UnescapedQuote),
            b if b < 0x20 => return Err(EscapeError::ControlCharacter(b)),
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    Ok(out.into_string_lossy())
}

#[inline]
fn needs_decoding(b: u8) -> bool {
    b == b'\\' || b == b'"' || b < 0x20
}

/// Parses exactly four hexadecimal digits at the start of `digits`.
fn hex4(digits: &[u8]) -> Option<u16> {
    let digits = digits.get(..4)?;
    digits.iter().try_fold(0u16, |acc, &d| {
        let value = u16::try_from(char::from(d).to_digit(16)?).ok()?;
        Some((acc << 4) | value)
    })
}

/// Reads a `\uXXXX` escape holding a low surrogate, if one starts `rest`.
fn low_surrogate(rest: &[u8]) -> Option<u16> {
    let hex = rest.strip_prefix(b"\\u")?;
    hex4(hex).filter(|unit| (0xDC00..=0xDFFF).contains(unit))
}

fn combine_surrogates(high: u16, low: u16) -> char {
    let code = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
    char::from_u32(code).unwrap_or(REPLACEMENT)
}
