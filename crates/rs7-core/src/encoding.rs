//! Escape-sequence encoding and decoding (spec.md §4.A).
//!
//! `\F\ \S\ \T\ \R\ \E\` re-escape the five reserved characters under the
//! *current* delimiter set (not hardcoded defaults); `\Xhh..\` carries a
//! hex byte sequence; `\.br\` is a formatting break passed through as a
//! newline; `\Zxx..\` is a local escape passed through verbatim; `\H\`/
//! `\N\` highlighting is accepted and dropped on decode, and never
//! produced on encode.

use crate::delimiters::Delimiters;
use crate::error::{Error, Result};

pub struct Encoding;

impl Encoding {
    /// Re-escape any of the five reserved characters (plus a bare `\r`
    /// appearing inside a scalar value, spec.md §9's open question,
    /// resolved via `\X0D\`) using the current delimiter set.
    pub fn encode(input: &str, delimiters: &Delimiters) -> String {
        let mut result = String::with_capacity(input.len());

        for ch in input.chars() {
            if ch == delimiters.escape_character {
                push_escape(&mut result, delimiters, "E");
            } else if ch == delimiters.field_separator {
                push_escape(&mut result, delimiters, "F");
            } else if ch == delimiters.component_separator {
                push_escape(&mut result, delimiters, "S");
            } else if ch == delimiters.subcomponent_separator {
                push_escape(&mut result, delimiters, "T");
            } else if ch == delimiters.repetition_separator {
                push_escape(&mut result, delimiters, "R");
            } else if ch == '\r' {
                push_escape(&mut result, delimiters, "X0D");
            } else if ch == '\n' {
                push_escape(&mut result, delimiters, "X0A");
            } else {
                result.push(ch);
            }
        }

        result
    }

    /// Decode escape sequences in a scalar value back to literal
    /// characters.
    pub fn decode(input: &str, delimiters: &Delimiters) -> Result<String> {
        let mut result = String::with_capacity(input.len());
        let mut chars = input.chars().peekable();

        while let Some(ch) = chars.next() {
            if ch != delimiters.escape_character {
                result.push(ch);
                continue;
            }

            let mut escape_seq = String::new();
            let mut closed = false;
            while let Some(&next_ch) = chars.peek() {
                if next_ch == delimiters.escape_character {
                    chars.next();
                    closed = true;
                    break;
                }
                escape_seq.push(next_ch);
                chars.next();
            }
            if !closed {
                return Err(Error::InvalidEscape(format!(
                    "unterminated escape sequence starting `\\{escape_seq}`"
                )));
            }

            match escape_seq.as_str() {
                "F" => result.push(delimiters.field_separator),
                "S" => result.push(delimiters.component_separator),
                "T" => result.push(delimiters.subcomponent_separator),
                "R" => result.push(delimiters.repetition_separator),
                "E" => result.push(delimiters.escape_character),
                ".br" => result.push('\n'),
                "H" | "N" => {}
                seq if seq.starts_with('X') => {
                    result.push_str(&decode_hex_sequence(seq)?);
                }
                seq if seq.starts_with('Z') => {
                    result.push(delimiters.escape_character);
                    result.push_str(seq);
                    result.push(delimiters.escape_character);
                }
                other => {
                    return Err(Error::InvalidEscape(format!("unknown escape sequence `\\{other}\\`")));
                }
            }
        }

        Ok(result)
    }
}

fn push_escape(out: &mut String, delimiters: &Delimiters, code: &str) {
    out.push(delimiters.escape_character);
    out.push_str(code);
    out.push(delimiters.escape_character);
}

/// Decode a `Xhh..` payload (hex already stripped of the leading `X`) as a
/// sequence of bytes, not a single big integer, so `\X0D0A\` decodes to
/// two bytes rather than overflowing into one.
fn decode_hex_sequence(seq: &str) -> Result<String> {
    let hex = &seq[1..];
    if hex.is_empty() || hex.len() % 2 != 0 {
        return Err(Error::InvalidEscape(format!("malformed hex escape `\\{seq}\\`")));
    }
    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for chunk in hex.as_bytes().chunks(2) {
        let pair = std::str::from_utf8(chunk).unwrap();
        let byte = u8::from_str_radix(pair, 16)
            .map_err(|_| Error::InvalidEscape(format!("malformed hex escape `\\{seq}\\`")))?;
        bytes.push(byte);
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_delimiters() {
        let delims = Delimiters::default();

        assert_eq!(Encoding::encode("|", &delims), "\\F\\");
        assert_eq!(Encoding::encode("^", &delims), "\\S\\");
        assert_eq!(Encoding::encode("&", &delims), "\\T\\");
        assert_eq!(Encoding::encode("~", &delims), "\\R\\");
        assert_eq!(Encoding::encode("\\", &delims), "\\E\\");
    }

    #[test]
    fn test_encode_mixed() {
        let delims = Delimiters::default();
        assert_eq!(
            Encoding::encode("Test|Value^Component", &delims),
            "Test\\F\\Value\\S\\Component"
        );
    }

    #[test]
    fn test_encode_under_custom_delimiters() {
        let delims = Delimiters::from_encoding_characters('!', "@%$#").unwrap();
        assert_eq!(Encoding::encode("a!b@c", &delims), "a\\F\\b\\S\\c");
    }

    #[test]
    fn test_decode_delimiters() {
        let delims = Delimiters::default();

        assert_eq!(Encoding::decode("\\F\\", &delims).unwrap(), "|");
        assert_eq!(Encoding::decode("\\S\\", &delims).unwrap(), "^");
        assert_eq!(Encoding::decode("\\T\\", &delims).unwrap(), "&");
        assert_eq!(Encoding::decode("\\R\\", &delims).unwrap(), "~");
        assert_eq!(Encoding::decode("\\E\\", &delims).unwrap(), "\\");
    }

    #[test]
    fn test_decode_multi_byte_hex() {
        let delims = Delimiters::default();
        assert_eq!(Encoding::decode("\\X0D0A\\", &delims).unwrap(), "\r\n");
        assert_eq!(Encoding::decode("\\X41\\", &delims).unwrap(), "A");
    }

    #[test]
    fn test_decode_line_break() {
        let delims = Delimiters::default();
        assert_eq!(Encoding::decode("\\.br\\", &delims).unwrap(), "\n");
    }

    #[test]
    fn test_decode_highlight_dropped() {
        let delims = Delimiters::default();
        assert_eq!(Encoding::decode("\\H\\bold\\N\\", &delims).unwrap(), "bold");
    }

    #[test]
    fn test_decode_local_escape_preserved() {
        let delims = Delimiters::default();
        assert_eq!(Encoding::decode("\\Zfoo\\", &delims).unwrap(), "\\Zfoo\\");
    }

    #[test]
    fn test_roundtrip() {
        let delims = Delimiters::default();
        let original = "Test|Value^Component&Sub~Rep\\Escape";
        let encoded = Encoding::encode(original, &delims);
        let decoded = Encoding::decode(&encoded, &delims).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_roundtrip_under_custom_delimiters() {
        let delims = Delimiters::from_encoding_characters('!', "@%$#").unwrap();
        let original = "a!b@c%d#e$f";
        let encoded = Encoding::encode(original, &delims);
        assert_eq!(Encoding::decode(&encoded, &delims).unwrap(), original);
    }

    #[test]
    fn test_invalid_escape_sequence() {
        let delims = Delimiters::default();
        assert!(Encoding::decode("\\INVALID\\", &delims).is_err());
    }

    #[test]
    fn test_invalid_hex_sequence() {
        let delims = Delimiters::default();
        assert!(Encoding::decode("\\XZZ\\", &delims).is_err());
    }

    #[test]
    fn test_unterminated_escape() {
        let delims = Delimiters::default();
        assert!(Encoding::decode("\\F", &delims).is_err());
    }
}
