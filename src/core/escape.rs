//! Purpose: Escape and unescape JSON string literals over raw bytes.
//! Exports: `escape_into`, `scan_string`.
//! Role: Shared byte-string codec; the only component that touches string content.
//! Invariants: Content bytes are never rejected or repaired, only JSON metacharacters are rewritten.
//! Invariants: `\uHHHH` is validated but copied through verbatim (see `copy_unicode_escape_verbatim`).

use bstr::BString;

use crate::core::error::{DecodeError, DecodeErrorKind};

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Append the escaped form of `input` to `out`, without surrounding quotes.
///
/// Printable ASCII passes through except `\`, `/` and `"`. The named escapes
/// cover the usual control codes plus `\a` and `\v`; every other byte
/// (including all bytes >= 0x7F) becomes `\x` and two uppercase hex digits.
/// `/` is escaped even though JSON does not require it, so output can be
/// embedded in markup and script contexts.
pub(crate) fn escape_into(input: &[u8], out: &mut Vec<u8>) {
    for &byte in input {
        if (0x20..=0x7E).contains(&byte) && byte != b'\\' && byte != b'/' && byte != b'"' {
            out.push(byte);
            continue;
        }
        out.push(b'\\');
        match byte {
            b'\\' | b'/' | b'"' => out.push(byte),
            0x07 => out.push(b'a'),
            0x08 => out.push(b'b'),
            0x0C => out.push(b'f'),
            b'\n' => out.push(b'n'),
            b'\r' => out.push(b'r'),
            b'\t' => out.push(b't'),
            0x0B => out.push(b'v'),
            _ => {
                out.push(b'x');
                out.push(HEX_UPPER[usize::from(byte >> 4)]);
                out.push(HEX_UPPER[usize::from(byte & 0x0F)]);
            }
        }
    }
}

/// Scan a string body starting just past the opening quote, leaving `pos`
/// just past the closing quote. Maximal runs of unescaped bytes are copied
/// in one extend each; escapes are decoded one at a time in between.
pub(crate) fn scan_string(input: &[u8], pos: &mut usize) -> Result<BString, DecodeError> {
    let quote_pos = pos.saturating_sub(1);

    // Empty string shortcut.
    if input.get(*pos) == Some(&b'"') {
        *pos += 1;
        return Ok(BString::default());
    }

    let mut out: Vec<u8> = Vec::new();
    let mut chunk_start = *pos;

    while let Some(&byte) = input.get(*pos) {
        match byte {
            b'\\' => {
                out.extend_from_slice(&input[chunk_start..*pos]);
                let escape_pos = *pos;
                *pos += 1;
                unescape_sequence(input, pos, escape_pos, &mut out)?;
                chunk_start = *pos;
            }
            b'"' => {
                out.extend_from_slice(&input[chunk_start..*pos]);
                *pos += 1;
                return Ok(out.into());
            }
            _ => *pos += 1,
        }
    }

    Err(
        DecodeError::new(DecodeErrorKind::UnterminatedStructure, quote_pos)
            .with_message(format!("unfinished string at pos {quote_pos}")),
    )
}

/// Decode one escape sequence. `pos` points at the byte after the backslash;
/// `escape_pos` is the backslash itself, reported for truncated sequences.
fn unescape_sequence(
    input: &[u8],
    pos: &mut usize,
    escape_pos: usize,
    out: &mut Vec<u8>,
) -> Result<(), DecodeError> {
    let Some(&byte) = input.get(*pos) else {
        return Err(unfinished_escape(escape_pos));
    };

    let decoded = match byte {
        b'"' | b'\\' | b'/' => byte,
        b'a' => 0x07,
        b'b' => 0x08,
        b'f' => 0x0C,
        b'n' => b'\n',
        b'r' => b'\r',
        b't' => b'\t',
        b'v' => 0x0B,
        b'x' => return unescape_hex_byte(input, pos, escape_pos, out),
        b'u' => return copy_unicode_escape_verbatim(input, pos, escape_pos, out),
        _ => {
            return Err(DecodeError::new(DecodeErrorKind::MalformedEscape, *pos)
                .with_message(format!(
                    "unexpected char '{}' in escape sequence at pos {}",
                    byte.escape_ascii(),
                    *pos
                )));
        }
    };
    out.push(decoded);
    *pos += 1;
    Ok(())
}

/// `\xHH` decodes to the single raw byte `HH`; the result is not required to
/// be printable or valid UTF-8.
fn unescape_hex_byte(
    input: &[u8],
    pos: &mut usize,
    escape_pos: usize,
    out: &mut Vec<u8>,
) -> Result<(), DecodeError> {
    let (Some(&hi), Some(&lo)) = (input.get(*pos + 1), input.get(*pos + 2)) else {
        return Err(unfinished_escape(escape_pos));
    };
    let (Some(hi), Some(lo)) = (hex_value(hi), hex_value(lo)) else {
        return Err(DecodeError::new(DecodeErrorKind::MalformedEscape, *pos)
            .with_message(format!("malformed \\xHH escape at pos {}", *pos)));
    };
    out.push(hi << 4 | lo);
    *pos += 3;
    Ok(())
}

/// `\uHHHH` is validated for well-formedness but copied through unchanged as
/// the six literal source bytes. No conversion to a code point, no UTF-8
/// re-encoding. A corrected implementation that decodes the escape for real
/// would replace this routine and nothing else.
fn copy_unicode_escape_verbatim(
    input: &[u8],
    pos: &mut usize,
    escape_pos: usize,
    out: &mut Vec<u8>,
) -> Result<(), DecodeError> {
    let end = *pos + 5;
    if end > input.len() {
        return Err(unfinished_escape(escape_pos));
    }
    if !input[*pos + 1..end].iter().all(|&b| hex_value(b).is_some()) {
        return Err(DecodeError::new(DecodeErrorKind::MalformedEscape, *pos)
            .with_message(format!("malformed \\uHHHH escape at pos {}", *pos)));
    }
    out.extend_from_slice(&input[escape_pos..escape_pos + 6]);
    *pos += 5;
    Ok(())
}

fn unfinished_escape(escape_pos: usize) -> DecodeError {
    DecodeError::new(DecodeErrorKind::UnterminatedStructure, escape_pos)
        .with_message(format!("unfinished escape sequence at pos {escape_pos}"))
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{escape_into, scan_string};
    use crate::core::error::DecodeErrorKind;

    fn escape(input: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        escape_into(input, &mut out);
        out
    }

    fn unescape(body: &[u8]) -> Result<Vec<u8>, (DecodeErrorKind, usize)> {
        let mut pos = 0;
        scan_string(body, &mut pos)
            .map(|s| s.into())
            .map_err(|err| (err.kind(), err.position()))
    }

    #[test]
    fn escape_passes_plain_ascii_through() {
        assert_eq!(escape(b"hello world"), b"hello world");
    }

    #[test]
    fn escape_names_the_classic_control_codes() {
        assert_eq!(escape(b"\x07\x08\x0C\n\r\t\x0B"), b"\\a\\b\\f\\n\\r\\t\\v");
        assert_eq!(escape(br#"a\b"c/d"#), br#"a\\b\"c\/d"#);
    }

    #[test]
    fn escape_hexes_everything_else() {
        assert_eq!(escape(&[0x00, 0x1F, 0x7F, 0xFF]), b"\\x00\\x1F\\x7F\\xFF");
    }

    #[test]
    fn unescape_handles_batched_runs_between_escapes() {
        assert_eq!(unescape(b"abc\\ndef\\tghi\"").unwrap(), b"abc\ndef\tghi");
    }

    #[test]
    fn unescape_decodes_hex_bytes_case_insensitively() {
        assert_eq!(unescape(b"\\x41\\x4a\\xff\"").unwrap(), b"AJ\xFF");
    }

    #[test]
    fn unicode_escape_is_copied_through_verbatim() {
        assert_eq!(unescape(b"\\u0041\"").unwrap(), b"\\u0041");
        assert_eq!(unescape(b"x\\u2603y\"").unwrap(), b"x\\u2603y");
    }

    #[test]
    fn unicode_escape_with_bad_hex_is_malformed() {
        let (kind, _) = unescape(b"\\u00zz\"").unwrap_err();
        assert_eq!(kind, DecodeErrorKind::MalformedEscape);
    }

    #[test]
    fn unknown_escape_letter_is_malformed() {
        let (kind, pos) = unescape(b"ab\\qcd\"").unwrap_err();
        assert_eq!(kind, DecodeErrorKind::MalformedEscape);
        assert_eq!(pos, 3);
    }

    #[test]
    fn unterminated_string_reports_opening_quote() {
        let input = b"\"abc";
        let mut pos = 1;
        let err = scan_string(input, &mut pos).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::UnterminatedStructure);
        assert_eq!(err.position(), 0);
    }

    #[test]
    fn truncated_escape_reports_the_backslash() {
        let input = b"\"ab\\";
        let mut pos = 1;
        let err = scan_string(input, &mut pos).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::UnterminatedStructure);
        assert_eq!(err.position(), 3);

        let input = b"\"ab\\x4";
        let mut pos = 1;
        let err = scan_string(input, &mut pos).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::UnterminatedStructure);
        assert_eq!(err.position(), 3);
    }

    #[test]
    fn unescape_round_trips_escape_output() {
        let cases: &[&[u8]] = &[
            b"",
            b"plain",
            b"\x00\x01\x02",
            b"quotes \" and slashes / \\",
            &[0xDE, 0xAD, 0xBE, 0xEF],
            b"mixed \n text \x7F with \t controls",
        ];
        for case in cases {
            let mut body = escape(case);
            body.push(b'"');
            assert_eq!(&unescape(&body).unwrap(), case, "case {case:?}");
        }
    }
}
