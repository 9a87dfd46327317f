//! Purpose: Scan a numeric token at the current position into an `f64`.
//! Exports: `starts_number`, `scan_number`.
//! Role: Liberal floating-point token scanner shared by the value dispatcher.
//! Invariants: Longest valid token wins; zero bytes consumed is a decode failure.
//! Invariants: Accepts the non-standard `nan`/`inf`/`infinity` forms in any letter case.

use crate::core::error::{DecodeError, DecodeErrorKind};

/// Bytes that can open a numeric token. `n`/`N` and `i`/`I` admit the
/// NaN/Infinity literals; `null` is matched by the dispatcher before this.
pub(crate) fn starts_number(byte: u8) -> bool {
    byte.is_ascii_digit()
        || matches!(byte, b'.' | b'+' | b'-' | b'N' | b'n' | b'I' | b'i')
}

/// Parse the longest numeric token starting at `pos`, leaving `pos` just
/// past it. Callers wanting strict JSON numbers must validate on top; the
/// liberality (leading `+`, bare `.5`, `5.`, NaN/Infinity) is intentional.
pub(crate) fn scan_number(input: &[u8], pos: &mut usize) -> Result<f64, DecodeError> {
    let start = *pos;
    let end = token_end(input, start);

    if end == start {
        return Err(DecodeError::new(DecodeErrorKind::MalformedNumber, start)
            .with_message(format!("bad number at pos {start}")));
    }

    // The span is ASCII by construction.
    let text = std::str::from_utf8(&input[start..end]).map_err(|_| {
        DecodeError::new(DecodeErrorKind::MalformedNumber, start)
            .with_message(format!("bad number at pos {start}"))
    })?;
    let num: f64 = text.parse().map_err(|_| {
        DecodeError::new(DecodeErrorKind::MalformedNumber, start)
            .with_message(format!("bad number at pos {start}"))
    })?;

    *pos = end;
    Ok(num)
}

/// Longest-match end of the token starting at `start`, or `start` itself
/// when no valid token is present.
fn token_end(input: &[u8], start: usize) -> usize {
    let mut cursor = start;

    if matches!(input.get(cursor), Some(b'+') | Some(b'-')) {
        cursor += 1;
    }

    if let Some(end) = match_keyword(input, cursor) {
        return end;
    }

    let mut digits = 0usize;
    while input.get(cursor).is_some_and(u8::is_ascii_digit) {
        cursor += 1;
        digits += 1;
    }
    if input.get(cursor) == Some(&b'.') {
        cursor += 1;
        while input.get(cursor).is_some_and(u8::is_ascii_digit) {
            cursor += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        // Sign or lone dot with nothing numeric behind it.
        return start;
    }

    // Exponent attaches only when at least one digit follows it.
    if matches!(input.get(cursor), Some(b'e') | Some(b'E')) {
        let mut exp_cursor = cursor + 1;
        if matches!(input.get(exp_cursor), Some(b'+') | Some(b'-')) {
            exp_cursor += 1;
        }
        if input.get(exp_cursor).is_some_and(u8::is_ascii_digit) {
            cursor = exp_cursor;
            while input.get(cursor).is_some_and(u8::is_ascii_digit) {
                cursor += 1;
            }
        }
    }

    cursor
}

/// Case-insensitive `infinity`, `inf`, or `nan` at `cursor`; longest first.
fn match_keyword(input: &[u8], cursor: usize) -> Option<usize> {
    for keyword in [b"infinity".as_slice(), b"inf".as_slice(), b"nan".as_slice()] {
        let end = cursor + keyword.len();
        if input.len() >= end
            && input[cursor..end].eq_ignore_ascii_case(keyword)
        {
            return Some(end);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{scan_number, starts_number};
    use crate::core::error::DecodeErrorKind;

    fn scan(input: &[u8]) -> Result<(f64, usize), (DecodeErrorKind, usize)> {
        let mut pos = 0;
        scan_number(input, &mut pos)
            .map(|num| (num, pos))
            .map_err(|err| (err.kind(), err.position()))
    }

    #[test]
    fn scans_integers_and_fractions() {
        assert_eq!(scan(b"42").unwrap(), (42.0, 2));
        assert_eq!(scan(b"-123").unwrap(), (-123.0, 4));
        assert_eq!(scan(b"+0.5").unwrap(), (0.5, 4));
        assert_eq!(scan(b".5").unwrap(), (0.5, 2));
        assert_eq!(scan(b"5.").unwrap(), (5.0, 2));
    }

    #[test]
    fn scans_exponents() {
        assert_eq!(scan(b"1e3").unwrap(), (1000.0, 3));
        assert_eq!(scan(b"-2.5E-2").unwrap(), (-0.025, 7));
    }

    #[test]
    fn stops_at_the_first_non_numeric_byte() {
        assert_eq!(scan(b"123abc").unwrap(), (123.0, 3));
        assert_eq!(scan(b"1.5,2").unwrap(), (1.5, 3));
    }

    #[test]
    fn bare_exponent_introducer_is_not_consumed() {
        assert_eq!(scan(b"1e").unwrap(), (1.0, 1));
        assert_eq!(scan(b"2e+").unwrap(), (2.0, 1));
        assert_eq!(scan(b"3E-x").unwrap(), (3.0, 1));
    }

    #[test]
    fn accepts_nan_and_infinity_case_variants() {
        assert!(scan(b"nan").unwrap().0.is_nan());
        assert!(scan(b"NaN").unwrap().0.is_nan());
        assert_eq!(scan(b"inf").unwrap(), (f64::INFINITY, 3));
        assert_eq!(scan(b"Infinity").unwrap(), (f64::INFINITY, 8));
        assert_eq!(scan(b"-INF").unwrap(), (f64::NEG_INFINITY, 4));
    }

    #[test]
    fn zero_consumed_bytes_is_a_bad_number() {
        for case in [b"+".as_slice(), b"-", b".", b"+-3", b"n", b"in"] {
            let (kind, pos) = scan(case).unwrap_err();
            assert_eq!(kind, DecodeErrorKind::MalformedNumber, "case {case:?}");
            assert_eq!(pos, 0);
        }
    }

    #[test]
    fn start_set_matches_the_dispatcher_contract() {
        for byte in b"0123456789.+-NnIi" {
            assert!(starts_number(*byte));
        }
        for byte in b"tf{}[]\"e " {
            assert!(!starts_number(*byte));
        }
    }
}
