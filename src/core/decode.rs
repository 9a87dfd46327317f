//! Purpose: Parse JSON text bytes into a `Value` tree.
//! Exports: `decode`, `decode_with_limits`, `DecodeLimits`, `DEFAULT_MAX_DEPTH`.
//! Role: Value dispatcher plus the array/object structural scanners.
//! Invariants: Nesting depth is checked against an explicit limit before every descent.
//! Invariants: The first failure aborts the whole call; no partial `Value` escapes.
//! Invariants: Exactly one root value; anything but whitespace after it is an error.

use bstr::BString;

use crate::core::error::{DecodeError, DecodeErrorKind};
use crate::core::escape;
use crate::core::number;
use crate::core::value::Value;

pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Resource limits for one decode call. The depth limit bounds recursion
/// through nested arrays/objects; it is always enforced, not a host-stack
/// probe.
#[derive(Clone, Copy, Debug)]
pub struct DecodeLimits {
    pub max_depth: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Decode a single JSON value from `input` with default limits.
pub fn decode(input: &[u8]) -> Result<Value, DecodeError> {
    decode_with_limits(input, DecodeLimits::default())
}

/// Decode a single JSON value, failing with `StackExhausted` once nesting
/// exceeds `limits.max_depth`. Trailing bytes after the root value must all
/// be whitespace.
pub fn decode_with_limits(input: &[u8], limits: DecodeLimits) -> Result<Value, DecodeError> {
    let mut scanner = Scanner {
        input,
        pos: 0,
        depth: 0,
        limits,
    };
    let value = scanner.scan_value()?;
    scanner.expect_only_trailing_whitespace()?;
    Ok(value)
}

// Insignificant whitespace: the JSON set plus vertical tab.
fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

enum ObjectState {
    NeedKey,
    NeedColon(BString),
    NeedValue(BString),
    NeedSeparator,
}

struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
    depth: usize,
    limits: DecodeLimits,
}

impl Scanner<'_> {
    fn skip_whitespace(&mut self) {
        while self.input.get(self.pos).copied().is_some_and(is_space) {
            self.pos += 1;
        }
    }

    /// Recursive-descent root: route on the next significant byte.
    fn scan_value(&mut self) -> Result<Value, DecodeError> {
        self.skip_whitespace();

        let Some(&byte) = self.input.get(self.pos) else {
            return Err(
                DecodeError::new(DecodeErrorKind::UnexpectedSymbol, self.pos).with_message(
                    format!("unexpected end of input at pos {}", self.pos),
                ),
            );
        };

        match byte {
            b'{' => {
                self.check_headroom()?;
                self.pos += 1;
                self.depth += 1;
                let object = self.scan_object();
                self.depth -= 1;
                object
            }
            b'[' => {
                self.check_headroom()?;
                self.pos += 1;
                self.depth += 1;
                let array = self.scan_array();
                self.depth -= 1;
                array
            }
            b'"' => {
                self.pos += 1;
                escape::scan_string(self.input, &mut self.pos).map(Value::String)
            }
            _ => {
                // `null` must win over the number branch, which also claims
                // a leading `n` for NaN.
                if self.eat_token(b"null") {
                    return Ok(Value::Null);
                }
                if self.eat_token(b"true") {
                    return Ok(Value::Bool(true));
                }
                if self.eat_token(b"false") {
                    return Ok(Value::Bool(false));
                }
                if number::starts_number(byte) {
                    return number::scan_number(self.input, &mut self.pos).map(Value::Number);
                }
                Err(
                    DecodeError::new(DecodeErrorKind::UnexpectedSymbol, self.pos).with_message(
                        format!(
                            "unexpected symbol '{}' at pos {}",
                            byte.escape_ascii(),
                            self.pos
                        ),
                    ),
                )
            }
        }
    }

    /// Array body: two states, need-value (initial) and need-separator.
    /// `]` terminates in either state, so a trailing comma is accepted.
    fn scan_array(&mut self) -> Result<Value, DecodeError> {
        let open_pos = self.pos.saturating_sub(1);
        let mut items: Vec<Value> = Vec::new();
        let mut need_value = true;

        while let Some(&byte) = self.input.get(self.pos) {
            if is_space(byte) {
                self.pos += 1;
            } else if byte == b']' {
                self.pos += 1;
                return Ok(Value::Array(items));
            } else if need_value {
                items.push(self.scan_value()?);
                need_value = false;
            } else if byte == b',' {
                self.pos += 1;
                need_value = true;
            } else {
                return Err(
                    DecodeError::new(DecodeErrorKind::UnexpectedSymbol, self.pos).with_message(
                        format!(
                            "unexpected symbol '{}' in array at pos {}",
                            byte.escape_ascii(),
                            self.pos
                        ),
                    ),
                );
            }
        }

        Err(
            DecodeError::new(DecodeErrorKind::UnterminatedStructure, open_pos)
                .with_message(format!("unfinished array at pos {open_pos}")),
        )
    }

    /// Object body: need-key, need-colon, need-value, need-separator. A
    /// repeated key overwrites the earlier entry's value in place.
    fn scan_object(&mut self) -> Result<Value, DecodeError> {
        let open_pos = self.pos.saturating_sub(1);
        let mut entries: Vec<(BString, Value)> = Vec::new();
        let mut state = ObjectState::NeedKey;

        while let Some(&byte) = self.input.get(self.pos) {
            if is_space(byte) {
                self.pos += 1;
                continue;
            }
            state = match state {
                ObjectState::NeedKey => match byte {
                    b'"' => {
                        self.pos += 1;
                        let key = escape::scan_string(self.input, &mut self.pos)?;
                        ObjectState::NeedColon(key)
                    }
                    b'}' => {
                        self.pos += 1;
                        return Ok(Value::Object(entries));
                    }
                    _ => return Err(self.unexpected_in_object(byte)),
                },
                ObjectState::NeedColon(key) => {
                    if byte == b':' {
                        self.pos += 1;
                        ObjectState::NeedValue(key)
                    } else {
                        return Err(self.unexpected_in_object(byte));
                    }
                }
                ObjectState::NeedValue(key) => {
                    let value = self.scan_value()?;
                    insert_entry(&mut entries, key, value);
                    ObjectState::NeedSeparator
                }
                ObjectState::NeedSeparator => match byte {
                    b',' => {
                        self.pos += 1;
                        ObjectState::NeedKey
                    }
                    b'}' => {
                        self.pos += 1;
                        return Ok(Value::Object(entries));
                    }
                    _ => return Err(self.unexpected_in_object(byte)),
                },
            };
        }

        Err(
            DecodeError::new(DecodeErrorKind::UnterminatedStructure, open_pos)
                .with_message(format!("unfinished object at pos {open_pos}")),
        )
    }

    fn unexpected_in_object(&self, byte: u8) -> DecodeError {
        DecodeError::new(DecodeErrorKind::UnexpectedSymbol, self.pos).with_message(format!(
            "unexpected symbol '{}' in object at pos {}",
            byte.escape_ascii(),
            self.pos
        ))
    }

    fn eat_token(&mut self, token: &[u8]) -> bool {
        if self.input[self.pos..].starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn check_headroom(&self) -> Result<(), DecodeError> {
        if self.depth >= self.limits.max_depth {
            return Err(
                DecodeError::new(DecodeErrorKind::StackExhausted, self.pos).with_message(format!(
                    "nesting deeper than {} levels at pos {}",
                    self.limits.max_depth, self.pos
                )),
            );
        }
        Ok(())
    }

    fn expect_only_trailing_whitespace(&mut self) -> Result<(), DecodeError> {
        while let Some(&byte) = self.input.get(self.pos) {
            if !is_space(byte) {
                return Err(
                    DecodeError::new(DecodeErrorKind::TrailingGarbage, self.pos).with_message(
                        format!(
                            "garbage symbol '{}' at pos {}",
                            byte.escape_ascii(),
                            self.pos
                        ),
                    ),
                );
            }
            self.pos += 1;
        }
        Ok(())
    }
}

fn insert_entry(entries: &mut Vec<(BString, Value)>, key: BString, value: Value) {
    if let Some(slot) = entries.iter_mut().find(|(existing, _)| *existing == key) {
        slot.1 = value;
    } else {
        entries.push((key, value));
    }
}
