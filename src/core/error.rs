//! Purpose: Error types for the codec surface.
//! Exports: `DecodeError`, `DecodeErrorKind`, `EncodeError`, `EncodeErrorKind`.
//! Invariants: Every decode error carries the byte offset where the problem was detected.
//! Invariants: Failures are values, never panics; scanners abort on first error.

use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecodeErrorKind {
    UnexpectedSymbol,
    UnterminatedStructure,
    MalformedEscape,
    MalformedNumber,
    StackExhausted,
    TrailingGarbage,
}

/// Decode failure with a human-readable message and the byte offset where
/// the problem was detected. Unterminated structures and strings report the
/// offset of their opening delimiter; unterminated escapes report the offset
/// of the backslash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeError {
    kind: DecodeErrorKind,
    message: String,
    position: usize,
}

impl DecodeError {
    pub fn new(kind: DecodeErrorKind, position: usize) -> Self {
        Self {
            kind,
            message: String::new(),
            position,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> DecodeErrorKind {
        self.kind
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Messages embed their position already; only the bare-kind
        // fallback needs it appended.
        if self.message.is_empty() {
            write!(f, "{:?} at pos {}", self.kind, self.position)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl StdError for DecodeError {}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EncodeErrorKind {
    /// A value the encoder does not know how to serialize. The variant set
    /// is closed, so this is a defensive case rather than a reachable one.
    UnsupportedValue,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeError {
    kind: EncodeErrorKind,
    message: String,
}

impl EncodeError {
    pub fn new(kind: EncodeErrorKind) -> Self {
        Self {
            kind,
            message: String::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> EncodeErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{:?}", self.kind)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl StdError for EncodeError {}

#[cfg(test)]
mod tests {
    use super::{DecodeError, DecodeErrorKind};

    #[test]
    fn decode_error_display_includes_position() {
        let err = DecodeError::new(DecodeErrorKind::UnexpectedSymbol, 7)
            .with_message("unexpected symbol '@' at pos 7");
        assert_eq!(err.to_string(), "unexpected symbol '@' at pos 7");
        assert_eq!(err.kind(), DecodeErrorKind::UnexpectedSymbol);
        assert_eq!(err.position(), 7);
    }

    #[test]
    fn decode_error_display_without_message_names_kind() {
        let err = DecodeError::new(DecodeErrorKind::StackExhausted, 12);
        assert_eq!(err.to_string(), "StackExhausted at pos 12");
    }
}
