//! Purpose: Byte-exact JSON codec for loosely typed host values.
//! Exports: `encode`, `decode`, `decode_with_limits`, `Value`, limits and error types.
//! Role: Library crate backing the `jsonite` binary; the codec pair is the whole contract.
//! Invariants: Both operations are pure over their input; no state is shared between calls.
//! Invariants: Strings are raw byte sequences end to end; content is never validated or repaired.
pub mod core;

pub use crate::core::decode::{DEFAULT_MAX_DEPTH, DecodeLimits, decode, decode_with_limits};
pub use crate::core::encode::encode;
pub use crate::core::error::{DecodeError, DecodeErrorKind, EncodeError, EncodeErrorKind};
pub use crate::core::value::Value;
