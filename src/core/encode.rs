//! Purpose: Serialize a `Value` tree into JSON text bytes.
//! Exports: `encode`.
//! Role: Recursive emitter, including the array/object classification pre-pass.
//! Invariants: No inserted whitespace, no trailing commas.
//! Invariants: Mapping classification happens once per mapping, before emission.
//! Invariants: `Opaque` emits an unquoted diagnostic token; the output is then not valid JSON.

use bstr::BString;

use crate::core::error::EncodeError;
use crate::core::escape;
use crate::core::value::Value;

/// Encode `root` into compact JSON text. Numbers render through `f64`'s
/// default formatting, so NaN and the infinities come out as `NaN`, `inf`
/// and `-inf`, which decode accepts back.
pub fn encode(root: &Value) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();
    encode_value(root, &mut out)?;
    Ok(out)
}

fn encode_value(value: &Value, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(num) => out.extend_from_slice(num.to_string().as_bytes()),
        Value::String(bytes) => encode_string(bytes, out),
        Value::Opaque { kind, token } => {
            // Unquoted and unescaped: a debug marker for host entities with
            // no JSON equivalent, not interchange output.
            out.extend_from_slice(kind.as_bytes());
            out.extend_from_slice(b": ");
            out.extend_from_slice(token.as_bytes());
        }
        Value::Array(items) => encode_array(items.iter(), out)?,
        Value::Object(entries) => match as_contiguous_array(entries) {
            Some(items) => encode_array(items, out)?,
            None => encode_object(entries, out)?,
        },
    }
    Ok(())
}

fn encode_array<'a, I>(items: I, out: &mut Vec<u8>) -> Result<(), EncodeError>
where
    I: IntoIterator<Item = &'a Value>,
{
    out.push(b'[');
    let mut need_sep = false;
    for item in items {
        if need_sep {
            out.push(b',');
        }
        encode_value(item, out)?;
        need_sep = true;
    }
    out.push(b']');
    Ok(())
}

fn encode_object(entries: &[(BString, Value)], out: &mut Vec<u8>) -> Result<(), EncodeError> {
    out.push(b'{');
    let mut need_sep = false;
    for (key, value) in entries {
        if need_sep {
            out.push(b',');
        }
        encode_string(key.as_ref(), out);
        out.push(b':');
        encode_value(value, out)?;
        need_sep = true;
    }
    out.push(b'}');
    Ok(())
}

fn encode_string(bytes: &[u8], out: &mut Vec<u8>) {
    out.push(b'"');
    escape::escape_into(bytes, out);
    out.push(b'"');
}

/// Array-classification pre-pass, one full pass over the entries distinct
/// from emission: a mapping serializes as a JSON array iff it is non-empty
/// and its keys are exactly the canonical decimal indexes "1" … "N" (N =
/// entry count), each present once, in any stored order. On success the
/// returned elements are in index order. An empty mapping never classifies
/// as an array.
fn as_contiguous_array(entries: &[(BString, Value)]) -> Option<Vec<&Value>> {
    if entries.is_empty() {
        return None;
    }
    let mut slots: Vec<Option<&Value>> = vec![None; entries.len()];
    for (key, value) in entries {
        let index = parse_entry_index(key.as_ref())?;
        if index < 1 || index > entries.len() {
            return None;
        }
        let slot = &mut slots[index - 1];
        if slot.is_some() {
            // Host-supplied duplicate index.
            return None;
        }
        *slot = Some(value);
    }
    slots.into_iter().collect()
}

/// Canonical positive decimal index: ASCII digits only, no sign, no leading
/// zero. "1" and "10" qualify; "0", "01", "+1" and "1.0" do not.
fn parse_entry_index(key: &[u8]) -> Option<usize> {
    if key.is_empty() || key[0] == b'0' || !key.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let mut index = 0usize;
    for &byte in key {
        index = index
            .checked_mul(10)?
            .checked_add(usize::from(byte - b'0'))?;
    }
    Some(index)
}
