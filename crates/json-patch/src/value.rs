//! The document value model.
//!
//! Documents are `serde_json::Value` trees built with the `preserve_order`
//! and `arbitrary_precision` features: objects keep insertion order and
//! numbers keep the literal text they were decoded from, so
//! decode → patch → encode never reorders keys or rounds numbers.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
pub use serde_json::{Map, Number, Value};

use crate::types::PatchError;

/// Decode a JSON document into the value model.
///
/// # Errors
///
/// Returns [`PatchError::MalformedDocument`] if `bytes` is not valid JSON.
pub fn decode_document(bytes: &[u8]) -> Result<Value, PatchError> {
    serde_json::from_slice(bytes).map_err(|e| PatchError::MalformedDocument(e.to_string()))
}

/// Serialize `value` with `indent` spaces per nesting level.
///
/// An indent of `0` produces compact output. Key order and numeric literals
/// are reproduced as stored.
pub fn encode(value: &Value, indent: usize) -> serde_json::Result<Vec<u8>> {
    if indent == 0 {
        return serde_json::to_vec(value);
    }
    let indent = " ".repeat(indent);
    let mut out = Vec::with_capacity(128);
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut ser = Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    Ok(out)
}

/// [`encode`] into a `String`.
pub fn encode_string(value: &Value, indent: usize) -> serde_json::Result<String> {
    let bytes = encode(value, indent)?;
    // serde_json only ever emits UTF-8.
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Structural equality as used by the `test` operation.
///
/// - objects compare key by key, regardless of key order
/// - arrays compare element by element, in order
/// - numbers compare by exact decimal value, so `1`, `1.0` and `1e0` are
///   equal while literals that only agree as `f64` are not
///
/// # Examples
///
/// ```
/// use jsonpatch::value::{decode_document, deep_equal};
///
/// let a = decode_document(br#"{"x": 1, "y": [1.0, 2]}"#).unwrap();
/// let b = decode_document(br#"{"y": [1, 2e0], "x": 1.00}"#).unwrap();
/// assert!(deep_equal(&a, &b));
/// ```
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::String(a), Value::String(b)) => a == b,

        (Value::Array(arr_a), Value::Array(arr_b)) => {
            arr_a.len() == arr_b.len() && arr_a.iter().zip(arr_b).all(|(x, y)| deep_equal(x, y))
        }

        (Value::Object(obj_a), Value::Object(obj_b)) => {
            if obj_a.len() != obj_b.len() {
                return false;
            }
            for (key, val_a) in obj_a {
                match obj_b.get(key) {
                    Some(val_b) if deep_equal(val_a, val_b) => {}
                    _ => return false,
                }
            }
            true
        }

        // Different kinds are never equal
        _ => false,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if a == b {
        return true;
    }
    match (Decimal::parse(&a.to_string()), Decimal::parse(&b.to_string())) {
        (Some(x), Some(y)) => x == y,
        _ => matches!((a.as_f64(), b.as_f64()), (Some(x), Some(y)) if x == y),
    }
}

/// A JSON number literal reduced to `sign * digits * 10^exponent`, with no
/// leading or trailing zeros in `digits`. Zero is always positive with no
/// digits, so equal values have equal parts.
#[derive(Debug, PartialEq, Eq)]
struct Decimal {
    negative: bool,
    digits: String,
    exponent: i64,
}

impl Decimal {
    fn parse(text: &str) -> Option<Self> {
        let (negative, rest) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (mantissa, exp) = match rest.find(|c| c == 'e' || c == 'E') {
            Some(at) => (&rest[..at], rest[at + 1..].parse::<i64>().ok()?),
            None => (rest, 0),
        };
        let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if int.is_empty() || !int.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }

        let all: String = int.chars().chain(frac.chars()).collect();
        let significant = all.trim_start_matches('0');
        let digits = significant.trim_end_matches('0');
        if digits.is_empty() {
            return Some(Self {
                negative: false,
                digits: String::new(),
                exponent: 0,
            });
        }
        let trailing = (significant.len() - digits.len()) as i64;
        let exponent = exp.checked_sub(frac.len() as i64)?.checked_add(trailing)?;
        Some(Self {
            negative,
            digits: digits.to_string(),
            exponent,
        })
    }
}
