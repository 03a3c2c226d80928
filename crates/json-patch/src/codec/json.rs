//! JSON codec for JSON Patch operations.
//!
//! Converts operations to/from `serde_json::Value` in RFC 6902 format.

use serde_json::{json, Map, Value};

use jsonpatch_pointer::{format_json_pointer, parse_json_pointer};

use crate::types::{Op, PatchError};

// ── Path helpers ──────────────────────────────────────────────────────────

fn encode_path(path: &[String]) -> Value {
    Value::String(format_json_pointer(path))
}

fn decode_path(
    map: &Map<String, Value>,
    member: &str,
    op: &str,
) -> Result<Vec<String>, PatchError> {
    let pointer = match map.get(member) {
        Some(Value::String(s)) => s,
        Some(_) => {
            return Err(PatchError::MalformedPatch(format!(
                "\"{op}\" operation \"{member}\" must be a string"
            )))
        }
        None => {
            return Err(PatchError::MalformedPatch(format!(
                "\"{op}\" operation is missing \"{member}\""
            )))
        }
    };
    parse_json_pointer(pointer).map_err(|_| PatchError::MalformedPointer {
        pointer: pointer.clone(),
    })
}

fn decode_value(map: &Map<String, Value>, op: &str) -> Result<Value, PatchError> {
    map.get("value").cloned().ok_or_else(|| {
        PatchError::MalformedPatch(format!("\"{op}\" operation is missing \"value\""))
    })
}

// ── Serialization ─────────────────────────────────────────────────────────

/// Serialize an `Op` to a `serde_json::Value` in the JSON Patch format.
pub fn to_json(op: &Op) -> Value {
    match op {
        Op::Add { path, value } => json!({
            "op": "add",
            "path": encode_path(path),
            "value": value
        }),
        Op::Remove { path } => json!({
            "op": "remove",
            "path": encode_path(path)
        }),
        Op::Replace { path, value } => json!({
            "op": "replace",
            "path": encode_path(path),
            "value": value
        }),
        Op::Move { from, path } => json!({
            "op": "move",
            "from": encode_path(from),
            "path": encode_path(path)
        }),
        Op::Copy { from, path } => json!({
            "op": "copy",
            "from": encode_path(from),
            "path": encode_path(path)
        }),
        Op::Test { path, value } => json!({
            "op": "test",
            "path": encode_path(path),
            "value": value
        }),
    }
}

/// Serialize a list of operations to a JSON array.
pub fn to_json_patch(ops: &[Op]) -> Value {
    Value::Array(ops.iter().map(to_json).collect())
}

// ── Deserialization ───────────────────────────────────────────────────────

/// Deserialize a single operation object.
///
/// Members other than `op`, `path`, `from` and `value` are ignored.
///
/// # Errors
///
/// - [`PatchError::UnknownOperation`] if `op` names none of the six RFC 6902
///   operations
/// - [`PatchError::MalformedPointer`] if `path` or `from` is not a valid
///   JSON Pointer
/// - [`PatchError::MalformedPatch`] for any other shape problem
pub fn from_json(v: &Value) -> Result<Op, PatchError> {
    let map = v
        .as_object()
        .ok_or_else(|| PatchError::MalformedPatch("operation must be an object".into()))?;
    let op = match map.get("op") {
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return Err(PatchError::MalformedPatch("\"op\" must be a string".into())),
        None => return Err(PatchError::MalformedPatch("operation is missing \"op\"".into())),
    };

    match op {
        "add" => Ok(Op::Add {
            path: decode_path(map, "path", op)?,
            value: decode_value(map, op)?,
        }),
        "remove" => Ok(Op::Remove {
            path: decode_path(map, "path", op)?,
        }),
        "replace" => Ok(Op::Replace {
            path: decode_path(map, "path", op)?,
            value: decode_value(map, op)?,
        }),
        "move" => Ok(Op::Move {
            from: decode_path(map, "from", op)?,
            path: decode_path(map, "path", op)?,
        }),
        "copy" => Ok(Op::Copy {
            from: decode_path(map, "from", op)?,
            path: decode_path(map, "path", op)?,
        }),
        "test" => Ok(Op::Test {
            path: decode_path(map, "path", op)?,
            value: decode_value(map, op)?,
        }),
        other => Err(PatchError::UnknownOperation(other.to_string())),
    }
}

/// Deserialize a JSON Patch document (an array of operations).
pub fn from_json_patch(v: &Value) -> Result<Vec<Op>, PatchError> {
    let arr = v
        .as_array()
        .ok_or_else(|| PatchError::MalformedPatch("patch must be an array of operations".into()))?;
    arr.iter().map(from_json).collect()
}

/// Decode raw patch bytes.
///
/// # Errors
///
/// [`PatchError::MalformedPatch`] if the bytes are not JSON, otherwise as
/// [`from_json_patch`].
pub fn decode(bytes: &[u8]) -> Result<Vec<Op>, PatchError> {
    let raw: Value =
        serde_json::from_slice(bytes).map_err(|e| PatchError::MalformedPatch(e.to_string()))?;
    from_json_patch(&raw)
}

// ── Tests ─────────────────────────────────────────────────────────────────
