//! JSON Patch apply logic.
//!
//! [`apply_op`] executes one operation in place; [`apply_patch`] and
//! [`apply_ops`] run a whole patch, stopping at the first failure.

use std::mem;

use serde_json::Value;
use tracing::{debug, warn};

use jsonpatch_pointer::{
    array_index, find, find_mut, find_parent_mut, format_json_pointer, is_child, is_path_equal,
    IndexMode,
};

use crate::types::{Op, OperationError, PatchError};
use crate::value::deep_equal;

// ── Individual operation applicators ─────────────────────────────────────

fn apply_add(doc: &mut Value, path: &[String], value: Value) -> Result<Option<Value>, PatchError> {
    if path.is_empty() {
        return Ok(Some(mem::replace(doc, value)));
    }
    let (parent, key) = find_parent_mut(doc, path).map_err(|e| PatchError::from_pointer(e, path))?;
    match parent {
        // Overwriting keeps the key where it was; new keys go last.
        Value::Object(map) => Ok(map.insert(key.to_string(), value)),
        Value::Array(arr) => {
            let idx = array_index(key, arr.len(), IndexMode::Insert)
                .map_err(|e| PatchError::from_pointer(e, path))?;
            arr.insert(idx, value);
            Ok(None)
        }
        _ => Err(PatchError::not_found(path)),
    }
}

fn apply_remove(doc: &mut Value, path: &[String]) -> Result<Value, PatchError> {
    if path.is_empty() {
        return Err(PatchError::not_found(path));
    }
    let (parent, key) = find_parent_mut(doc, path).map_err(|e| PatchError::from_pointer(e, path))?;
    match parent {
        Value::Object(map) => map.shift_remove(key).ok_or_else(|| PatchError::not_found(path)),
        Value::Array(arr) => {
            let idx = array_index(key, arr.len(), IndexMode::Existing)
                .map_err(|e| PatchError::from_pointer(e, path))?;
            Ok(arr.remove(idx))
        }
        _ => Err(PatchError::not_found(path)),
    }
}

fn apply_replace(doc: &mut Value, path: &[String], value: Value) -> Result<Value, PatchError> {
    let target = find_mut(doc, path).map_err(|e| PatchError::from_pointer(e, path))?;
    Ok(mem::replace(target, value))
}

fn apply_copy(
    doc: &mut Value,
    path: &[String],
    from: &[String],
) -> Result<Option<Value>, PatchError> {
    let src = find(doc, from)
        .map_err(|e| PatchError::from_pointer(e, from))?
        .clone();
    apply_add(doc, path, src)
}

fn apply_move(
    doc: &mut Value,
    path: &[String],
    from: &[String],
) -> Result<Option<Value>, PatchError> {
    find(doc, from).map_err(|e| PatchError::from_pointer(e, from))?;
    if is_path_equal(from, path) || is_child(from, path) {
        return Err(PatchError::InvalidMove {
            from: format_json_pointer(from),
            path: format_json_pointer(path),
        });
    }
    // Both halves run against a scratch copy so a failed add leaves `doc`
    // untouched.
    let mut scratch = doc.clone();
    let value = apply_remove(&mut scratch, from)?;
    let old = apply_add(&mut scratch, path, value)?;
    *doc = scratch;
    Ok(old)
}

fn apply_test(doc: &Value, path: &[String], expected: &Value) -> Result<(), PatchError> {
    let actual = find(doc, path).map_err(|e| PatchError::from_pointer(e, path))?;
    if deep_equal(actual, expected) {
        Ok(())
    } else {
        Err(PatchError::TestFailed {
            path: format_json_pointer(path),
            expected: expected.clone(),
            actual: actual.clone(),
        })
    }
}

// ── Main apply functions ──────────────────────────────────────────────────

/// Apply a single operation to the document (in-place mutation).
///
/// Returns the value displaced from the target location, if any: the removed
/// or replaced value, or the previous value of an object key overwritten by
/// `add`/`copy`/`move`.
///
/// # Errors
///
/// On error the document is left as it was before the call.
pub fn apply_op(doc: &mut Value, op: &Op) -> Result<Option<Value>, PatchError> {
    match op {
        Op::Add { path, value } => apply_add(doc, path, value.clone()),
        Op::Remove { path } => apply_remove(doc, path).map(Some),
        Op::Replace { path, value } => apply_replace(doc, path, value.clone()).map(Some),
        Op::Copy { from, path } => apply_copy(doc, path, from),
        Op::Move { from, path } => apply_move(doc, path, from),
        Op::Test { path, value } => {
            apply_test(doc, path, value)?;
            Ok(None)
        }
    }
}

/// Apply a sequence of operations to an owned document.
///
/// Operations run strictly in order; the first failure aborts the patch and
/// reports which operation failed.
pub fn apply_ops(mut doc: Value, ops: &[Op]) -> Result<Value, OperationError> {
    for (index, op) in ops.iter().enumerate() {
        if let Err(source) = apply_op(&mut doc, op) {
            warn!(
                index,
                op = op.op_name(),
                path = %format_json_pointer(op.path()),
                from = ?op.from().map(|from| format_json_pointer(from)),
                error = %source,
                "patch aborted"
            );
            return Err(OperationError {
                index,
                op: op.clone(),
                source,
            });
        }
        debug!(
            index,
            op = op.op_name(),
            path = %format_json_pointer(op.path()),
            "applied operation"
        );
    }
    Ok(doc)
}

/// Apply a patch to a working copy of `doc`.
///
/// The caller's document is never modified, whether or not the patch
/// succeeds.
///
/// # Example
///
/// ```
/// use jsonpatch::{apply_patch, decode};
/// use serde_json::json;
///
/// let doc = json!({"a": [1, 2, 3]});
/// let patch = decode(br#"[{"op": "add", "path": "/a/1", "value": 9}]"#).unwrap();
/// assert_eq!(apply_patch(&doc, &patch).unwrap(), json!({"a": [1, 9, 2, 3]}));
/// assert_eq!(doc, json!({"a": [1, 2, 3]}));
/// ```
pub fn apply_patch(doc: &Value, ops: &[Op]) -> Result<Value, OperationError> {
    apply_ops(doc.clone(), ops)
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(s: &str) -> Vec<String> {
        jsonpatch_pointer::parse_json_pointer(s).unwrap()
    }

    #[test]
    fn add_to_object() {
        let mut doc = json!({"a": 1});
        apply_op(&mut doc, &Op::Add { path: path("/b"), value: json!(2) }).unwrap();
        assert_eq!(doc, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn add_overwrite_keeps_key_position() {
        let mut doc = json!({"a": 1, "b": 2, "c": 3});
        let old = apply_op(&mut doc, &Op::Add { path: path("/a"), value: json!(10) }).unwrap();
        assert_eq!(old, Some(json!(1)));
        assert_eq!(serde_json::to_string(&doc).unwrap(), r#"{"a":10,"b":2,"c":3}"#);
    }

    #[test]
    fn add_to_array() {
        let mut doc = json!([1, 2, 3]);
        apply_op(&mut doc, &Op::Add { path: path("/1"), value: json!(99) }).unwrap();
        assert_eq!(doc, json!([1, 99, 2, 3]));
    }

    #[test]
    fn add_append_array() {
        let mut doc = json!([1, 2]);
        apply_op(&mut doc, &Op::Add { path: path("/-"), value: json!(3) }).unwrap();
        apply_op(&mut doc, &Op::Add { path: path("/3"), value: json!(4) }).unwrap();
        assert_eq!(doc, json!([1, 2, 3, 4]));
    }

    #[test]
    fn add_past_end_is_invalid_index() {
        let mut doc = json!([1, 2]);
        let err = apply_op(&mut doc, &Op::Add { path: path("/3"), value: json!(3) }).unwrap_err();
        assert_eq!(
            err,
            PatchError::InvalidArrayIndex { path: "/3".into(), token: "3".into() }
        );
    }

    #[test]
    fn add_root_replaces_document() {
        let mut doc = json!({"a": 1});
        apply_op(&mut doc, &Op::Add { path: path(""), value: json!([1]) }).unwrap();
        assert_eq!(doc, json!([1]));
    }

    #[test]
    fn add_missing_parent() {
        let mut doc = json!({"a": 1});
        let err = apply_op(&mut doc, &Op::Add { path: path("/x/y"), value: json!(1) }).unwrap_err();
        assert_eq!(err, PatchError::PathNotFound { path: "/x/y".into() });
    }

    #[test]
    fn add_into_scalar() {
        let mut doc = json!({"a": "text"});
        let err = apply_op(&mut doc, &Op::Add { path: path("/a/0"), value: json!(1) }).unwrap_err();
        assert_eq!(err, PatchError::PathNotFound { path: "/a/0".into() });
        assert_eq!(doc, json!({"a": "text"}));
    }

    #[test]
    fn remove_from_object_keeps_order() {
        let mut doc = json!({"a": 1, "b": 2, "c": 3});
        let old = apply_op(&mut doc, &Op::Remove { path: path("/a") }).unwrap();
        assert_eq!(old, Some(json!(1)));
        assert_eq!(serde_json::to_string(&doc).unwrap(), r#"{"b":2,"c":3}"#);
    }

    #[test]
    fn remove_from_array_shifts_left() {
        let mut doc = json!([1, 2, 3]);
        apply_op(&mut doc, &Op::Remove { path: path("/0") }).unwrap();
        assert_eq!(doc, json!([2, 3]));
    }

    #[test]
    fn remove_errors() {
        let mut doc = json!({"a": [1]});
        assert_eq!(
            apply_op(&mut doc, &Op::Remove { path: path("/b") }),
            Err(PatchError::PathNotFound { path: "/b".into() })
        );
        assert!(matches!(
            apply_op(&mut doc, &Op::Remove { path: path("/a/-") }),
            Err(PatchError::InvalidArrayIndex { .. })
        ));
        assert!(matches!(
            apply_op(&mut doc, &Op::Remove { path: path("/a/1") }),
            Err(PatchError::InvalidArrayIndex { .. })
        ));
        assert_eq!(
            apply_op(&mut doc, &Op::Remove { path: path("") }),
            Err(PatchError::PathNotFound { path: "".into() })
        );
    }

    #[test]
    fn replace_value() {
        let mut doc = json!({"a": 1, "b": 2});
        let old = apply_op(&mut doc, &Op::Replace { path: path("/a"), value: json!(99) }).unwrap();
        assert_eq!(old, Some(json!(1)));
        assert_eq!(serde_json::to_string(&doc).unwrap(), r#"{"a":99,"b":2}"#);
    }

    #[test]
    fn replace_missing() {
        let mut doc = json!({"a": [1]});
        assert_eq!(
            apply_op(&mut doc, &Op::Replace { path: path("/b"), value: json!(1) }),
            Err(PatchError::PathNotFound { path: "/b".into() })
        );
        assert!(matches!(
            apply_op(&mut doc, &Op::Replace { path: path("/a/-"), value: json!(1) }),
            Err(PatchError::InvalidArrayIndex { .. })
        ));
    }

    #[test]
    fn copy_op_is_deep() {
        let mut doc = json!({"a": {"x": [1]}, "b": {}});
        apply_op(&mut doc, &Op::Copy { from: path("/a"), path: path("/b/y") }).unwrap();
        apply_op(&mut doc, &Op::Add { path: path("/a/x/-"), value: json!(2) }).unwrap();
        assert_eq!(doc, json!({"a": {"x": [1, 2]}, "b": {"y": {"x": [1]}}}));
    }

    #[test]
    fn copy_missing_source() {
        let mut doc = json!({});
        assert_eq!(
            apply_op(&mut doc, &Op::Copy { from: path("/a"), path: path("/b") }),
            Err(PatchError::PathNotFound { path: "/a".into() })
        );
    }

    #[test]
    fn move_op() {
        let mut doc = json!({"a": 1, "b": 2});
        apply_op(&mut doc, &Op::Move { from: path("/a"), path: path("/c") }).unwrap();
        assert_eq!(doc, json!({"b": 2, "c": 1}));
    }

    #[test]
    fn move_within_array() {
        let mut doc = json!([1, 2, 3, 4]);
        apply_op(&mut doc, &Op::Move { from: path("/0"), path: path("/3") }).unwrap();
        assert_eq!(doc, json!([2, 3, 4, 1]));
    }

    #[test]
    fn move_into_own_child_is_invalid() {
        let mut doc = json!({"a": {}});
        let op = Op::Move { from: path("/a"), path: path("/a/b") };
        let err = apply_op(&mut doc, &op).unwrap_err();
        assert_eq!(err, PatchError::InvalidMove { from: "/a".into(), path: "/a/b".into() });
        let err = apply_op(&mut doc, &Op::Move { from: path("/a"), path: path("/a") }).unwrap_err();
        assert!(matches!(err, PatchError::InvalidMove { .. }));
        assert_eq!(doc, json!({"a": {}}));
    }

    #[test]
    fn move_to_sibling_with_shared_prefix() {
        let mut doc = json!({"a": 1, "ab": {}});
        apply_op(&mut doc, &Op::Move { from: path("/a"), path: path("/ab/a") }).unwrap();
        assert_eq!(doc, json!({"ab": {"a": 1}}));
    }

    #[test]
    fn failed_move_leaves_document_untouched() {
        let mut doc = json!({"a": 1, "b": [1]});
        let op = Op::Move { from: path("/a"), path: path("/b/5") };
        let err = apply_op(&mut doc, &op).unwrap_err();
        assert!(matches!(err, PatchError::InvalidArrayIndex { .. }));
        assert_eq!(serde_json::to_string(&doc).unwrap(), r#"{"a":1,"b":[1]}"#);
    }

    #[test]
    fn test_pass() {
        let mut doc = json!({"a": 42});
        assert_eq!(apply_op(&mut doc, &Op::Test { path: path("/a"), value: json!(42) }), Ok(None));
    }

    #[test]
    fn test_fail() {
        let mut doc = json!({"a": {"b": 1}});
        let result = apply_op(&mut doc, &Op::Test { path: path("/a/b"), value: json!(2) });
        assert_eq!(
            result,
            Err(PatchError::TestFailed {
                path: "/a/b".into(),
                expected: json!(2),
                actual: json!(1)
            })
        );
    }

    #[test]
    fn test_missing() {
        let mut doc = json!({});
        assert_eq!(
            apply_op(&mut doc, &Op::Test { path: path("/a"), value: json!(null) }),
            Err(PatchError::PathNotFound { path: "/a".into() })
        );
    }

    #[test]
    fn apply_ops_sequence() {
        let doc = json!({"a": 1});
        let ops = vec![
            Op::Add { path: path("/b"), value: json!(2) },
            Op::Replace { path: path("/a"), value: json!(10) },
        ];
        let result = apply_ops(doc, &ops).unwrap();
        assert_eq!(result, json!({"a": 10, "b": 2}));
    }

    #[test]
    fn apply_patch_stops_at_first_failure() {
        let doc = json!({"a": 1});
        let ops = vec![
            Op::Add { path: path("/b"), value: json!(2) },
            Op::Test { path: path("/a"), value: json!(2) },
            Op::Add { path: path("/c"), value: json!(3) },
        ];
        let err = apply_patch(&doc, &ops).unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.op, ops[1]);
        assert!(matches!(err.source, PatchError::TestFailed { .. }));
        assert_eq!(doc, json!({"a": 1}));
    }
}
