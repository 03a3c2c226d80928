//! JSON Pointer (RFC 6901) utilities.
//!
//! This crate implements helper functions for [JSON Pointer (RFC 6901)](https://tools.ietf.org/html/rfc6901)
//! over `serde_json::Value` documents.
//!
//! # Example
//!
//! ```
//! use jsonpatch_pointer::{parse_json_pointer, format_json_pointer, find};
//!
//! // Parse a JSON pointer string into path components
//! let path = parse_json_pointer("/foo/bar").unwrap();
//! assert_eq!(path, vec!["foo".to_string(), "bar".to_string()]);
//!
//! // Format path components back to a JSON pointer string
//! let pointer = format_json_pointer(&path);
//! assert_eq!(pointer, "/foo/bar");
//!
//! // Find a value in a JSON document
//! let doc = serde_json::json!({"foo": {"bar": 42}});
//! let val = find(&doc, &path).unwrap();
//! assert_eq!(val, &serde_json::json!(42));
//! ```

use serde_json::Value;
use thiserror::Error;

pub mod types;
pub use types::{IndexMode, Path, PathStep, END_OF_ARRAY};

pub mod validate;
pub use validate::validate_json_pointer;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JsonPointerError {
    #[error("POINTER_INVALID: {pointer:?}")]
    PointerInvalid { pointer: String },
    #[error("NOT_FOUND")]
    NotFound,
    #[error("INVALID_INDEX: {token:?}")]
    InvalidIndex { token: String },
    #[error("NO_PARENT")]
    NoParent,
}

/// Unescapes a JSON Pointer path component.
///
/// Per RFC 6901, `~1` is replaced with `/` and `~0` is replaced with `~`.
/// The input is expected to have passed [`validate_json_pointer`].
///
/// # Example
///
/// ```
/// use jsonpatch_pointer::unescape_component;
///
/// assert_eq!(unescape_component("a~0b"), "a~b");
/// assert_eq!(unescape_component("c~1d"), "c/d");
/// assert_eq!(unescape_component("~01"), "~1");
/// ```
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    // Order matters: ~1 must be replaced before ~0
    component.replace("~1", "/").replace("~0", "~")
}

/// Escapes a JSON Pointer path component.
///
/// Per RFC 6901, `/` is replaced with `~1` and `~` is replaced with `~0`.
///
/// # Example
///
/// ```
/// use jsonpatch_pointer::escape_component;
///
/// assert_eq!(escape_component("a~b"), "a~0b");
/// assert_eq!(escape_component("c/d"), "c~1d");
/// assert_eq!(escape_component("no-escapes"), "no-escapes");
/// ```
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    // Order matters: ~ must be escaped before /
    component.replace('~', "~0").replace('/', "~1")
}

/// Parse a JSON Pointer string into path components.
///
/// - Empty string returns the root path
/// - Anything else must start with `/`; each `/`-separated segment is one
///   component, unescaped
///
/// # Errors
///
/// Returns [`JsonPointerError::PointerInvalid`] for relative pointers and
/// malformed `~` escapes.
///
/// # Example
///
/// ```
/// use jsonpatch_pointer::parse_json_pointer;
///
/// assert_eq!(parse_json_pointer("").unwrap(), Vec::<String>::new());
/// assert_eq!(parse_json_pointer("/").unwrap(), vec![""]);
/// assert_eq!(parse_json_pointer("/foo/bar").unwrap(), vec!["foo", "bar"]);
/// assert_eq!(parse_json_pointer("/a~0b/c~1d").unwrap(), vec!["a~b", "c/d"]);
/// assert!(parse_json_pointer("foo").is_err());
/// ```
pub fn parse_json_pointer(pointer: &str) -> Result<Path, JsonPointerError> {
    validate_json_pointer(pointer)?;
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    Ok(pointer[1..].split('/').map(unescape_component).collect())
}

/// Format path components into a JSON Pointer string.
///
/// Returns an empty string for the root path (empty components).
///
/// # Example
///
/// ```
/// use jsonpatch_pointer::format_json_pointer;
///
/// assert_eq!(format_json_pointer(&[]), "");
/// assert_eq!(format_json_pointer(&["foo".to_string()]), "/foo");
/// assert_eq!(format_json_pointer(&["a/b".to_string(), "0".to_string()]), "/a~1b/0");
/// ```
pub fn format_json_pointer(path: &[String]) -> String {
    let mut out = String::new();
    for component in path {
        out.push('/');
        out.push_str(&escape_component(component));
    }
    out
}

/// Check if `parent` path strictly contains the `child` path.
///
/// # Example
///
/// ```
/// use jsonpatch_pointer::is_child;
///
/// let parent = vec!["foo".to_string()];
/// let child = vec!["foo".to_string(), "bar".to_string()];
/// assert!(is_child(&parent, &child));
/// assert!(!is_child(&child, &parent));
/// assert!(!is_child(&parent, &parent));
/// ```
pub fn is_child(parent: &[String], child: &[String]) -> bool {
    parent.len() < child.len() && child[..parent.len()] == *parent
}

/// Check if two paths are equal.
pub fn is_path_equal(p1: &[String], p2: &[String]) -> bool {
    p1 == p2
}

/// Get the parent path of a given path.
///
/// # Errors
///
/// Returns [`JsonPointerError::NoParent`] for the root path.
///
/// # Example
///
/// ```
/// use jsonpatch_pointer::parent;
///
/// assert_eq!(parent(&["foo".to_string(), "bar".to_string()]).unwrap(), vec!["foo"]);
/// assert!(parent(&[]).is_err());
/// ```
pub fn parent(path: &[String]) -> Result<Path, JsonPointerError> {
    match path.split_last() {
        Some((_, rest)) => Ok(rest.to_vec()),
        None => Err(JsonPointerError::NoParent),
    }
}

/// Check if a string is a syntactically valid array index: ASCII digits
/// with no leading zero (except `"0"` itself).
///
/// # Example
///
/// ```
/// use jsonpatch_pointer::is_valid_index;
///
/// assert!(is_valid_index("0"));
/// assert!(is_valid_index("123"));
/// assert!(!is_valid_index("-1"));
/// assert!(!is_valid_index("01"));
/// assert!(!is_valid_index("-"));
/// ```
pub fn is_valid_index(index: &str) -> bool {
    let bytes = index.as_bytes();
    if bytes.is_empty() || (bytes.len() > 1 && bytes[0] == b'0') {
        return false;
    }
    bytes.iter().all(u8::is_ascii_digit)
}

/// Resolve an array index token against an array of `len` elements.
///
/// `-` resolves to `len` in [`IndexMode::Insert`] and is rejected
/// otherwise.
///
/// # Errors
///
/// Returns [`JsonPointerError::InvalidIndex`] for non-numeric, signed or
/// zero-padded tokens and for indices outside the range allowed by `mode`.
///
/// # Example
///
/// ```
/// use jsonpatch_pointer::{array_index, IndexMode};
///
/// assert_eq!(array_index("-", 3, IndexMode::Insert).unwrap(), 3);
/// assert_eq!(array_index("3", 3, IndexMode::Insert).unwrap(), 3);
/// assert!(array_index("3", 3, IndexMode::Existing).is_err());
/// assert!(array_index("-", 3, IndexMode::Existing).is_err());
/// ```
pub fn array_index(token: &str, len: usize, mode: IndexMode) -> Result<usize, JsonPointerError> {
    let invalid = || JsonPointerError::InvalidIndex {
        token: token.to_string(),
    };
    let idx = if token == END_OF_ARRAY {
        match mode {
            IndexMode::Insert => len,
            IndexMode::Existing => return Err(invalid()),
        }
    } else {
        if !is_valid_index(token) {
            return Err(invalid());
        }
        token.parse::<usize>().map_err(|_| invalid())?
    };
    match mode.upper_bound(len) {
        Some(max) if idx <= max => Ok(idx),
        _ => Err(invalid()),
    }
}

/// Index of an existing element. Out-of-range intermediate steps are
/// missing locations rather than bad indices.
fn element_index(step: &str, len: usize, is_last: bool) -> Result<usize, JsonPointerError> {
    match array_index(step, len, IndexMode::Existing) {
        Err(JsonPointerError::InvalidIndex { .. }) if !is_last && is_valid_index(step) => {
            Err(JsonPointerError::NotFound)
        }
        other => other,
    }
}

fn step_ref<'a>(
    current: &'a Value,
    step: &str,
    is_last: bool,
) -> Result<&'a Value, JsonPointerError> {
    match current {
        Value::Object(map) => map.get(step).ok_or(JsonPointerError::NotFound),
        Value::Array(arr) => Ok(&arr[element_index(step, arr.len(), is_last)?]),
        _ => Err(JsonPointerError::NotFound),
    }
}

fn step_mut<'a>(
    current: &'a mut Value,
    step: &str,
    is_last: bool,
) -> Result<&'a mut Value, JsonPointerError> {
    match current {
        Value::Object(map) => map.get_mut(step).ok_or(JsonPointerError::NotFound),
        Value::Array(arr) => {
            let idx = element_index(step, arr.len(), is_last)?;
            Ok(&mut arr[idx])
        }
        _ => Err(JsonPointerError::NotFound),
    }
}

/// Find an existing value in a JSON document by path.
///
/// # Errors
///
/// - [`JsonPointerError::NotFound`] if a key is missing, an intermediate
///   index is out of range, or a step goes through a scalar
/// - [`JsonPointerError::InvalidIndex`] if an array step is not a valid
///   index, is `-`, or the final index is out of range
///
/// # Example
///
/// ```
/// use jsonpatch_pointer::{find, JsonPointerError};
/// use serde_json::json;
///
/// let doc = json!({"foo": {"bar": [1, 2]}});
/// let path = vec!["foo".to_string(), "bar".to_string(), "1".to_string()];
/// assert_eq!(find(&doc, &path).unwrap(), &json!(2));
///
/// let missing = vec!["baz".to_string()];
/// assert_eq!(find(&doc, &missing), Err(JsonPointerError::NotFound));
/// ```
pub fn find<'a>(val: &'a Value, path: &[String]) -> Result<&'a Value, JsonPointerError> {
    let last = path.len().saturating_sub(1);
    let mut current = val;
    for (i, step) in path.iter().enumerate() {
        current = step_ref(current, step, i == last)?;
    }
    Ok(current)
}

/// Mutable counterpart of [`find`].
pub fn find_mut<'a>(
    val: &'a mut Value,
    path: &[String],
) -> Result<&'a mut Value, JsonPointerError> {
    let last = path.len().saturating_sub(1);
    let mut current = val;
    for (i, step) in path.iter().enumerate() {
        current = step_mut(current, step, i == last)?;
    }
    Ok(current)
}

/// Navigate to the container of the location addressed by `path`.
///
/// Returns the container (which may be any value; the caller decides what a
/// scalar container means) and the final, unresolved step.
///
/// # Errors
///
/// [`JsonPointerError::NoParent`] for the root path, otherwise the same
/// errors as [`find`] for the intermediate steps.
pub fn find_parent_mut<'a, 'p>(
    val: &'a mut Value,
    path: &'p [String],
) -> Result<(&'a mut Value, &'p str), JsonPointerError> {
    let (last, parents) = path.split_last().ok_or(JsonPointerError::NoParent)?;
    let mut current = val;
    for step in parents {
        current = step_mut(current, step, false)?;
    }
    Ok((current, last.as_str()))
}

/// Get a value from a JSON document by path.
///
/// Returns `None` if the path doesn't exist or is invalid.
///
/// # Example
///
/// ```
/// use jsonpatch_pointer::get;
/// use serde_json::json;
///
/// let doc = json!({"foo": {"bar": 42}});
/// assert_eq!(get(&doc, &["foo".to_string(), "bar".to_string()]), Some(&json!(42)));
/// assert_eq!(get(&doc, &["missing".to_string()]), None);
/// ```
pub fn get<'a>(val: &'a Value, path: &[String]) -> Option<&'a Value> {
    find(val, path).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn p(pointer: &str) -> Path {
        parse_json_pointer(pointer).unwrap()
    }

    #[test]
    fn test_unescape_component() {
        assert_eq!(unescape_component("foo"), "foo");
        assert_eq!(unescape_component("a~0b"), "a~b");
        assert_eq!(unescape_component("c~1d"), "c/d");
        assert_eq!(unescape_component("a~0b~1c"), "a~b/c");
        assert_eq!(unescape_component("~0~0"), "~~");
        assert_eq!(unescape_component("~1~1"), "//");
        assert_eq!(unescape_component("~01"), "~1");
    }

    #[test]
    fn test_escape_component() {
        assert_eq!(escape_component("foo"), "foo");
        assert_eq!(escape_component("a~b"), "a~0b");
        assert_eq!(escape_component("c/d"), "c~1d");
        assert_eq!(escape_component("~1"), "~01");
    }

    #[test]
    fn test_parse_json_pointer() {
        assert_eq!(p(""), Vec::<String>::new());
        assert_eq!(p("/"), vec![""]);
        assert_eq!(p("/foo/bar"), vec!["foo", "bar"]);
        assert_eq!(p("/foo///"), vec!["foo", "", "", ""]);
        assert_eq!(p("/a~0b/c~1d/1"), vec!["a~b", "c/d", "1"]);
    }

    #[test]
    fn test_parse_json_pointer_rejects_malformed() {
        assert!(matches!(
            parse_json_pointer("foo"),
            Err(JsonPointerError::PointerInvalid { .. })
        ));
        assert!(matches!(
            parse_json_pointer("/foo~"),
            Err(JsonPointerError::PointerInvalid { .. })
        ));
    }

    #[test]
    fn test_is_child() {
        let parent = p("/foo");
        assert!(is_child(&parent, &p("/foo/bar")));
        assert!(is_child(&p(""), &parent));
        assert!(!is_child(&parent, &p("/foobar")));
        assert!(!is_child(&parent, &parent));
    }

    #[test]
    fn test_parent() {
        assert_eq!(parent(&p("/foo/bar")).unwrap(), vec!["foo"]);
        assert_eq!(parent(&p("/foo")).unwrap(), Vec::<String>::new());
        assert_eq!(parent(&[]), Err(JsonPointerError::NoParent));
    }

    #[test]
    fn test_array_index() {
        assert_eq!(array_index("0", 1, IndexMode::Existing), Ok(0));
        assert_eq!(array_index("-", 2, IndexMode::Insert), Ok(2));
        assert!(array_index("01", 5, IndexMode::Existing).is_err());
        assert!(array_index("x", 5, IndexMode::Insert).is_err());
        assert!(array_index("0", 0, IndexMode::Existing).is_err());
        assert!(array_index("99999999999999999999999", 5, IndexMode::Insert).is_err());
    }

    #[test]
    fn test_find_nested() {
        let doc = json!({"a": {"b": [1, 2, 3]}});
        assert_eq!(find(&doc, &p("/a/b/1")), Ok(&json!(2)));
        assert_eq!(find(&doc, &p("")), Ok(&doc));
    }

    #[test]
    fn test_find_explicit_null() {
        let doc = json!({"foo": null});
        assert_eq!(find(&doc, &p("/foo")), Ok(&Value::Null));
    }

    #[test]
    fn test_find_through_scalar() {
        let doc = json!({"a": "text"});
        assert_eq!(find(&doc, &p("/a/0")), Err(JsonPointerError::NotFound));
    }

    #[test]
    fn test_find_out_of_range() {
        let doc = json!({"a": [[1], [2]]});
        assert!(matches!(
            find(&doc, &p("/a/2")),
            Err(JsonPointerError::InvalidIndex { .. })
        ));
        assert_eq!(find(&doc, &p("/a/2/0")), Err(JsonPointerError::NotFound));
        assert!(matches!(
            find(&doc, &p("/a/-/0")),
            Err(JsonPointerError::InvalidIndex { .. })
        ));
    }

    #[test]
    fn test_find_mut_updates_in_place() {
        let mut doc = json!({"a": [1, 2]});
        *find_mut(&mut doc, &p("/a/0")).unwrap() = json!(10);
        assert_eq!(doc, json!({"a": [10, 2]}));
    }

    #[test]
    fn test_find_parent_mut() {
        let mut doc = json!({"a": {"b": 1}});
        let path = p("/a/c");
        let (parent, key) = find_parent_mut(&mut doc, &path).unwrap();
        assert_eq!(parent, &json!({"b": 1}));
        assert_eq!(key, "c");
        assert_eq!(
            find_parent_mut(&mut doc, &[]).unwrap_err(),
            JsonPointerError::NoParent
        );
    }
}
