//! Pointer syntax checks.

use crate::JsonPointerError;

/// Check the syntax of a JSON Pointer string.
///
/// A pointer is either empty (the whole document) or starts with `/`, and
/// every `~` begins one of the two escapes `~0` and `~1`.
///
/// # Errors
///
/// [`JsonPointerError::PointerInvalid`] carrying the offending pointer.
///
/// # Example
///
/// ```
/// use jsonpatch_pointer::validate_json_pointer;
///
/// validate_json_pointer("").unwrap();
/// validate_json_pointer("/foo/bar").unwrap();
/// validate_json_pointer("foo").unwrap_err();
/// validate_json_pointer("/a~2b").unwrap_err();
/// ```
pub fn validate_json_pointer(pointer: &str) -> Result<(), JsonPointerError> {
    let invalid = || JsonPointerError::PointerInvalid {
        pointer: pointer.to_string(),
    };
    if pointer.is_empty() {
        return Ok(());
    }
    if !pointer.starts_with('/') {
        return Err(invalid());
    }
    let mut bytes = pointer.bytes();
    while let Some(b) = bytes.next() {
        if b == b'~' && !matches!(bytes.next(), Some(b'0' | b'1')) {
            return Err(invalid());
        }
    }
    Ok(())
}
