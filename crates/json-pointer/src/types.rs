//! Type definitions for JSON Pointer.

/// A step in a JSON Pointer path, stored unescaped.
///
/// Whether a step is an object key or an array index is decided by the
/// container it is applied to.
pub type PathStep = String;

/// A JSON Pointer path. The empty path addresses the whole document.
pub type Path = Vec<PathStep>;

/// The token that addresses the slot one past the end of an array.
pub const END_OF_ARRAY: &str = "-";

/// How an array index token is going to be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    /// The element must exist: `0..len`.
    Existing,
    /// Insert before the index: `0..=len`, or `-` for append.
    Insert,
}

impl IndexMode {
    /// Largest index accepted for an array of `len` elements, if any.
    pub fn upper_bound(self, len: usize) -> Option<usize> {
        match self {
            IndexMode::Existing => len.checked_sub(1),
            IndexMode::Insert => Some(len),
        }
    }
}
