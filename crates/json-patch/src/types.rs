//! Core types for the JSON Patch engine: operations and errors.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

pub use jsonpatch_pointer::Path;
use jsonpatch_pointer::{format_json_pointer, JsonPointerError};

use crate::codec::json::to_json;

// ── Error ─────────────────────────────────────────────────────────────────

/// Why a patch could not be decoded or an operation could not be applied.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    #[error("malformed JSON Pointer {pointer:?}")]
    MalformedPointer { pointer: String },
    #[error("path {path:?} not found")]
    PathNotFound { path: String },
    #[error("invalid array index {token:?} in {path:?}")]
    InvalidArrayIndex { path: String, token: String },
    #[error("cannot move {from:?} into itself at {path:?}")]
    InvalidMove { from: String, path: String },
    #[error("testing value {path} failed: expected {expected}, found {actual}")]
    TestFailed {
        path: String,
        expected: Value,
        actual: Value,
    },
    #[error("unknown operation {0:?}")]
    UnknownOperation(String),
    #[error("malformed patch: {0}")]
    MalformedPatch(String),
    #[error("malformed document: {0}")]
    MalformedDocument(String),
    #[error("malformed batch: {0}")]
    MalformedBatch(String),
}

impl PatchError {
    /// Translate a pointer navigation failure at `path` into a patch error.
    pub(crate) fn from_pointer(err: JsonPointerError, path: &[String]) -> Self {
        let path = format_json_pointer(path);
        match err {
            JsonPointerError::InvalidIndex { token } => {
                PatchError::InvalidArrayIndex { path, token }
            }
            JsonPointerError::PointerInvalid { pointer } => {
                PatchError::MalformedPointer { pointer }
            }
            JsonPointerError::NotFound | JsonPointerError::NoParent => {
                PatchError::PathNotFound { path }
            }
        }
    }

    pub(crate) fn not_found(path: &[String]) -> Self {
        PatchError::PathNotFound {
            path: format_json_pointer(path),
        }
    }
}

/// A failed patch application: which operation failed and why.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("operation [index = {index}] {op} failed")]
pub struct OperationError {
    /// Position of the failing operation in the patch.
    pub index: usize,
    /// The failing operation.
    pub op: Op,
    #[source]
    pub source: PatchError,
}

// ── Op enum ───────────────────────────────────────────────────────────────

/// A JSON Patch operation (RFC 6902 §4).
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Add { path: Path, value: Value },
    Remove { path: Path },
    Replace { path: Path, value: Value },
    Move { from: Path, path: Path },
    Copy { from: Path, path: Path },
    Test { path: Path, value: Value },
}

impl Op {
    /// Returns the operation name as it appears in the `op` member.
    pub fn op_name(&self) -> &'static str {
        match self {
            Op::Add { .. } => "add",
            Op::Remove { .. } => "remove",
            Op::Replace { .. } => "replace",
            Op::Move { .. } => "move",
            Op::Copy { .. } => "copy",
            Op::Test { .. } => "test",
        }
    }

    /// Returns the target path of the operation.
    pub fn path(&self) -> &Path {
        match self {
            Op::Add { path, .. }
            | Op::Remove { path }
            | Op::Replace { path, .. }
            | Op::Move { path, .. }
            | Op::Copy { path, .. }
            | Op::Test { path, .. } => path,
        }
    }

    /// Returns the source path of `move` and `copy`.
    pub fn from(&self) -> Option<&Path> {
        match self {
            Op::Move { from, .. } | Op::Copy { from, .. } => Some(from),
            _ => None,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", to_json(self))
    }
}
