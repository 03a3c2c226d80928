//! JSON Patch (RFC 6902) engine.
//!
//! Decode a patch, apply it to a document, and encode the result:
//!
//! ```
//! use jsonpatch::{apply_patch, decode, encode_string, value::decode_document};
//!
//! let doc = decode_document(br#"{"a":[{"b":1,"c":2},{"b":3,"c":4}]}"#).unwrap();
//! let patch = decode(br#"[
//!     {"op": "test", "path": "/a/0/b", "value": 1},
//!     {"op": "replace", "path": "/a/0/b", "value": 11},
//!     {"op": "add", "path": "/a/-", "value": {"b": 5, "c": 6}},
//!     {"op": "test", "path": "/a/1/c", "value": 4},
//!     {"op": "remove", "path": "/a/1/c"}
//! ]"#).unwrap();
//!
//! let out = apply_patch(&doc, &patch).unwrap();
//! assert_eq!(
//!     encode_string(&out, 0).unwrap(),
//!     r#"{"a":[{"b":11,"c":2},{"b":3},{"b":5,"c":6}]}"#
//! );
//! ```
//!
//! Only the six RFC 6902 operations are supported: `add`, `remove`,
//! `replace`, `move`, `copy` and `test`.

pub mod apply;
pub mod batch;
pub mod codec;
pub mod types;
pub mod value;

pub use apply::{apply_op, apply_ops, apply_patch};
pub use batch::{
    apply_batch, apply_to_documents, decode_batch, BatchEntry, BatchError, DocumentStore,
    StoreError,
};
pub use codec::json::{decode, from_json, from_json_patch, to_json, to_json_patch};
pub use types::{Op, OperationError, Path, PatchError};
pub use value::{decode_document, deep_equal, encode, encode_string, Value};
