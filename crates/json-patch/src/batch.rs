//! Batch orchestration.
//!
//! A batch descriptor is an ordered list of `{ "glob": ..., "jsonPatch": [...] }`
//! entries. Each entry's selector is resolved to documents through a
//! [`DocumentStore`], and the entry's patch is applied to every matched
//! document. Nothing is written unless every application succeeds.

use std::fmt;
use std::hash::Hash;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::apply::apply_ops;
use crate::codec::json::from_json_patch;
use crate::types::{Op, OperationError, PatchError};

/// Error type returned by [`DocumentStore`] implementations.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// One `{selector, patch}` pair of a batch descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    /// Selects the documents the patch applies to.
    pub glob: String,
    pub patch: Vec<Op>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEntry {
    glob: String,
    #[serde(rename = "jsonPatch")]
    json_patch: Value,
}

/// Decode a batch descriptor.
///
/// # Errors
///
/// [`PatchError::MalformedBatch`] if the descriptor is not an array of
/// `{glob, jsonPatch}` objects (unknown members included), otherwise the
/// error of the first entry whose patch does not decode.
pub fn decode_batch(v: &Value) -> Result<Vec<BatchEntry>, PatchError> {
    let raw =
        Vec::<RawEntry>::deserialize(v).map_err(|e| PatchError::MalformedBatch(e.to_string()))?;
    raw.into_iter()
        .map(|entry| {
            Ok(BatchEntry {
                patch: from_json_patch(&entry.json_patch)?,
                glob: entry.glob,
            })
        })
        .collect()
}

/// Where documents come from and where patched documents go.
pub trait DocumentStore {
    type Id: Clone + Eq + Hash + fmt::Display;

    /// Resolve a selector to document ids, in a stable order.
    fn select(&self, selector: &str) -> Result<Vec<Self::Id>, StoreError>;

    fn load(&self, id: &Self::Id) -> Result<Value, StoreError>;

    fn store(&mut self, id: &Self::Id, doc: &Value) -> Result<(), StoreError>;
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("cannot select documents matching {selector:?}")]
    Select {
        selector: String,
        #[source]
        source: StoreError,
    },
    #[error("cannot read {document}")]
    Load {
        document: String,
        #[source]
        source: StoreError,
    },
    #[error("error applying JSON Patch to {document}")]
    Apply {
        document: String,
        #[source]
        source: OperationError,
    },
    #[error("cannot write {document}")]
    Store {
        document: String,
        #[source]
        source: StoreError,
    },
}

/// Patched documents waiting for commit, in first-touched order.
struct Session<'s, S: DocumentStore> {
    store: &'s mut S,
    pending: IndexMap<S::Id, Value>,
}

impl<'s, S: DocumentStore> Session<'s, S> {
    fn new(store: &'s mut S) -> Self {
        Self {
            store,
            pending: IndexMap::new(),
        }
    }

    fn select(&self, selector: &str) -> Result<Vec<S::Id>, BatchError> {
        let ids = self.store.select(selector).map_err(|source| BatchError::Select {
            selector: selector.to_string(),
            source,
        })?;
        debug!(selector, matched = ids.len(), "selected documents");
        Ok(ids)
    }

    /// Patch `id`, starting from its pending result if an earlier entry
    /// already touched it.
    fn patch(&mut self, id: &S::Id, patch: &[Op]) -> Result<(), BatchError> {
        let current = match self.pending.get(id) {
            Some(doc) => doc.clone(),
            None => self.store.load(id).map_err(|source| BatchError::Load {
                document: id.to_string(),
                source,
            })?,
        };
        let patched = apply_ops(current, patch).map_err(|source| BatchError::Apply {
            document: id.to_string(),
            source,
        })?;
        self.pending.insert(id.clone(), patched);
        Ok(())
    }

    fn commit(mut self) -> Result<Vec<S::Id>, BatchError> {
        for (id, doc) in &self.pending {
            self.store.store(id, doc).map_err(|source| BatchError::Store {
                document: id.to_string(),
                source,
            })?;
        }
        info!(documents = self.pending.len(), "wrote patched documents");
        Ok(self.pending.into_keys().collect())
    }
}

/// Apply every batch entry, then store all patched documents.
///
/// Returns the ids of the written documents. The first failure aborts the
/// run before anything is stored.
pub fn apply_batch<S: DocumentStore>(
    store: &mut S,
    entries: &[BatchEntry],
) -> Result<Vec<S::Id>, BatchError> {
    let mut session = Session::new(store);
    for entry in entries {
        for id in session.select(&entry.glob)? {
            session.patch(&id, &entry.patch)?;
        }
    }
    session.commit()
}

/// Apply one patch to an explicit list of documents, then store them all.
///
/// Same all-or-nothing contract as [`apply_batch`]. A document listed more
/// than once is patched once.
pub fn apply_to_documents<S: DocumentStore>(
    store: &mut S,
    patch: &[Op],
    documents: &[S::Id],
) -> Result<Vec<S::Id>, BatchError> {
    let mut session = Session::new(store);
    for id in documents {
        if session.pending.contains_key(id) {
            continue;
        }
        session.patch(id, patch)?;
    }
    session.commit()
}
