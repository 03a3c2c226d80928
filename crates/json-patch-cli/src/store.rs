//! File-system document store.
//!
//! Documents are files addressed by the path the user gave (relative to the
//! working directory). Patched documents are written to the output directory
//! at the same relative path, so the default output directory `.` rewrites
//! files in place.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use jsonpatch::{decode_document, encode, DocumentStore, PatchError, StoreError, Value};
use thiserror::Error;
use tracing::debug;

use crate::yaml::{self, YamlError};

#[derive(Debug, Error)]
pub enum FileError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] PatchError),
    #[error(transparent)]
    Yaml(#[from] YamlError),
    #[error(transparent)]
    Encode(#[from] serde_json::Error),
}

/// `.yaml` and `.yml` files are YAML; everything else is JSON.
pub fn is_yaml(path: &Path) -> bool {
    matches!(path.extension().and_then(|ext| ext.to_str()), Some("yaml" | "yml"))
}

/// Decode file contents according to the file's extension.
pub fn decode_file(path: &Path, bytes: &[u8]) -> Result<Value, FileError> {
    if is_yaml(path) {
        Ok(yaml::from_slice(bytes)?)
    } else {
        Ok(decode_document(bytes)?)
    }
}

/// Encode a document for writing to `path`: YAML, or JSON indented by two
/// spaces with a trailing newline.
pub fn encode_file(path: &Path, doc: &Value) -> Result<Vec<u8>, FileError> {
    if is_yaml(path) {
        return Ok(yaml::to_string(doc)?.into_bytes());
    }
    let mut out = encode(doc, 2)?;
    out.push(b'\n');
    Ok(out)
}

/// A document path as given on the command line or matched by a glob.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath(PathBuf);

impl DocumentPath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

pub struct FsStore {
    root: PathBuf,
    outdir: PathBuf,
}

impl FsStore {
    /// Relative document paths and a relative `outdir` resolve against
    /// `root`.
    pub fn new(root: impl Into<PathBuf>, outdir: impl AsRef<Path>) -> Self {
        let root = root.into();
        let outdir = root.join(outdir);
        Self { root, outdir }
    }

    /// Where the patched copy of `id` is written.
    pub fn output_path(&self, id: &DocumentPath) -> PathBuf {
        // Root and drive prefixes are dropped so every output lands under
        // the output directory.
        let relative: PathBuf = id
            .0
            .components()
            .filter(|c| !matches!(c, Component::Prefix(_) | Component::RootDir))
            .collect();
        self.outdir.join(relative)
    }

    fn pattern(&self, selector: &str) -> Result<String, StoreError> {
        if Path::new(selector).is_absolute() {
            return Ok(selector.to_string());
        }
        let root = self.root.to_str().ok_or_else(|| {
            format!("working directory {} is not valid UTF-8", self.root.display())
        })?;
        Ok(format!("{}/{selector}", glob::Pattern::escape(root).trim_end_matches('/')))
    }
}

impl DocumentStore for FsStore {
    type Id = DocumentPath;

    /// Expand a glob pattern into the matching files, in lexical order.
    fn select(&self, selector: &str) -> Result<Vec<DocumentPath>, StoreError> {
        let mut ids = Vec::new();
        for entry in glob::glob(&self.pattern(selector)?)? {
            let path = entry?;
            if !path.is_file() {
                continue;
            }
            let id = path.strip_prefix(&self.root).map(Path::to_path_buf).unwrap_or(path);
            ids.push(DocumentPath(id));
        }
        Ok(ids)
    }

    fn load(&self, id: &DocumentPath) -> Result<Value, StoreError> {
        let bytes = fs::read(self.root.join(&id.0))?;
        Ok(decode_file(&id.0, &bytes)?)
    }

    fn store(&mut self, id: &DocumentPath, doc: &Value) -> Result<(), StoreError> {
        let out = self.output_path(id);
        let bytes = encode_file(&id.0, doc)?;
        if let Some(dir) = out.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&out, bytes)?;
        debug!(document = %id, output = %out.display(), "wrote document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn yaml_by_extension() {
        assert!(is_yaml(Path::new("a/b.yaml")));
        assert!(is_yaml(Path::new("b.yml")));
        assert!(!is_yaml(Path::new("b.json")));
        assert!(!is_yaml(Path::new("yaml")));
    }

    #[test]
    fn json_output_is_indented() {
        let bytes = encode_file(Path::new("x.json"), &json!({"a": [1]})).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "{\n  \"a\": [\n    1\n  ]\n}\n");
    }

    #[test]
    fn output_mirrors_input_path() {
        let store = FsStore::new("/work", "out");
        assert_eq!(
            store.output_path(&DocumentPath::new("sub/doc.json")),
            PathBuf::from("/work/out/sub/doc.json")
        );
        assert_eq!(
            store.output_path(&DocumentPath::new("/abs/doc.json")),
            PathBuf::from("/work/out/abs/doc.json")
        );
        let in_place = FsStore::new("/work", ".");
        assert_eq!(
            in_place.output_path(&DocumentPath::new("doc.json")),
            PathBuf::from("/work/./doc.json")
        );
    }

    #[test]
    fn select_matches_files_relative_to_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("sub")).unwrap();
        fs::create_dir(root.join("dir.json")).unwrap();
        for name in ["b.json", "a.json", "c.yaml", "sub/d.json"] {
            fs::write(root.join(name), "{}").unwrap();
        }

        let store = FsStore::new(root, ".");
        let ids = store.select("*.json").unwrap();
        assert_eq!(ids, vec![DocumentPath::new("a.json"), DocumentPath::new("b.json")]);
        assert_eq!(store.select("sub/*").unwrap(), vec![DocumentPath::new("sub/d.json")]);
        assert!(store.select("nothing*").unwrap().is_empty());
        assert!(store.select("[").is_err());
    }

    #[test]
    fn load_and_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("doc.yml"), "a: 1\n").unwrap();

        let mut store = FsStore::new(root, "out");
        let id = DocumentPath::new("doc.yml");
        let doc = store.load(&id).unwrap();
        assert_eq!(doc, json!({"a": 1}));
        store.store(&id, &json!({"a": 2})).unwrap();
        assert_eq!(fs::read_to_string(root.join("out/doc.yml")).unwrap(), "a: 2\n");
        assert!(store.load(&DocumentPath::new("missing.json")).is_err());
    }
}
