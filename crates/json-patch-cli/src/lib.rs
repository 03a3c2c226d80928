//! `jsonpatch` applies RFC 6902 JSON Patches to JSON or YAML documents.
//!
//! With at least one document the patch file is an RFC 6902 patch applied to
//! each document. Without documents the patch file is a batch file whose
//! entries pair a glob with a patch.

pub mod store;
pub mod yaml;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use jsonpatch::{apply_batch, apply_to_documents, decode_batch, from_json_patch, Value};
use tracing::info;

use crate::store::{decode_file, DocumentPath, FsStore};

const BATCH_HELP: &str = r#"If no documents are provided, the patch file is parsed as a
batch patch file:

[
  {
    "glob": "*.json",
    "jsonPatch": [
      { "op": "add", "path": "/a", "value": 1 }
    ]
  },
  {
    "glob": "*.yaml",
    "jsonPatch": [
      { "op": "test", "path": "/b", "value": 1 },
      { "op": "remove", "path": "/b" }
    ]
  }
]

Files ending in .yaml or .yml are read and written as YAML."#;

#[derive(Debug, Parser)]
#[command(name = "jsonpatch", version)]
#[command(
    about = "Apply RFC 6902 JSON Patches to JSON or YAML documents",
    after_long_help = BATCH_HELP
)]
pub struct Cli {
    /// The directory where patched documents are emitted
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub outdir: PathBuf,

    /// RFC 6902 patch file, or a batch file when no documents are given
    #[arg(value_name = "PATCH")]
    pub patch: PathBuf,

    /// Documents to patch
    #[arg(value_name = "DOCUMENTS")]
    pub documents: Vec<PathBuf>,
}

/// Run one invocation with relative paths resolved against `cwd`.
///
/// Returns the documents that were written. Nothing is written unless every
/// document patches cleanly.
pub fn run(cli: &Cli, cwd: &Path) -> anyhow::Result<Vec<DocumentPath>> {
    let raw = read_file(cwd, &cli.patch)?;
    let mut store = FsStore::new(cwd, &cli.outdir);

    let written = if cli.documents.is_empty() {
        let entries = decode_batch(&raw)
            .with_context(|| format!("invalid batch file {}", cli.patch.display()))?;
        info!(patch = %cli.patch.display(), entries = entries.len(), "applying batch");
        apply_batch(&mut store, &entries)?
    } else {
        let patch = from_json_patch(&raw)
            .with_context(|| format!("invalid JSON Patch file {}", cli.patch.display()))?;
        let documents: Vec<DocumentPath> = cli.documents.iter().map(DocumentPath::new).collect();
        info!(patch = %cli.patch.display(), documents = documents.len(), "applying patch");
        apply_to_documents(&mut store, &patch, &documents)?
    };
    Ok(written)
}

fn read_file(cwd: &Path, path: &Path) -> anyhow::Result<Value> {
    let bytes =
        fs::read(cwd.join(path)).with_context(|| format!("cannot read {}", path.display()))?;
    decode_file(path, &bytes).with_context(|| format!("cannot parse {}", path.display()))
}
