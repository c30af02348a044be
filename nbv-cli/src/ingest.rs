//! Batch ingestion of notebook files into the store
//!
//! Files are processed strictly one at a time: a file's full
//! read-validate-store cycle completes before the next begins, so a
//! failure on one file never prevents later files from being attempted.
//! Per-file failures are collected into the outcome instead of aborting
//! the batch; partial success is a normal, reportable result.

use nbv_parser::{parse_notebook_with_limit, ParseError};
use nbv_store::{NotebookStore, StoreError, StoredNotebookRecord};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Why one file was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestError {
    /// Not a notebook file by extension
    UnsupportedName,
    /// The file could not be read from disk
    Io(String),
    /// The content failed parsing or validation
    Parse(ParseError),
    /// The backend refused the record
    Store(StoreError),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::UnsupportedName => write!(f, "only .ipynb files are supported"),
            IngestError::Io(msg) => write!(f, "could not read file: {msg}"),
            IngestError::Parse(err) => write!(f, "{err}"),
            IngestError::Store(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for IngestError {}

impl From<ParseError> for IngestError {
    fn from(err: ParseError) -> Self {
        IngestError::Parse(err)
    }
}

impl From<StoreError> for IngestError {
    fn from(err: StoreError) -> Self {
        IngestError::Store(err)
    }
}

/// One rejected file of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestFailure {
    pub name: String,
    pub error: IngestError,
}

/// Result of a whole batch: what landed in the store and what was
/// rejected, in input order.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub stored: Vec<StoredNotebookRecord>,
    pub failures: Vec<IngestFailure>,
}

impl BatchOutcome {
    pub fn fully_failed(&self) -> bool {
        self.stored.is_empty() && !self.failures.is_empty()
    }
}

/// Ingest `paths` sequentially into `store`, enforcing the per-file size
/// ceiling from configuration.
pub async fn ingest_files(
    store: &NotebookStore,
    paths: &[PathBuf],
    max_file_bytes: u64,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for path in paths {
        let name = display_name(path);
        match ingest_one(store, path, &name, max_file_bytes).await {
            Ok(record) => {
                info!(name = %record.name, id = %record.id, "notebook ingested");
                outcome.stored.push(record);
            }
            Err(error) => {
                warn!(%name, %error, "notebook rejected");
                outcome.failures.push(IngestFailure { name, error });
            }
        }
    }

    outcome
}

async fn ingest_one(
    store: &NotebookStore,
    path: &Path,
    name: &str,
    max_file_bytes: u64,
) -> Result<StoredNotebookRecord, IngestError> {
    if !name.ends_with(".ipynb") {
        return Err(IngestError::UnsupportedName);
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| IngestError::Io(err.to_string()))?;
    let document = parse_notebook_with_limit(&bytes, max_file_bytes)?;

    let record = StoredNotebookRecord::new(name, document, bytes.len() as u64);
    store.save(&record).await?;
    Ok(record)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
