//! Persistence wrapper around a parsed notebook

use chrono::{DateTime, Utc};
use nbv_parser::NotebookDocument;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored notebook: the parsed document plus the bookkeeping the
/// collection view needs. The id is assigned once at construction and
/// never changes; the document payload is kept verbatim so re-export
/// reproduces the uploaded file structurally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredNotebookRecord {
    pub id: String,
    /// Original filename; display only, not required unique.
    pub name: String,
    pub document: NotebookDocument,
    pub created_at: DateTime<Utc>,
    /// Byte length of the original serialized source; display only.
    pub size_bytes: u64,
}

impl StoredNotebookRecord {
    pub fn new(name: impl Into<String>, document: NotebookDocument, size_bytes: u64) -> Self {
        StoredNotebookRecord {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            document,
            created_at: Utc::now(),
            size_bytes,
        }
    }
}
