//! The notebook store over an embedded database

use crate::error::StoreError;
use crate::record::StoredNotebookRecord;
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;
use tokio::task;
use tracing::debug;

const NOTEBOOKS: TableDefinition<&str, &[u8]> = TableDefinition::new("notebooks");

/// Handle to the on-disk notebook collection. Cloneable and cheap to
/// share; all methods run their transaction on the blocking pool.
#[derive(Clone)]
pub struct NotebookStore {
    db: Arc<Database>,
}

impl NotebookStore {
    /// Open (or create) the store at `path`. The table is created up
    /// front so reads on a fresh store see an empty collection rather
    /// than a missing table.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Database::create(path).map_err(StoreError::backend)?;
        let txn = db.begin_write().map_err(StoreError::backend)?;
        txn.open_table(NOTEBOOKS).map_err(StoreError::backend)?;
        txn.commit().map_err(StoreError::backend)?;
        Ok(NotebookStore { db: Arc::new(db) })
    }

    /// Persist a new record in one atomic transaction. The record's id
    /// and timestamp were assigned at construction; nothing is added
    /// here.
    pub async fn save(&self, record: &StoredNotebookRecord) -> Result<(), StoreError> {
        let payload = serde_json::to_vec(record)?;
        let id = record.id.clone();
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || {
            let txn = db.begin_write().map_err(StoreError::backend)?;
            {
                let mut table = txn.open_table(NOTEBOOKS).map_err(StoreError::backend)?;
                table
                    .insert(id.as_str(), payload.as_slice())
                    .map_err(StoreError::backend)?;
            }
            txn.commit().map_err(StoreError::backend)?;
            debug!(%id, "notebook record saved");
            Ok(())
        })
        .await
        .map_err(StoreError::backend)?
    }

    /// Fetch every stored record, in no guaranteed order. An empty store
    /// yields an empty vec.
    pub async fn get_all(&self) -> Result<Vec<StoredNotebookRecord>, StoreError> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || {
            let txn = db.begin_read().map_err(StoreError::backend)?;
            let table = txn.open_table(NOTEBOOKS).map_err(StoreError::backend)?;
            let mut records = Vec::new();
            for entry in table.iter().map_err(StoreError::backend)? {
                let (_, value) = entry.map_err(StoreError::backend)?;
                let record: StoredNotebookRecord = serde_json::from_slice(value.value())?;
                records.push(record);
            }
            Ok(records)
        })
        .await
        .map_err(StoreError::backend)?
    }

    /// Fetch one record by id. An absent id is `None`, not an error.
    pub async fn get(&self, id: &str) -> Result<Option<StoredNotebookRecord>, StoreError> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();

        task::spawn_blocking(move || {
            let txn = db.begin_read().map_err(StoreError::backend)?;
            let table = txn.open_table(NOTEBOOKS).map_err(StoreError::backend)?;
            match table.get(id.as_str()).map_err(StoreError::backend)? {
                Some(value) => {
                    let record: StoredNotebookRecord = serde_json::from_slice(value.value())?;
                    Ok(Some(record))
                }
                None => Ok(None),
            }
        })
        .await
        .map_err(StoreError::backend)?
    }

    /// Delete the record with `id`. Deleting an absent id commits as a
    /// no-op; a failed transaction leaves the record unchanged.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();

        task::spawn_blocking(move || {
            let txn = db.begin_write().map_err(StoreError::backend)?;
            let removed = {
                let mut table = txn.open_table(NOTEBOOKS).map_err(StoreError::backend)?;
                let existed = table.remove(id.as_str()).map_err(StoreError::backend)?.is_some();
                existed
            };
            txn.commit().map_err(StoreError::backend)?;
            debug!(%id, removed, "notebook record delete committed");
            Ok(())
        })
        .await
        .map_err(StoreError::backend)?
    }
}
