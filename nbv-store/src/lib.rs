//! Durable keyed storage of uploaded notebook documents
//!
//! A thin CRUD-lite layer over an embedded transactional database (redb),
//! scoped to one on-disk file. Records are serialized as JSON so the
//! store is tolerant of unknown fields on read. Every operation commits
//! as one atomic transaction on the blocking pool: partial writes are
//! never observable, and concurrent calls only contend at the backend's
//! own transaction boundary. There is no update-in-place: records are
//! written once and removed by explicit deletion.

pub mod error;
pub mod record;
pub mod store;

pub use error::StoreError;
pub use record::StoredNotebookRecord;
pub use store::NotebookStore;
