//! Library side of the nbv binary: the pieces worth testing on their own
//! (batch ingestion) live here; argument handling stays in `main.rs`.

pub mod ingest;
