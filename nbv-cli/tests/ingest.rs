//! Batch ingestion scenarios against a scratch store

use nbv_cli::ingest::{ingest_files, IngestError};
use nbv_parser::ParseError;
use nbv_store::NotebookStore;
use std::path::PathBuf;

const FIFTEEN_MIB: u64 = 15 * 1024 * 1024;

fn valid_notebook_json() -> String {
    serde_json::json!({
        "cells": [
            {"cell_type": "markdown", "metadata": {}, "source": "# Hello"}
        ],
        "metadata": {},
        "nbformat": 4,
        "nbformat_minor": 5
    })
    .to_string()
}

fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn scratch_store(dir: &tempfile::TempDir) -> NotebookStore {
    NotebookStore::open(dir.path().join("notebooks.redb")).unwrap()
}

#[tokio::test]
async fn malformed_file_does_not_stop_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let store = scratch_store(&dir);

    let files = vec![
        write_file(&dir, "one.ipynb", &valid_notebook_json()),
        write_file(&dir, "two.ipynb", "{not json at all"),
        write_file(&dir, "three.ipynb", &valid_notebook_json()),
    ];

    let outcome = ingest_files(&store, &files, FIFTEEN_MIB).await;

    assert_eq!(outcome.stored.len(), 2);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].name, "two.ipynb");
    assert!(matches!(
        outcome.failures[0].error,
        IngestError::Parse(ParseError::Json(_))
    ));

    // Both successful files actually landed in the store.
    let stored = store.get_all().await.unwrap();
    let mut names: Vec<&str> = stored.iter().map(|r| r.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, ["one.ipynb", "three.ipynb"]);
}

#[tokio::test]
async fn wrong_extension_is_rejected_per_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = scratch_store(&dir);

    let files = vec![write_file(&dir, "notes.txt", &valid_notebook_json())];
    let outcome = ingest_files(&store, &files, FIFTEEN_MIB).await;

    assert!(outcome.fully_failed());
    assert_eq!(outcome.failures[0].error, IngestError::UnsupportedName);
    assert!(store.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn oversized_file_fails_validation() {
    let dir = tempfile::tempdir().unwrap();
    let store = scratch_store(&dir);

    let files = vec![write_file(&dir, "big.ipynb", &valid_notebook_json())];
    let outcome = ingest_files(&store, &files, 8).await;

    assert_eq!(outcome.stored.len(), 0);
    assert!(matches!(
        outcome.failures[0].error,
        IngestError::Parse(ParseError::TooLarge { limit: 8, .. })
    ));
}

#[tokio::test]
async fn document_without_cells_fails_validation() {
    let dir = tempfile::tempdir().unwrap();
    let store = scratch_store(&dir);

    let files = vec![write_file(&dir, "empty.ipynb", "{\"metadata\": {}}")];
    let outcome = ingest_files(&store, &files, FIFTEEN_MIB).await;

    assert!(matches!(
        outcome.failures[0].error,
        IngestError::Parse(ParseError::MissingCells)
    ));
}

#[tokio::test]
async fn stored_records_carry_name_and_size() {
    let dir = tempfile::tempdir().unwrap();
    let store = scratch_store(&dir);

    let json = valid_notebook_json();
    let files = vec![write_file(&dir, "sized.ipynb", &json)];
    let outcome = ingest_files(&store, &files, FIFTEEN_MIB).await;

    assert_eq!(outcome.stored.len(), 1);
    let record = &outcome.stored[0];
    assert_eq!(record.name, "sized.ipynb");
    assert_eq!(record.size_bytes, json.len() as u64);
    assert!(!record.id.is_empty());
}
