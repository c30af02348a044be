//! Parse, validate and re-export notebook documents
//!
//! Parsing is two-staged so failures are distinguishable: bytes that are
//! not JSON fail as [`ParseError::Json`], JSON without a top-level `cells`
//! array fails the shape check as [`ParseError::MissingCells`]. No deeper
//! schema validation happens here.

use crate::error::ParseError;
use crate::model::NotebookDocument;
use serde_json::Value;

/// Parse notebook bytes into a document.
pub fn parse_notebook(bytes: &[u8]) -> Result<NotebookDocument, ParseError> {
    let value: Value = serde_json::from_slice(bytes)?;
    match value.get("cells") {
        Some(Value::Array(_)) => {}
        _ => return Err(ParseError::MissingCells),
    }
    let document = serde_json::from_value(value)?;
    Ok(document)
}

/// Parse notebook bytes, rejecting input above `limit` bytes before
/// touching the JSON layer. The limit comes from configuration.
pub fn parse_notebook_with_limit(
    bytes: &[u8],
    limit: u64,
) -> Result<NotebookDocument, ParseError> {
    let size = bytes.len() as u64;
    if size > limit {
        return Err(ParseError::TooLarge { size, limit });
    }
    parse_notebook(bytes)
}

/// Re-export a document as pretty-printed JSON, structurally reproducing
/// the original input including unrecognized keys.
pub fn export_notebook(document: &NotebookDocument) -> Result<String, ParseError> {
    Ok(serde_json::to_string_pretty(document)?)
}
