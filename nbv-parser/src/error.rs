//! Error type for notebook parsing and validation

use std::fmt;

/// Error that can occur while turning raw bytes into a notebook document
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The bytes are not valid JSON
    Json(String),
    /// The top level has no `cells` array
    MissingCells,
    /// The input exceeds the configured size ceiling
    TooLarge { size: u64, limit: u64 },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Json(msg) => write!(f, "not a valid notebook: {msg}"),
            ParseError::MissingCells => {
                write!(f, "not a valid notebook: top level has no 'cells' array")
            }
            ParseError::TooLarge { size, limit } => {
                write!(f, "notebook is {size} bytes, exceeding the {limit} byte limit")
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        ParseError::Json(err.to_string())
    }
}
