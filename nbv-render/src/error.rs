//! Error type for math rendering

use std::fmt;

/// Error from the math-typesetting engine. Always recovered locally:
/// render entry points fall back to escaped literal text for the failing
/// expression instead of propagating this out of the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum MathError {
    /// The engine's runtime could not be initialized
    Unavailable(String),
    /// The engine rejected one expression
    Render(String),
}

impl fmt::Display for MathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MathError::Unavailable(msg) => write!(f, "math engine unavailable: {msg}"),
            MathError::Render(msg) => write!(f, "math rendering failed: {msg}"),
        }
    }
}

impl std::error::Error for MathError {}
