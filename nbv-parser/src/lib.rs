//! Parser library for notebook documents
//!
//! A notebook is a JSON document made of an ordered list of cells (code,
//! markdown, raw), each carrying its source text and, for code cells, the
//! outputs recorded by a past execution. This crate owns the data model and
//! the parse/validate/export entry points; it never executes anything and it
//! preserves unrecognized structure so a parsed document can be re-exported
//! without loss.
//!
//! Pipeline: raw bytes → JSON value → shape check → typed `NotebookDocument`.

pub mod error;
pub mod model;
pub mod parse;

pub use error::ParseError;
pub use model::{
    Cell, DocumentMetadata, KnownOutput, MimeBundle, NotebookDocument, Output, RichContent,
    SourceText, StreamName,
};
pub use parse::{export_notebook, parse_notebook, parse_notebook_with_limit};
