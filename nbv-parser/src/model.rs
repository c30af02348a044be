//! Typed model of a notebook document
//!
//! The model mirrors the on-disk JSON closely enough that serializing a
//! parsed document reproduces the original structurally: unknown keys are
//! captured in flattened maps instead of being dropped, and source text
//! keeps whichever of its two wire shapes (single string or fragment list)
//! it arrived in.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Source text as it appears on the wire: either one string or an ordered
/// list of fragments that concatenate (no separators) into the full text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceText {
    Joined(String),
    Fragments(Vec<String>),
}

impl SourceText {
    /// Normalize to a single string. Joining is idempotent: a `Joined`
    /// value returns its string unchanged.
    pub fn join(&self) -> String {
        match self {
            SourceText::Joined(text) => text.clone(),
            SourceText::Fragments(parts) => parts.concat(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SourceText::Joined(text) => text.is_empty(),
            SourceText::Fragments(parts) => parts.iter().all(|p| p.is_empty()),
        }
    }
}

impl Default for SourceText {
    fn default() -> Self {
        SourceText::Joined(String::new())
    }
}

impl From<&str> for SourceText {
    fn from(text: &str) -> Self {
        SourceText::Joined(text.to_string())
    }
}

/// One cell of a notebook, tagged by `cell_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cell_type", rename_all = "snake_case")]
pub enum Cell {
    Code {
        #[serde(default)]
        source: SourceText,
        #[serde(default)]
        outputs: Vec<Output>,
        #[serde(default)]
        execution_count: Option<i64>,
        #[serde(default)]
        metadata: serde_json::Map<String, Value>,
        #[serde(flatten)]
        extra: serde_json::Map<String, Value>,
    },
    Markdown {
        #[serde(default)]
        source: SourceText,
        #[serde(default)]
        metadata: serde_json::Map<String, Value>,
        #[serde(flatten)]
        extra: serde_json::Map<String, Value>,
    },
    Raw {
        #[serde(default)]
        source: SourceText,
        #[serde(default)]
        metadata: serde_json::Map<String, Value>,
        #[serde(flatten)]
        extra: serde_json::Map<String, Value>,
    },
}

impl Cell {
    pub fn source(&self) -> &SourceText {
        match self {
            Cell::Code { source, .. } | Cell::Markdown { source, .. } | Cell::Raw { source, .. } => {
                source
            }
        }
    }
}

/// Stream channel of a `stream` output. stderr renders with error styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamName {
    Stdout,
    Stderr,
}

/// A recorded output attached to a code cell.
///
/// Outputs with an `output_type` this crate does not recognize are kept as
/// their raw JSON value so re-export stays lossless; the renderer shows
/// them as nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Output {
    Known(KnownOutput),
    Other(Value),
}

impl Output {
    pub fn as_known(&self) -> Option<&KnownOutput> {
        match self {
            Output::Known(known) => Some(known),
            Output::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "output_type", rename_all = "snake_case")]
pub enum KnownOutput {
    Stream {
        name: StreamName,
        #[serde(default)]
        text: SourceText,
        #[serde(flatten)]
        extra: serde_json::Map<String, Value>,
    },
    ExecuteResult {
        #[serde(default)]
        execution_count: Option<i64>,
        #[serde(default)]
        data: MimeBundle,
        #[serde(flatten)]
        extra: serde_json::Map<String, Value>,
    },
    DisplayData {
        #[serde(default)]
        data: MimeBundle,
        #[serde(flatten)]
        extra: serde_json::Map<String, Value>,
    },
    Error {
        ename: String,
        evalue: String,
        #[serde(default)]
        traceback: Vec<String>,
        #[serde(flatten)]
        extra: serde_json::Map<String, Value>,
    },
}

/// Alternative representations of one output, keyed by MIME type.
///
/// The raw mapping is preserved verbatim; [`MimeBundle::richest`] derives
/// the typed representation the renderer dispatches on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MimeBundle(pub BTreeMap<String, Value>);

/// The representation selected from a [`MimeBundle`], highest priority
/// first: PNG or JPEG image, then HTML, then plain text. `Other` carries
/// the keys nothing matched (possibly none) and renders as empty.
#[derive(Debug, Clone, PartialEq)]
pub enum RichContent {
    ImagePng(String),
    ImageJpeg(String),
    Html(String),
    Plain(String),
    Other(Vec<String>),
}

impl MimeBundle {
    /// Select the richest representation in priority order. First matching
    /// key wins; the rest are ignored. Image payloads have embedded
    /// newlines stripped so they can be used in a data URI directly.
    pub fn richest(&self) -> RichContent {
        if let Some(payload) = self.text_for("image/png") {
            return RichContent::ImagePng(payload.replace('\n', ""));
        }
        if let Some(payload) = self.text_for("image/jpeg") {
            return RichContent::ImageJpeg(payload.replace('\n', ""));
        }
        if let Some(markup) = self.text_for("text/html") {
            return RichContent::Html(markup);
        }
        if let Some(text) = self.text_for("text/plain") {
            return RichContent::Plain(text);
        }
        RichContent::Other(self.0.keys().cloned().collect())
    }

    /// Read a key's value as text, joining fragment lists. Keys whose
    /// value is neither shape are treated as absent.
    fn text_for(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(text) => Some(text.clone()),
            Value::Array(parts) => Some(
                parts
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .concat(),
            ),
            _ => None,
        }
    }
}

/// Kernel description from the notebook metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KernelSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Document-level metadata. Only the kernel and language blocks are typed;
/// everything else is preserved opaquely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernelspec: Option<KernelSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_info: Option<LanguageInfo>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A parsed notebook: an ordered list of cells plus metadata and the
/// informational format version pair. Never mutated after parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotebookDocument {
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub metadata: DocumentMetadata,
    #[serde(default)]
    pub nbformat: u32,
    #[serde(default)]
    pub nbformat_minor: u32,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl NotebookDocument {
    /// Kernel display name for the viewer header, when present.
    pub fn kernel_display_name(&self) -> Option<&str> {
        self.metadata
            .kernelspec
            .as_ref()
            .and_then(|spec| spec.display_name.as_deref())
    }
}
