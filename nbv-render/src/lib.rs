//! Rendering pipeline for notebook documents
//!
//! Turns parsed notebook cells into trusted HTML fragments, entirely
//! offline and without executing anything. Two narrative pathways exist
//! side by side:
//!
//! - the shielding translator ([`shield`]), used for rich text previews:
//!   a hand-rolled pass pipeline that extracts fenced code and math spans
//!   before touching any other syntax, renders math through the engine,
//!   and reinserts the shielded pieces at the end;
//! - the sanitizing markdown renderer ([`markdown`]), used for notebook
//!   composition: math shielding around a general-purpose markdown engine
//!   (comrak), with the result forced through a strict allow-list
//!   sanitizer.
//!
//! Output payloads ([`output`]) and whole documents ([`notebook`]) build
//! on these; [`page`] wraps a composed document into a standalone HTML
//! page. Math goes through the engine abstraction in [`engine`], which
//! starts unavailable and upgrades renders once the backend is installed.

pub mod engine;
pub mod error;
pub mod escape;
pub mod markdown;
pub mod notebook;
pub mod output;
pub mod page;
pub mod sanitize;
pub mod shield;
pub mod unicode;

pub use engine::{Availability, EngineSlot, KatexEngine, MathEngine};
pub use error::MathError;
pub use markdown::render_markdown_cell;
pub use notebook::{render_notebook, render_notebook_titled};
pub use output::render_output;
pub use page::wrap_page;
pub use sanitize::{sanitize, Policy};
pub use shield::{render_preview, slugify};
pub use unicode::translate_unicode_math;
