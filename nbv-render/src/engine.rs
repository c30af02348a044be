//! Math-typesetting engine abstraction
//!
//! The engine is an injected capability rather than an ambient global. It
//! has two observable states: `Unavailable` (nothing installed yet, or
//! the backend failed to initialize) and `Available`. Rendering degrades
//! gracefully while unavailable; callers that want to upgrade their
//! output register a ready callback, which fires exactly once on the
//! unavailable → available transition. Everything here is single-threaded
//! interior mutability, matching the cooperative execution model of the
//! rest of the pipeline.

use crate::error::MathError;
use std::cell::RefCell;

/// A math-typesetting backend: `(expression, displayMode) -> markup`.
/// Render failures are per-expression and recoverable.
pub trait MathEngine {
    fn render(&self, expression: &str, display_mode: bool) -> Result<String, MathError>;
}

/// Observable engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Unavailable,
    Available,
}

/// Holder for an optionally-installed [`MathEngine`].
///
/// Starts empty; [`EngineSlot::install`] performs the one-shot transition
/// to `Available` and fires every registered ready callback. Callbacks
/// registered after the transition fire immediately.
#[derive(Default)]
pub struct EngineSlot {
    engine: RefCell<Option<Box<dyn MathEngine>>>,
    on_ready: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl EngineSlot {
    /// An empty slot: math renders degrade until an engine is installed.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A slot with the engine already installed.
    pub fn with_engine(engine: Box<dyn MathEngine>) -> Self {
        let slot = Self::empty();
        slot.install(engine);
        slot
    }

    pub fn availability(&self) -> Availability {
        if self.engine.borrow().is_some() {
            Availability::Available
        } else {
            Availability::Unavailable
        }
    }

    /// Install the engine. The first install transitions the slot to
    /// `Available` and drains the ready callbacks; a later install only
    /// swaps the backend.
    pub fn install(&self, engine: Box<dyn MathEngine>) {
        let was_available = self.engine.borrow().is_some();
        *self.engine.borrow_mut() = Some(engine);
        if !was_available {
            tracing::debug!("math engine installed, upgrading renders");
            let callbacks = std::mem::take(&mut *self.on_ready.borrow_mut());
            for callback in callbacks {
                callback();
            }
        }
    }

    /// Register a callback for the unavailable → available transition.
    /// Fires immediately when the slot is already available.
    pub fn on_ready(&self, callback: Box<dyn FnOnce()>) {
        if self.engine.borrow().is_some() {
            callback();
        } else {
            self.on_ready.borrow_mut().push(callback);
        }
    }

    /// Render through the installed engine; `None` while unavailable.
    pub fn render(&self, expression: &str, display_mode: bool) -> Option<Result<String, MathError>> {
        self.engine
            .borrow()
            .as_ref()
            .map(|engine| engine.render(expression, display_mode))
    }
}

/// KaTeX-backed engine. Construction probes the embedded JS runtime once
/// so an unavailable backend surfaces here instead of on every render.
pub struct KatexEngine;

impl KatexEngine {
    pub fn try_new() -> Result<Self, MathError> {
        katex::render("x").map_err(|err| MathError::Unavailable(err.to_string()))?;
        Ok(KatexEngine)
    }
}

impl MathEngine for KatexEngine {
    fn render(&self, expression: &str, display_mode: bool) -> Result<String, MathError> {
        let opts = katex::Opts::builder()
            .display_mode(display_mode)
            .throw_on_error(false)
            .build()
            .map_err(|err| MathError::Render(err.to_string()))?;
        katex::render_with_opts(expression, opts)
            .map_err(|err| MathError::Render(err.to_string()))
    }
}
