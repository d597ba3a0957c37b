//! Shared analysis types: error taxonomy, progress notices, phase machine.

use serde::Serialize;

use crate::models::ModelSlot;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A named model slot failed to initialize after exhausting its fallback
/// path. Recoverable: a later `ensure_loaded` on the same slot retries from
/// scratch. Cloneable because one failed load fans out to every waiter.
#[derive(Debug, Clone, thiserror::Error)]
#[error("model slot {slot} failed to load: {reason}")]
pub struct LoadError {
    pub slot: ModelSlot,
    pub reason: String,
}

impl LoadError {
    pub fn new(slot: ModelSlot, reason: impl Into<String>) -> Self {
        Self {
            slot,
            reason: reason.into(),
        }
    }
}

/// Hard failure: even the backup generator could not produce a report.
/// The only error `analyze()` ever surfaces.
#[derive(Debug, thiserror::Error)]
#[error("analysis failed on both the model path and the backup generator: {reason}")]
pub struct AnalysisFailure {
    pub reason: String,
}

impl AnalysisFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Notices
// ---------------------------------------------------------------------------

/// Toast-style progress signals for the UI. Emitted for the two advanced
/// slots and on fallback engagement; callers outside the core render them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisNotice {
    ModelLoadStarted { slot: ModelSlot },
    ModelLoadSucceeded { slot: ModelSlot },
    ModelLoadFailed { slot: ModelSlot },
    /// Soft degradation: the report will come from the backup generator.
    FallbackEngaged,
}

// ---------------------------------------------------------------------------
// Phase machine
// ---------------------------------------------------------------------------

/// Where the pipeline currently is. `Complete`, `Fallback`, and `Error` are
/// terminal for one `analyze()` call; the next call starts over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisPhase {
    Idle,
    LoadingModels,
    Running,
    Complete,
    Fallback,
    Error,
}

impl AnalysisPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::LoadingModels => "loading_models",
            Self::Running => "running",
            Self::Complete => "complete",
            Self::Fallback => "fallback",
            Self::Error => "error",
        }
    }
}
