//! Error taxonomy for the fleet engine.
//!
//! `FleetError` is what callers see. `FitError` never leaves the analytics
//! modules: predictor and detector convert it into their fallback values.

use thiserror::Error;

/// Fatal engine errors surfaced to the caller of a tick.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FleetError {
    /// History sequences of a machine disagree in length (state corruption)
    #[error("invariant violated for {machine}: {detail}")]
    InvariantViolation { machine: String, detail: String },

    /// The fleet layout cannot be turned into a fleet
    #[error("fleet initialization failed: {0}")]
    Initialization(String),

    /// No machine with this id exists in the fleet
    #[error("unknown machine: {0}")]
    UnknownMachine(String),
}

/// Recoverable failure while fitting a window model.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum FitError {
    #[error("window too small for a stable fit ({samples} samples)")]
    DegenerateWindow { samples: usize },

    #[error("window has zero variance")]
    ZeroVariance,
}
