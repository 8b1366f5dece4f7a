//! Error classification for the positioning core
//!
//! Every failure here is recoverable: the caller keeps its last known
//! position and decides whether to retry with more measurements or report a
//! geometry problem. Registry persistence problems are logged at the point
//! of failure and never surface through this enum, since in-memory state
//! remains authoritative.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reasons a position estimate could not be produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PositioningError {
    /// Fewer measurements resolved against the landmark registry than the
    /// solver needs. Retryable with more measurements.
    InsufficientLandmarks { resolved: usize, required: usize },

    /// The iterative solve failed to converge within its iteration budget,
    /// typically from collinear or coincident landmarks or inconsistent
    /// distances. Indicates a geometry problem, not a transient fault.
    SolverDivergence { iterations: usize, residual_cost: f64 },

    /// A supplied distance was negative or non-finite.
    InvalidDistance { name: String, distance: f64 },

    /// A supplied confidence was outside (0, 1] or non-finite.
    InvalidConfidence { name: String, confidence: f64 },
}

impl fmt::Display for PositioningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositioningError::InsufficientLandmarks { resolved, required } => {
                write!(
                    f,
                    "Insufficient landmarks: {} resolved, {} required",
                    resolved, required
                )
            }
            PositioningError::SolverDivergence {
                iterations,
                residual_cost,
            } => {
                write!(
                    f,
                    "Solver failed to converge after {} iterations (residual cost {:.6})",
                    iterations, residual_cost
                )
            }
            PositioningError::InvalidDistance { name, distance } => {
                write!(f, "Invalid distance for landmark {}: {}", name, distance)
            }
            PositioningError::InvalidConfidence { name, confidence } => {
                write!(f, "Invalid confidence for landmark {}: {}", name, confidence)
            }
        }
    }
}

impl std::error::Error for PositioningError {}
