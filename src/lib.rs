//! Campus Positioning Core
//!
//! Estimates a mobile observer's position from noisy range measurements to
//! named landmarks via robust multilateration, and smooths successive
//! estimates over a bounded history to reduce jitter. Distance inputs come
//! from external vision pipelines as plain (name, distance, confidence)
//! values; everything that produces a distance is out of scope here.

pub mod core;
pub mod error;
pub mod registry;
pub mod service;
pub mod smoothing;
pub mod solver;

// Re-export commonly used types
pub use crate::core::{Measurement, Point, DEFAULT_CONFIDENCE, MAX_POSITION_HISTORY, MIN_LANDMARKS};
pub use crate::error::PositioningError;
pub use crate::registry::{LandmarkRegistry, DEFAULT_STORE_PATH};
pub use crate::service::PositioningService;
pub use crate::smoothing::HistorySmoother;
pub use crate::solver::{centroid, PositionSolver, RangeConstraint};
