//! System parameters

/// Minimum number of resolvable landmarks required for a position solve
pub const MIN_LANDMARKS: usize = 3;

/// Number of recent position estimates retained for temporal smoothing
pub const MAX_POSITION_HISTORY: usize = 10;

/// Confidence assigned to a measurement when the caller supplies none
pub const DEFAULT_CONFIDENCE: f64 = 1.0;
