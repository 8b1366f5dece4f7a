//! Core data types for the positioning system

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::core::constants::DEFAULT_CONFIDENCE;
use crate::error::PositioningError;

/// A point in the flattened campus plane.
///
/// `x` and `y` carry latitude/longitude-like coordinates; `z` is kept for
/// full Euclidean distance computation but is 0 everywhere in practice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Point {
    /// Create a planar point with z = 0.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Create a point with an explicit z component.
    pub fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point, over all three components.
    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.to_vector() - other.to_vector()).norm()
    }

    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn from_vector(v: Vector3<f64>) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

/// A single range observation against a named landmark.
///
/// Validated at construction: the distance must be finite and non-negative,
/// the confidence finite and in (0, 1]. Invalid values are rejected rather
/// than clamped so that a bad upstream estimate never silently skews a solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub name: String,
    pub distance: f64,
    pub confidence: f64,
}

impl Measurement {
    pub fn new(name: &str, distance: f64, confidence: f64) -> Result<Self, PositioningError> {
        if !distance.is_finite() || distance < 0.0 {
            return Err(PositioningError::InvalidDistance {
                name: name.to_string(),
                distance,
            });
        }
        if !confidence.is_finite() || confidence <= 0.0 || confidence > 1.0 {
            return Err(PositioningError::InvalidConfidence {
                name: name.to_string(),
                confidence,
            });
        }
        Ok(Self {
            name: name.to_string(),
            distance,
            confidence,
        })
    }

    /// Construct with the default confidence of 1.0.
    pub fn with_default_confidence(name: &str, distance: f64) -> Result<Self, PositioningError> {
        Self::new(name, distance, DEFAULT_CONFIDENCE)
    }
}
