//! Positioning service orchestration
//!
//! One `PositioningService` tracks one entity (device or session). It owns
//! its landmark registry, solver, and smoother outright; concurrent callers
//! must either hold separate instances or serialize access externally,
//! since history and initial-guess seeding are per-entity state.

use std::collections::HashMap;

use crate::core::{Measurement, Point, MIN_LANDMARKS};
use crate::error::PositioningError;
use crate::registry::LandmarkRegistry;
use crate::smoothing::HistorySmoother;
use crate::solver::{centroid, PositionSolver, RangeConstraint};

/// Position estimation service for a single tracked entity
#[derive(Debug)]
pub struct PositioningService {
    /// Landmark name to coordinate mapping
    registry: LandmarkRegistry,
    /// Multilateration engine
    solver: PositionSolver,
    /// Temporal smoothing over recent estimates
    smoother: HistorySmoother,
}

impl PositioningService {
    /// Create a service around an opened registry, with default solver and
    /// smoother configuration.
    pub fn new(registry: LandmarkRegistry) -> Self {
        Self {
            registry,
            solver: PositionSolver::default(),
            smoother: HistorySmoother::new(),
        }
    }

    /// Create a service with an explicit solver configuration.
    pub fn with_solver(registry: LandmarkRegistry, solver: PositionSolver) -> Self {
        Self {
            registry,
            solver,
            smoother: HistorySmoother::new(),
        }
    }

    /// Estimate the current position from distances to named landmarks.
    ///
    /// Entries whose name is not registered are ignored; at least
    /// [`MIN_LANDMARKS`] must resolve or no solve is attempted. Missing
    /// confidences default to 1.0. On success the raw solver output enters
    /// the history buffer and the smoothed position is returned; on failure
    /// the history and cached position are left untouched.
    pub fn estimate_position(
        &mut self,
        distances: &HashMap<String, f64>,
        confidences: Option<&HashMap<String, f64>>,
    ) -> Result<Point, PositioningError> {
        let mut constraints = Vec::with_capacity(distances.len());
        let mut landmarks = Vec::with_capacity(distances.len());

        for (name, &distance) in distances {
            // Unregistered names are skipped outright; only entries that
            // resolve get validated, so a bad value on an unknown name
            // cannot fail an otherwise solvable call.
            let Some(landmark) = self.registry.get(name) else {
                continue;
            };

            let confidence = confidences
                .and_then(|c| c.get(name))
                .copied()
                .unwrap_or(crate::core::DEFAULT_CONFIDENCE);
            let measurement = Measurement::new(name, distance, confidence)?;

            landmarks.push(landmark);
            constraints.push(RangeConstraint {
                landmark,
                distance: measurement.distance,
                confidence: measurement.confidence,
            });
        }

        if constraints.len() < MIN_LANDMARKS {
            return Err(PositioningError::InsufficientLandmarks {
                resolved: constraints.len(),
                required: MIN_LANDMARKS,
            });
        }

        let initial_guess = match self.smoother.last_position() {
            Some(last) => last,
            None => centroid(landmarks.iter()),
        };

        let raw = self.solver.estimate(&constraints, initial_guess)?;
        Ok(self.smoother.push(raw))
    }

    /// Insert or overwrite a landmark's registered position.
    pub fn update_landmark_position(&mut self, name: &str, position: Point) {
        self.registry.upsert(name, position);
    }

    /// Copy of the raw estimate history, oldest to newest, at most 10 entries.
    pub fn get_position_history(&self) -> Vec<Point> {
        self.smoother.history()
    }

    /// Drop all history and the cached last position.
    pub fn reset_position_history(&mut self) {
        self.smoother.reset();
    }

    /// Most recent smoothed position, if any.
    pub fn last_position(&self) -> Option<Point> {
        self.smoother.last_position()
    }

    /// Read access to the landmark registry for diagnostics.
    pub fn registry(&self) -> &LandmarkRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    fn service_with_triangle() -> (PositioningService, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let registry = LandmarkRegistry::load(dir.path().join("landmarks.json"));
        let mut service = PositioningService::new(registry);
        service.update_landmark_position("a", Point::new(0.0, 0.0));
        service.update_landmark_position("b", Point::new(10.0, 0.0));
        service.update_landmark_position("c", Point::new(0.0, 10.0));
        (service, dir)
    }

    fn triangle_distances(truth: Point) -> HashMap<String, f64> {
        let mut distances = HashMap::new();
        distances.insert("a".to_string(), truth.distance_to(&Point::new(0.0, 0.0)));
        distances.insert("b".to_string(), truth.distance_to(&Point::new(10.0, 0.0)));
        distances.insert("c".to_string(), truth.distance_to(&Point::new(0.0, 10.0)));
        distances
    }

    #[test]
    fn test_estimate_recovers_true_position() {
        let (mut service, _dir) = service_with_triangle();
        let truth = Point::new(3.0, 4.0);

        let estimate = service
            .estimate_position(&triangle_distances(truth), None)
            .unwrap();

        assert_relative_eq!(estimate.x, truth.x, epsilon = 1e-4);
        assert_relative_eq!(estimate.y, truth.y, epsilon = 1e-4);
    }

    #[test]
    fn test_unknown_names_are_ignored() {
        let (mut service, _dir) = service_with_triangle();
        let truth = Point::new(3.0, 4.0);
        let mut distances = triangle_distances(truth);
        distances.insert("nowhere".to_string(), 42.0);

        let estimate = service.estimate_position(&distances, None).unwrap();
        assert_relative_eq!(estimate.x, truth.x, epsilon = 1e-4);
    }

    #[test]
    fn test_two_resolvable_landmarks_is_insufficient() {
        let (mut service, _dir) = service_with_triangle();
        let mut distances = HashMap::new();
        distances.insert("a".to_string(), 5.0);
        distances.insert("b".to_string(), 7.0);
        distances.insert("unregistered".to_string(), 3.0);

        let err = service.estimate_position(&distances, None).unwrap_err();
        assert_eq!(
            err,
            PositioningError::InsufficientLandmarks {
                resolved: 2,
                required: 3
            }
        );
        assert!(service.get_position_history().is_empty());
    }

    #[test]
    fn test_invalid_distance_rejected_before_solve() {
        let (mut service, _dir) = service_with_triangle();
        let mut distances = triangle_distances(Point::new(3.0, 4.0));
        distances.insert("a".to_string(), -5.0);

        let err = service.estimate_position(&distances, None).unwrap_err();
        assert!(matches!(err, PositioningError::InvalidDistance { .. }));
        assert!(service.get_position_history().is_empty());
    }

    #[test]
    fn test_invalid_distance_on_unregistered_name_is_ignored() {
        let (mut service, _dir) = service_with_triangle();
        let truth = Point::new(3.0, 4.0);
        let mut distances = triangle_distances(truth);
        distances.insert("nowhere".to_string(), -1.0);

        let estimate = service.estimate_position(&distances, None).unwrap();
        assert_relative_eq!(estimate.x, truth.x, epsilon = 1e-4);
        assert_relative_eq!(estimate.y, truth.y, epsilon = 1e-4);
    }

    #[test]
    fn test_failure_leaves_history_untouched() {
        let (mut service, _dir) = service_with_triangle();
        let truth = Point::new(3.0, 4.0);
        service
            .estimate_position(&triangle_distances(truth), None)
            .unwrap();
        let before = service.get_position_history();

        let mut too_few = HashMap::new();
        too_few.insert("a".to_string(), 5.0);
        assert!(service.estimate_position(&too_few, None).is_err());

        assert_eq!(service.get_position_history(), before);
    }

    #[test]
    fn test_confidences_default_when_absent() {
        let (mut service, _dir) = service_with_triangle();
        let truth = Point::new(3.0, 4.0);
        let mut confidences = HashMap::new();
        confidences.insert("a".to_string(), 0.9);

        // Only one confidence supplied; the rest default to 1.0.
        let estimate = service
            .estimate_position(&triangle_distances(truth), Some(&confidences))
            .unwrap();
        assert_relative_eq!(estimate.x, truth.x, epsilon = 1e-3);
    }

    #[test]
    fn test_updated_landmark_becomes_usable() {
        let (mut service, _dir) = service_with_triangle();
        let truth = Point::new(3.0, 4.0);
        service.update_landmark_position("d", Point::new(10.0, 10.0));

        let mut distances = triangle_distances(truth);
        distances.remove("a");
        distances.insert("d".to_string(), truth.distance_to(&Point::new(10.0, 10.0)));

        let estimate = service.estimate_position(&distances, None).unwrap();
        assert_relative_eq!(estimate.x, truth.x, epsilon = 1e-4);
        assert_relative_eq!(estimate.y, truth.y, epsilon = 1e-4);
    }

    #[test]
    fn test_reset_falls_back_to_centroid_guess() {
        let (mut service, _dir) = service_with_triangle();
        let truth = Point::new(3.0, 4.0);
        service
            .estimate_position(&triangle_distances(truth), None)
            .unwrap();
        assert!(service.last_position().is_some());

        service.reset_position_history();
        assert!(service.get_position_history().is_empty());
        assert_eq!(service.last_position(), None);

        // Solves again from the centroid guess.
        let estimate = service
            .estimate_position(&triangle_distances(truth), None)
            .unwrap();
        assert_relative_eq!(estimate.x, truth.x, epsilon = 1e-4);
    }
}
