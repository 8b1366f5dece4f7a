//! Iterative multilateration solver
//!
//! Fits a point to a set of confidence-weighted range constraints by
//! minimizing a soft-L1 robustified sum of range residuals with
//! Levenberg-Marquardt. The robust loss grows sub-quadratically for large
//! residuals, so a single bad range cannot dominate the fit the way it
//! would under plain squared error.

use nalgebra::{Matrix3, Vector3};

use crate::core::{Point, MIN_LANDMARKS};
use crate::error::PositioningError;

/// A measurement resolved against the landmark registry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeConstraint {
    /// Known landmark coordinate
    pub landmark: Point,
    /// Measured distance to the landmark (meters-equivalent units)
    pub distance: f64,
    /// Confidence in (0, 1]; scales the raw residual before the robust loss
    pub confidence: f64,
}

/// Levenberg-Marquardt multilateration solver
#[derive(Debug, Clone)]
pub struct PositionSolver {
    /// Iteration budget; exhausting it reports divergence
    pub max_iterations: usize,
    /// Relative cost-decrease and gradient-norm threshold for convergence
    pub convergence_tolerance: f64,
    /// Diagonal regularization keeping the normal equations solvable when
    /// the geometry leaves a flat direction (z is always one such direction)
    pub regularization_lambda: f64,
}

impl Default for PositionSolver {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            convergence_tolerance: 1e-10,
            regularization_lambda: 1e-9,
        }
    }
}

impl PositionSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Estimate the observer position from range constraints.
    ///
    /// Requires at least [`MIN_LANDMARKS`] constraints. The residual for
    /// constraint `i` is `confidence_i * (|estimate - landmark_i| - distance_i)`
    /// with the full three-component Euclidean norm; the confidence multiplies
    /// the raw residual before the loss is applied, so doubling a confidence
    /// quadruples that constraint's contribution to the total cost.
    pub fn estimate(
        &self,
        constraints: &[RangeConstraint],
        initial_guess: Point,
    ) -> Result<Point, PositioningError> {
        if constraints.len() < MIN_LANDMARKS {
            return Err(PositioningError::InsufficientLandmarks {
                resolved: constraints.len(),
                required: MIN_LANDMARKS,
            });
        }

        let mut estimate = initial_guess.to_vector();
        let mut cost = Self::robust_cost(constraints, &estimate);
        let mut lambda = 1e-3;
        let mut nu = 2.0;

        for iteration in 0..self.max_iterations {
            // The soft-L1 cost loses all precision once residuals drop below
            // roughly 1e-8, so an essentially-zero cost is itself convergence;
            // waiting for the gradient threshold would stall on rounding.
            if cost <= self.convergence_tolerance {
                return Ok(Point::from_vector(estimate));
            }

            let (gradient, hessian) = Self::normal_equations(constraints, &estimate);

            if gradient.norm() < self.convergence_tolerance {
                return Ok(Point::from_vector(estimate));
            }

            // Marquardt damping plus a fixed floor so the flat z direction
            // (and any degenerate in-plane direction) stays solvable.
            let mut augmented = hessian;
            for i in 0..3 {
                augmented[(i, i)] +=
                    lambda * (1.0 + hessian[(i, i)]) + self.regularization_lambda;
            }

            let step = match augmented.cholesky() {
                Some(decomposition) => decomposition.solve(&gradient),
                None => {
                    lambda = (lambda * nu).min(1e8);
                    nu = (nu * 2.0).min(16.0);
                    continue;
                }
            };

            let trial = estimate - step;
            let trial_cost = Self::robust_cost(constraints, &trial);

            // Non-strict acceptance: a step that leaves the cost unchanged at
            // the optimum counts as converged, not as a rejected step.
            if trial_cost <= cost {
                let reduction = cost - trial_cost;
                estimate = trial;
                cost = trial_cost;
                lambda = (lambda / 3.0).max(1e-12);
                nu = 2.0;

                if reduction <= self.convergence_tolerance * cost.max(1.0) {
                    return Ok(Point::from_vector(estimate));
                }
            } else {
                // Rejected step: tighten the trust region. A damping blow-up
                // means no descent direction exists any more.
                lambda = (lambda * nu).min(1e8);
                nu = (nu * 2.0).min(16.0);
                if lambda >= 1e8 {
                    return Err(PositioningError::SolverDivergence {
                        iterations: iteration + 1,
                        residual_cost: cost,
                    });
                }
            }
        }

        Err(PositioningError::SolverDivergence {
            iterations: self.max_iterations,
            residual_cost: cost,
        })
    }

    /// Confidence-scaled range residual for one constraint.
    fn residual(constraint: &RangeConstraint, estimate: &Vector3<f64>) -> f64 {
        let range = (estimate - constraint.landmark.to_vector()).norm();
        constraint.confidence * (range - constraint.distance)
    }

    /// Total soft-L1 cost: `rho(z) = 2 (sqrt(1 + z) - 1)` over `z = r^2`.
    fn robust_cost(constraints: &[RangeConstraint], estimate: &Vector3<f64>) -> f64 {
        constraints
            .iter()
            .map(|c| {
                let r = Self::residual(c, estimate);
                2.0 * ((1.0 + r * r).sqrt() - 1.0)
            })
            .sum()
    }

    /// Gradient and Gauss-Newton Hessian of the robust cost, with each
    /// residual and Jacobian row reweighted by `rho'(r^2) = 1 / sqrt(1 + r^2)`.
    fn normal_equations(
        constraints: &[RangeConstraint],
        estimate: &Vector3<f64>,
    ) -> (Vector3<f64>, Matrix3<f64>) {
        let mut gradient = Vector3::zeros();
        let mut hessian = Matrix3::zeros();

        for constraint in constraints {
            let delta = estimate - constraint.landmark.to_vector();
            let range = delta.norm();
            if range < 1e-12 {
                // Estimate sits on the landmark: the range gradient is
                // undefined, so the constraint contributes nothing this step.
                continue;
            }

            let r = constraint.confidence * (range - constraint.distance);
            let jacobian_row = delta * (constraint.confidence / range);
            let weight = 1.0 / (1.0 + r * r).sqrt();

            gradient += jacobian_row * (weight * r);
            hessian += jacobian_row * jacobian_row.transpose() * weight;
        }

        (gradient, hessian)
    }
}

/// Unweighted centroid of a set of landmark coordinates, flattened to z = 0.
/// Serves as the initial guess when no previous position is cached.
pub fn centroid<'a, I>(points: I) -> Point
where
    I: IntoIterator<Item = &'a Point>,
{
    let mut x = 0.0;
    let mut y = 0.0;
    let mut count = 0usize;
    for p in points {
        x += p.x;
        y += p.y;
        count += 1;
    }
    if count == 0 {
        return Point::new(0.0, 0.0);
    }
    Point::new(x / count as f64, y / count as f64)
}
