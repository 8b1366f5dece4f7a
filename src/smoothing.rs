//! Temporal smoothing over recent position estimates
//!
//! Successive raw solver outputs jitter with measurement noise. The smoother
//! keeps a bounded FIFO of the most recent raw estimates and blends them into
//! a weighted average biased toward newer entries. The blended point is also
//! cached as the last known position, which seeds the next solve's initial
//! guess.

use std::collections::VecDeque;

use crate::core::{Point, MAX_POSITION_HISTORY};

/// Bounded-history weighted-average position smoother
#[derive(Debug, Clone)]
pub struct HistorySmoother {
    /// Raw estimates, oldest first, never longer than `capacity`
    history: VecDeque<Point>,
    /// Maximum retained estimates
    capacity: usize,
    /// Most recent smoothed output
    last_position: Option<Point>,
}

impl Default for HistorySmoother {
    fn default() -> Self {
        Self::new()
    }
}

impl HistorySmoother {
    /// Create a smoother with the standard capacity of [`MAX_POSITION_HISTORY`].
    pub fn new() -> Self {
        Self::with_capacity(MAX_POSITION_HISTORY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
            last_position: None,
        }
    }

    /// Append a raw estimate, evicting the oldest entry beyond capacity, and
    /// return the smoothed position.
    ///
    /// Weights rise linearly from 0.5 on the oldest entry to 1.0 on the
    /// newest and are normalized to sum to 1, so a constant input stream
    /// passes through unchanged.
    pub fn push(&mut self, raw: Point) -> Point {
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(raw);

        let n = self.history.len();
        let weights: Vec<f64> = if n == 1 {
            vec![1.0]
        } else {
            (0..n)
                .map(|k| 0.5 + 0.5 * k as f64 / (n - 1) as f64)
                .collect()
        };
        let total: f64 = weights.iter().sum();

        let mut smoothed = Point::new(0.0, 0.0);
        for (p, w) in self.history.iter().zip(&weights) {
            smoothed.x += p.x * w / total;
            smoothed.y += p.y * w / total;
            smoothed.z += p.z * w / total;
        }

        self.last_position = Some(smoothed);
        smoothed
    }

    /// Copy of the raw estimate history, oldest to newest.
    pub fn history(&self) -> Vec<Point> {
        self.history.iter().copied().collect()
    }

    /// Most recent smoothed position, if any estimate has been pushed since
    /// the last reset.
    pub fn last_position(&self) -> Option<Point> {
        self.last_position
    }

    /// Clear the history and the cached last position. The next solve falls
    /// back to a landmark-centroid initial guess.
    pub fn reset(&mut self) {
        self.history.clear();
        self.last_position = None;
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
