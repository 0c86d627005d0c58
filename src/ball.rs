//! Ball position memory with constant-velocity fill-in across missed frames.

use log::{debug, warn};
use opencv::core::Point;

#[derive(Debug, Default)]
pub struct BallTrajectory {
    last_position: Option<Point>,
    history: Vec<Point>,
    /// Extrapolated frames since the last real observation.
    interpolated_run: usize,
    max_interpolated: Option<usize>,
}

impl BallTrajectory {
    /// `max_interpolated` caps consecutive extrapolations; `None` extrapolates forever.
    pub fn new(max_interpolated: Option<usize>) -> Self {
        Self {
            max_interpolated,
            ..Self::default()
        }
    }

    pub fn observe(&mut self, position: Point) {
        self.history.push(position);
        self.last_position = Some(position);
        self.interpolated_run = 0;
    }

    /// Estimate the ball for a frame without a ball detection.
    ///
    /// With two or more known positions the last step is repeated and the estimate is
    /// appended to the history. With a single position it is held in place. Returns
    /// `None` when no ball was ever seen or the run-length cap is reached.
    pub fn interpolate(&mut self) -> Option<Point> {
        let last = self.last_position?;
        if let Some(max) = self.max_interpolated {
            if self.interpolated_run >= max {
                if self.interpolated_run == max {
                    warn!("ball missing for {} frames, no longer extrapolating", max);
                    self.interpolated_run += 1;
                }
                return None;
            }
        }
        self.interpolated_run += 1;

        let n = self.history.len();
        if n < 2 {
            return Some(last);
        }
        let (prev, curr) = (self.history[n - 2], self.history[n - 1]);
        let estimate = Point::new(last.x + (curr.x - prev.x), last.y + (curr.y - prev.y));
        debug!("ball interpolated to ({}, {})", estimate.x, estimate.y);
        self.history.push(estimate);
        self.last_position = Some(estimate);
        Some(estimate)
    }

    pub fn last_position(&self) -> Option<Point> {
        self.last_position
    }

    pub fn history(&self) -> &[Point] {
        &self.history
    }

    pub fn consecutive_interpolated(&self) -> usize {
        self.interpolated_run
    }

    /// True once more than `after` frames in a row have been extrapolated.
    pub fn is_low_confidence(&self, after: usize) -> bool {
        self.interpolated_run > after
    }
}
