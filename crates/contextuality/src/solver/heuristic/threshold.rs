//! Adaptive flip-threshold window shared by the local-search workers.

use tracing::debug;

use crate::config::ThresholdSchedule;

/// A window `[min, max]` of flip thresholds centred on the best threshold
/// seen so far. Workers spread over the window; the last worker narrows it
/// around the centre every [`ThresholdSchedule::narrow_every`] rounds and
/// resets it once the radius falls below [`ThresholdSchedule::min_radius`].
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdWindow {
    min: f64,
    max: f64,
    center: f64,
    radius: f64,
    best_distance: usize,
    contexts: usize,
    fixed: Option<f64>,
    schedule: ThresholdSchedule,
}

impl ThresholdWindow {
    /// Full window, or a constant threshold when `fixed` is set.
    pub fn new(schedule: ThresholdSchedule, fixed: Option<f64>, contexts: usize) -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            center: fixed.unwrap_or(schedule.initial_center),
            radius: 1.0,
            best_distance: contexts,
            contexts,
            fixed,
            schedule,
        }
    }

    /// True if the threshold auto-tunes.
    pub fn is_adaptive(&self) -> bool {
        self.fixed.is_none()
    }

    /// Whether `worker` narrows the window before `round`.
    pub fn narrows_at(&self, round: usize, worker: usize, workers: usize) -> bool {
        self.is_adaptive()
            && worker + 1 == workers
            && round % self.schedule.narrow_every == self.schedule.narrow_every - 1
    }

    /// Shrinks the window around the centre, resetting it when too small.
    pub fn narrow(&mut self) {
        self.radius *= self.schedule.shrink;
        self.max = (self.center + self.radius).min(1.0);
        self.min = (self.center - self.radius).max(0.0);
        if self.radius < self.schedule.min_radius {
            self.radius = 1.0;
            self.center = self.schedule.reset_center;
            self.best_distance = self.contexts;
            debug!(center = self.center, "threshold window reset");
        }
    }

    /// Threshold used by `worker` of `workers` this round.
    pub fn threshold_for(&self, worker: usize, workers: usize) -> f64 {
        match self.fixed {
            Some(th) => th,
            None if workers <= 1 => self.center,
            None => self.min + (worker as f64 / workers as f64) * (self.max - self.min),
        }
    }

    /// Recentres on `threshold` if `distance` beats every distance seen
    /// since the last reset.
    pub fn record(&mut self, distance: usize, threshold: f64) {
        if distance < self.best_distance {
            self.best_distance = distance;
            self.center = threshold;
        }
    }

    /// Current `(min, center, max)`.
    pub fn bounds(&self) -> (f64, f64, f64) {
        (self.min, self.center, self.max)
    }
}
