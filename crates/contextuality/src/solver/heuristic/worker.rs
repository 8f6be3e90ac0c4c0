//! One local-search worker and the board it publishes to.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::info;

use super::threshold::ThresholdWindow;
use crate::assignment::{Incidence, QuantumAssignment};
use crate::cancel::CancelFlag;
use crate::error::{dense_table, Result};
use crate::symplectic::Observable;

/// Cross-worker state: the best candidate and the threshold window.
#[derive(Debug)]
pub(super) struct Board {
    pub(super) distance: usize,
    pub(super) solution: Vec<bool>,
    pub(super) window: ThresholdWindow,
}

/// What every worker reads.
pub(super) struct Shared<'a, 'p> {
    pub(super) qa: &'a QuantumAssignment<'p>,
    pub(super) negativity: &'a [bool],
    pub(super) incidence: &'a Incidence,
    pub(super) board: Mutex<Board>,
    /// Mirror of `board.distance` for lock-free polling.
    pub(super) best: AtomicUsize,
    pub(super) cancel: &'a CancelFlag,
    pub(super) interrupted: AtomicBool,
    pub(super) iterations: usize,
    pub(super) flip_probability: f64,
    pub(super) workers: usize,
    pub(super) started: Instant,
}

/// Thread-private search state.
pub(super) struct Worker<'s, 'a, 'p> {
    shared: &'s Shared<'a, 'p>,
    id: usize,
    rng: StdRng,
    signs: Vec<bool>,
    invalid: Vec<i64>,
    distance: usize,
}

impl<'s, 'a, 'p> Worker<'s, 'a, 'p> {
    /// All-positive candidate with its invalid-context counts.
    pub(super) fn new(shared: &'s Shared<'a, 'p>, id: usize, rng: StdRng) -> Result<Self> {
        let words = shared.qa.observable_count();
        let signs = dense_table("worker signs", words, false)?;
        let mut invalid = dense_table("worker invalid counts", words, 0i64)?;
        let mut distance = 0;
        for (points, &negative) in shared.qa.contexts().zip(shared.negativity) {
            if negative {
                distance += 1;
                for obs in points {
                    invalid[obs.index()] += 1;
                }
            }
        }
        Ok(Self {
            shared,
            id,
            rng,
            signs,
            invalid,
            distance,
        })
    }

    /// Runs rounds until the budget, a perfect solution or cancellation.
    pub(super) fn run(mut self) {
        let shared = self.shared;
        let mut current_max = 0i64;
        for round in 0..shared.iterations {
            if shared.cancel.is_cancelled() {
                shared.interrupted.store(true, Ordering::Relaxed);
                break;
            }
            let previous_max = current_max;
            let threshold = self.publish(round);
            if shared.best.load(Ordering::Acquire) == 0 {
                break;
            }
            current_max = self.sweep(previous_max, threshold);
        }
        let mut board = shared.board.lock();
        self.offer(&mut board);
    }

    /// Narrows the window if elected, then reports this worker's distance.
    /// Returns the threshold for the coming sweep.
    fn publish(&self, round: usize) -> f64 {
        let shared = self.shared;
        let mut board = shared.board.lock();
        if board.window.narrows_at(round, self.id, shared.workers) {
            board.window.narrow();
        }
        let threshold = board.window.threshold_for(self.id, shared.workers);
        board.window.record(self.distance, threshold);
        self.offer(&mut board);
        threshold
    }

    /// Copies this worker's candidate to the board unless the board's is
    /// strictly better.
    fn offer(&self, board: &mut Board) {
        let shared = self.shared;
        if self.distance <= board.distance {
            if self.distance < board.distance {
                info!(
                    distance = self.distance,
                    elapsed = shared.started.elapsed().as_secs_f64(),
                    worker = self.id,
                    "current Hamming distance"
                );
            }
            board.distance = self.distance;
            board.solution.copy_from_slice(&self.signs);
            shared.best.store(self.distance, Ordering::Release);
        }
    }

    /// One pass over every non-identity observable. Returns the largest
    /// invalid count produced by the pass.
    fn sweep(&mut self, previous_max: i64, threshold: f64) -> i64 {
        let shared = self.shared;
        let bar = previous_max as f64 * threshold;
        let mut current_max = 0;
        for word in 1..self.signs.len() {
            if self.invalid[word] as f64 <= bar {
                continue;
            }
            if self.rng.gen::<f64>() >= shared.flip_probability {
                continue;
            }
            self.signs[word] = !self.signs[word];
            let obs = Observable::new(word as u32);
            for &c in shared.incidence.contexts_of(obs) {
                let c = c as usize;
                let points = shared.qa.context(c);
                let parity = points.iter().fold(false, |acc, p| acc ^ self.signs[p.index()]);
                let adder: i64 = if parity == shared.negativity[c] { -1 } else { 1 };
                for p in points {
                    let count = &mut self.invalid[p.index()];
                    *count += adder;
                    current_max = current_max.max(*count);
                }
                if adder > 0 {
                    self.distance += 1;
                } else {
                    self.distance = self.distance.saturating_sub(1);
                }
            }
        }
        current_max
    }
}
