//! Parallel local search for an upper bound on the degree.
//!
//! Each worker keeps its own candidate, the number of invalid contexts on
//! every observable, and its running distance, all updated incrementally.
//! A round flips, with a fixed probability, every observable whose invalid
//! count exceeds `threshold × previous round's maximum`. Workers publish to
//! a shared board under one mutex: the best candidate and the adaptive
//! threshold window.
//!
//! The result is only an upper bound; [`crate::solver::DegreeEngine`]
//! re-scores it before reporting.

mod threshold;
mod worker;

pub use threshold::ThresholdWindow;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use self::worker::{Board, Shared, Worker};
use super::SearchOutcome;
use crate::assignment::{Candidate, Incidence, QuantumAssignment};
use crate::cancel::CancelFlag;
use crate::config::HeuristicConfig;
use crate::error::{dense_table, Result};

/// Local search configured by a [`HeuristicConfig`].
#[derive(Debug)]
pub struct HeuristicSolver<'a> {
    config: &'a HeuristicConfig,
    cancel: &'a CancelFlag,
}

impl<'a> HeuristicSolver<'a> {
    /// Solver over `config`.
    pub fn new(config: &'a HeuristicConfig, cancel: &'a CancelFlag) -> Self {
        Self { config, cancel }
    }

    /// Best distance found within the iteration budget, with its candidate.
    ///
    /// # Errors
    ///
    /// Sign errors, allocation failures, or [`crate::Error::WorkerPool`].
    pub fn solve(&self, qa: &QuantumAssignment<'_>) -> Result<SearchOutcome> {
        let negativity = qa.negativity()?;
        let negative = qa.negative_count()?;
        let incidence = Incidence::build(qa)?;
        let workers = self.config.workers.max(1);
        debug!(
            contexts = qa.len(),
            max_degree = incidence.max_degree(),
            workers,
            "local search starting"
        );

        let window = ThresholdWindow::new(
            self.config.schedule.clone(),
            self.config.threshold,
            qa.len(),
        );
        let shared = Shared {
            qa,
            negativity,
            incidence: &incidence,
            board: Mutex::new(Board {
                distance: negative,
                solution: dense_table("best signs", qa.observable_count(), false)?,
                window,
            }),
            best: AtomicUsize::new(negative),
            cancel: self.cancel,
            interrupted: AtomicBool::new(false),
            iterations: self.config.iterations,
            flip_probability: self.config.flip_probability,
            workers,
            started: Instant::now(),
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("ctx-heuristic-{i}"))
            .build()?;
        let crew = (0..workers)
            .map(|id| Worker::new(&shared, id, self.rng_for(id)))
            .collect::<Result<Vec<_>>>()?;
        pool.scope(|scope| {
            for worker in crew {
                scope.spawn(move |_| worker.run());
            }
        });

        let interrupted = shared.interrupted.load(Ordering::Relaxed);
        let board = shared.board.into_inner();
        if interrupted {
            warn!(best = board.distance, "local search interrupted");
        } else {
            info!(
                distance = board.distance,
                epsilon = qa.epsilon(board.distance),
                "Hamming distance found"
            );
        }
        Ok(SearchOutcome {
            distance: board.distance,
            solution: Candidate::from_signs(board.solution),
            interrupted,
        })
    }

    fn rng_for(&self, worker: usize) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(worker as u64)),
            None => StdRng::from_entropy(),
        }
    }
}
