//! Exact degree by bound tightening over a SAT back end.
//!
//! Starting from the all-positive baseline (distance = negative count), each
//! round asks the back end for an assignment violating at most `D` contexts.
//! A model is rescored with [`QuantumAssignment::score`] and the bound drops
//! below the better of the two; the first UNSAT answer proves the best score
//! seen is the degree.

mod model;
mod pipeline;
mod problem;
mod scratch;

pub use model::{parse_model, MappingParser};
pub use pipeline::{ExternalPipeline, SatPipeline, SatStatus, EXIT_SAT, EXIT_UNSAT};
pub use problem::{write_problem, HEADER};
pub use scratch::ScratchFiles;

use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::SearchOutcome;
use crate::assignment::{Candidate, QuantumAssignment};
use crate::cancel::CancelFlag;
use crate::config::ExactConfig;
use crate::error::Result;

/// One exact solve against a borrowed pipeline.
pub struct ExactSolver<'a> {
    pipeline: &'a dyn SatPipeline,
    scratch_dir: PathBuf,
    worker_id: usize,
    cancel: &'a CancelFlag,
}

impl<'a> ExactSolver<'a> {
    /// Solver writing scratch files where `config` says.
    pub fn new(pipeline: &'a dyn SatPipeline, config: &ExactConfig, cancel: &'a CancelFlag) -> Self {
        Self {
            pipeline,
            scratch_dir: config
                .scratch_dir
                .clone()
                .unwrap_or_else(std::env::temp_dir),
            worker_id: config.worker_id,
            cancel,
        }
    }

    /// Minimum Hamming distance and a candidate achieving it.
    ///
    /// If the cancel flag is observed between rounds, the best candidate so
    /// far is returned with `interrupted` set.
    ///
    /// # Errors
    ///
    /// Sign errors, tool failures and malformed tool output.
    pub fn solve(&self, qa: &QuantumAssignment<'_>) -> Result<SearchOutcome> {
        let mut best = Candidate::all_positive(qa.n_qubits())?;
        let mut best_score = qa.negative_count()?;
        if qa.is_empty() || best_score == 0 {
            return Ok(SearchOutcome {
                distance: 0,
                solution: best,
                interrupted: false,
            });
        }

        let mapping = MappingParser::new()?;
        let files = ScratchFiles::new(&self.scratch_dir, self.worker_id);
        let started = Instant::now();
        let mut bound = best_score;
        info!(
            contexts = qa.len(),
            negative = best_score,
            "starting SAT computation"
        );

        loop {
            if self.cancel.is_cancelled() {
                warn!(best = best_score, bound, "exact search interrupted");
                return Ok(SearchOutcome {
                    distance: best_score,
                    solution: best,
                    interrupted: true,
                });
            }

            let problem = write_problem(qa, Some(bound))?;
            let status = self.pipeline.solve(&problem, &files)?;
            debug!(bound, ?status, "bisection step");
            if status == SatStatus::Unsat {
                break;
            }

            files.back_up()?;
            let model = parse_model(files.log_backup())?;
            let mut candidate = Candidate::all_positive(qa.n_qubits())?;
            mapping.apply(files.circuit_backup(), &model, &mut candidate)?;
            let score = qa.score(&candidate)?;
            if score <= best_score {
                if score < best_score {
                    info!(
                        distance = score,
                        elapsed = started.elapsed().as_secs_f64(),
                        "current Hamming distance"
                    );
                }
                best_score = score;
                best = candidate;
            }

            match score.min(bound).checked_sub(1) {
                Some(next) => bound = next,
                None => break,
            }
        }

        info!(degree = best_score, "contextuality degree found");
        Ok(SearchOutcome {
            distance: best_score,
            solution: best,
            interrupted: false,
        })
    }

    /// True iff no sign assignment satisfies every context.
    ///
    /// # Errors
    ///
    /// Sign errors and tool failures.
    pub fn is_contextual(&self, qa: &QuantumAssignment<'_>) -> Result<bool> {
        if qa.is_empty() {
            return Ok(false);
        }
        let files = ScratchFiles::new(&self.scratch_dir, self.worker_id);
        let status = self.pipeline.solve(&write_problem(qa, None)?, &files)?;
        debug!(?status, "contextuality test");
        Ok(status == SatStatus::Unsat)
    }
}

impl std::fmt::Debug for ExactSolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExactSolver")
            .field("scratch_dir", &self.scratch_dir)
            .field("worker_id", &self.worker_id)
            .finish_non_exhaustive()
    }
}
