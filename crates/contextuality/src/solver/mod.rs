//! Degree computation: the exact SAT search, the local-search heuristic and
//! the engine that dispatches between them.
//!
//! Every answer is re-scored with [`QuantumAssignment::score`] before it is
//! returned, so a solver can never report a distance its own candidate does
//! not achieve.
//!
//! ```no_run
//! use contextuality::assignment::{isotropic_lines, QuantumAssignment};
//! use contextuality::config::DegreeConfig;
//! use contextuality::solver::{DegreeEngine, SolverChoice};
//!
//! # fn main() -> contextuality::Result<()> {
//! let doily = isotropic_lines(2)?;
//! let qa = QuantumAssignment::new(&doily, 2)?;
//! let engine = DegreeEngine::new(DegreeConfig::default())?;
//! let outcome = engine.degree(&qa, &SolverChoice::Exact, false)?;
//! assert_eq!(outcome.degree, 3);
//! # Ok(())
//! # }
//! ```

pub mod exact;
pub mod heuristic;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::assignment::{Candidate, QuantumAssignment};
use crate::cancel::CancelFlag;
use crate::config::{DegreeConfig, SolverMode};
use crate::error::{Error, Result};

use self::exact::{ExactSolver, ExternalPipeline, SatPipeline};
use self::heuristic::HeuristicSolver;

/// Raw result of one solver run, before verification.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Distance claimed by the solver.
    pub distance: usize,
    /// Candidate achieving it.
    pub solution: Candidate,
    /// The cancel flag cut the search short.
    pub interrupted: bool,
}

/// How a degree query is answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverChoice {
    /// SAT bound tightening; exact unless interrupted.
    Exact,
    /// Local search; an upper bound.
    Heuristic,
    /// Score a supplied candidate.
    Replay(Candidate),
}

impl SolverChoice {
    /// Choice for a configured mode. `Replay` needs a candidate.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] for [`SolverMode::Replay`] without a candidate.
    pub fn from_mode(mode: SolverMode, replay: Option<Candidate>) -> Result<Self> {
        match (mode, replay) {
            (SolverMode::Exact, _) => Ok(Self::Exact),
            (SolverMode::Heuristic, _) => Ok(Self::Heuristic),
            (SolverMode::Replay, Some(candidate)) => Ok(Self::Replay(candidate)),
            (SolverMode::Replay, None) => Err(Error::Config(
                "replay solver needs a solution to score".into(),
            )),
        }
    }
}

/// Verified answer to a degree query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DegreeOutcome {
    /// Best distance found, checked against the candidate.
    pub degree: usize,
    /// The candidate, when requested.
    pub solution: Option<Candidate>,
    /// `degree` is proven minimal.
    pub exact: bool,
    /// Cancellation cut the search short.
    pub interrupted: bool,
}

/// Dispatches degree queries to the configured solvers.
#[derive(Clone)]
pub struct DegreeEngine {
    config: DegreeConfig,
    cancel: CancelFlag,
    pipeline: Arc<dyn SatPipeline>,
}

impl DegreeEngine {
    /// Engine driving the external tools named in `config`.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if `config` fails validation.
    pub fn new(config: DegreeConfig) -> Result<Self> {
        let pipeline = Arc::new(ExternalPipeline::new(&config.exact));
        Self::with_pipeline(config, pipeline)
    }

    /// Engine with a custom SAT back end.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if `config` fails validation.
    pub fn with_pipeline(config: DegreeConfig, pipeline: Arc<dyn SatPipeline>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cancel: CancelFlag::new(),
            pipeline,
        })
    }

    /// Replaces the cancel flag, typically with one wired to a signal handler.
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// The flag both solvers poll.
    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    /// Active configuration.
    pub fn config(&self) -> &DegreeConfig {
        &self.config
    }

    /// Contextuality degree of `qa`, or the best bound found.
    ///
    /// An honoured cancellation is reported through
    /// [`DegreeOutcome::interrupted`] and the flag is cleared.
    ///
    /// # Errors
    ///
    /// Sign errors, tool failures, allocation failures, a replay candidate
    /// of the wrong size, or [`Error::ScoreMismatch`] if a solver's claim
    /// disagrees with the checker.
    pub fn degree(
        &self,
        qa: &QuantumAssignment<'_>,
        choice: &SolverChoice,
        want_solution: bool,
    ) -> Result<DegreeOutcome> {
        let (search, exact) = match choice {
            SolverChoice::Exact => {
                let solver = ExactSolver::new(self.pipeline.as_ref(), &self.config.exact, &self.cancel);
                let search = solver.solve(qa)?;
                let exact = !search.interrupted;
                (search, exact)
            }
            SolverChoice::Heuristic => {
                let solver = HeuristicSolver::new(&self.config.heuristic, &self.cancel);
                (solver.solve(qa)?, false)
            }
            SolverChoice::Replay(candidate) => {
                let search = SearchOutcome {
                    distance: qa.score(candidate)?,
                    solution: candidate.clone(),
                    interrupted: false,
                };
                (search, false)
            }
        };

        let actual = qa.score(&search.solution)?;
        if actual != search.distance {
            return Err(Error::ScoreMismatch {
                claimed: search.distance,
                actual,
            });
        }
        if search.interrupted && self.cancel.take() {
            warn!(degree = actual, "returning best answer after interrupt");
        }
        debug!(degree = actual, exact, "degree verified");

        Ok(DegreeOutcome {
            degree: actual,
            solution: want_solution.then_some(search.solution),
            exact,
            interrupted: search.interrupted,
        })
    }

    /// True iff no sign assignment satisfies every context of `qa`.
    ///
    /// # Errors
    ///
    /// Sign errors and tool failures.
    pub fn is_contextual(&self, qa: &QuantumAssignment<'_>) -> Result<bool> {
        ExactSolver::new(self.pipeline.as_ref(), &self.config.exact, &self.cancel).is_contextual(qa)
    }
}

impl std::fmt::Debug for DegreeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DegreeEngine")
            .field("config", &self.config)
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}
