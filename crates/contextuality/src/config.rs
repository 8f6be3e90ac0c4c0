//! Solver configuration, loadable from TOML.
//!
//! Every section is optional; missing fields take their defaults.
//!
//! ```toml
//! solver = "heuristic"
//!
//! [heuristic]
//! iterations = 20000
//! flip_probability = 0.9
//! seed = 7
//!
//! [heuristic.schedule]
//! initial_center = 0.8
//!
//! [exact]
//! solver = "/opt/kissat/bin/kissat"
//! hint = "sat"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which solver answers a degree query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverMode {
    /// SAT bisection through external tools.
    #[default]
    Exact,
    /// Parallel local search.
    Heuristic,
    /// Score an externally supplied solution.
    Replay,
}

/// Expected answer passed to the CNF solver as `--sat` / `--unsat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SatHint {
    /// Optimistic.
    Sat,
    /// Pessimistic.
    #[default]
    Unsat,
}

impl SatHint {
    /// Command-line flag for the solver.
    pub fn flag(self) -> &'static str {
        match self {
            Self::Sat => "--sat",
            Self::Unsat => "--unsat",
        }
    }
}

/// Constants of the adaptive threshold window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdSchedule {
    /// Rounds between two narrowings.
    pub narrow_every: usize,
    /// Factor applied to the radius at each narrowing.
    pub shrink: f64,
    /// Radius below which the window resets.
    pub min_radius: f64,
    /// Starting centre of the window.
    pub initial_center: f64,
    /// Centre after a reset.
    pub reset_center: f64,
}

impl Default for ThresholdSchedule {
    fn default() -> Self {
        Self {
            narrow_every: 20,
            shrink: 0.5,
            min_radius: 0.01,
            initial_center: 0.85,
            reset_center: 0.5,
        }
    }
}

/// Local-search parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeuristicConfig {
    /// Rounds per worker.
    pub iterations: usize,
    /// Probability of flipping an eligible observable.
    pub flip_probability: f64,
    /// Fixed flip threshold; `None` auto-tunes.
    pub threshold: Option<f64>,
    /// Worker threads.
    pub workers: usize,
    /// Base seed; worker `w` uses `seed + w`. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Adaptive window constants.
    pub schedule: ThresholdSchedule,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            iterations: 10_000,
            flip_probability: 0.95,
            threshold: None,
            workers: std::thread::available_parallelism().map_or(1, usize::from),
            seed: None,
            schedule: ThresholdSchedule::default(),
        }
    }
}

/// External-tool parameters for the exact solver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExactConfig {
    /// Circuit-to-CNF translator.
    pub translator: PathBuf,
    /// Arguments placed before the translator's file operands.
    pub translator_args: Vec<String>,
    /// CNF solver.
    pub solver: PathBuf,
    /// Expected-answer hint for the solver.
    pub hint: SatHint,
    /// Directory for the scratch files; `None` uses the system temp dir.
    pub scratch_dir: Option<PathBuf>,
    /// Disambiguates scratch files of concurrent solves.
    pub worker_id: usize,
}

impl Default for ExactConfig {
    fn default() -> Self {
        Self {
            translator: PathBuf::from("bc2cnf"),
            translator_args: vec!["-nosimplify".to_owned()],
            solver: PathBuf::from("kissat"),
            hint: SatHint::default(),
            scratch_dir: None,
            worker_id: 0,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DegreeConfig {
    /// Default solver.
    pub solver: SolverMode,
    /// Local-search section.
    pub heuristic: HeuristicConfig,
    /// Exact-solver section.
    pub exact: ExactConfig,
}

impl DegreeConfig {
    /// Parses and validates TOML text.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] for syntax errors, unknown keys or invalid values.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the file cannot be read, otherwise as
    /// [`DegreeConfig::from_toml_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let h = &self.heuristic;
        let s = &h.schedule;
        let unit = |name: &str, v: f64| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(Error::Config(format!("{name} must lie in [0, 1], got {v}")))
            }
        };
        unit("heuristic.flip_probability", h.flip_probability)?;
        if let Some(th) = h.threshold {
            unit("heuristic.threshold", th)?;
        }
        unit("heuristic.schedule.initial_center", s.initial_center)?;
        unit("heuristic.schedule.reset_center", s.reset_center)?;
        if h.workers == 0 {
            return Err(Error::Config("heuristic.workers must be at least 1".into()));
        }
        if s.narrow_every == 0 {
            return Err(Error::Config(
                "heuristic.schedule.narrow_every must be at least 1".into(),
            ));
        }
        if !(s.shrink > 0.0 && s.shrink < 1.0) {
            return Err(Error::Config(format!(
                "heuristic.schedule.shrink must lie in (0, 1), got {}",
                s.shrink
            )));
        }
        if !(s.min_radius > 0.0 && s.min_radius <= 1.0) {
            return Err(Error::Config(format!(
                "heuristic.schedule.min_radius must lie in (0, 1], got {}",
                s.min_radius
            )));
        }
        Ok(())
    }
}
