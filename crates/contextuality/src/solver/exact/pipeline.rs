//! Translate-then-solve back ends.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use tracing::debug;

use super::scratch::ScratchFiles;
use crate::config::{ExactConfig, SatHint};
use crate::error::{Error, Result};

/// Solver exit code for a satisfiable problem.
pub const EXIT_SAT: i32 = 10;
/// Solver exit code for an unsatisfiable problem.
pub const EXIT_UNSAT: i32 = 20;

/// Answer of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SatStatus {
    /// A model was written to the log.
    Sat,
    /// No model exists.
    Unsat,
}

/// Turns circuit text into a SAT answer.
///
/// On [`SatStatus::Sat`] an implementation must leave the translator's
/// `c v<word> <-> <variable>` comments in [`ScratchFiles::circuit`] and the
/// solver's `v` lines in [`ScratchFiles::log`].
pub trait SatPipeline: Send + Sync {
    /// Runs one problem.
    ///
    /// # Errors
    ///
    /// Tool failures; an unexpected exit code is [`Error::ToolStatus`].
    fn solve(&self, problem: &str, files: &ScratchFiles) -> Result<SatStatus>;
}

/// Spawns the configured translator and CNF solver.
#[derive(Debug, Clone)]
pub struct ExternalPipeline {
    translator: PathBuf,
    translator_args: Vec<String>,
    solver: PathBuf,
    hint: SatHint,
}

impl ExternalPipeline {
    /// Pipeline from the exact-solver configuration.
    pub fn new(config: &ExactConfig) -> Self {
        Self {
            translator: config.translator.clone(),
            translator_args: config.translator_args.clone(),
            solver: config.solver.clone(),
            hint: config.hint,
        }
    }

    fn spawn_error(tool: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
        move |source| Error::ToolMissing {
            tool: tool.to_path_buf(),
            source,
        }
    }

    fn status_error(tool: &Path, status: ExitStatus) -> Error {
        Error::ToolStatus {
            tool: tool.to_path_buf(),
            status: status.to_string(),
        }
    }

    fn translate(&self, problem: &str, files: &ScratchFiles) -> Result<()> {
        let out = File::create(files.circuit()).map_err(|e| Error::io(files.circuit(), e))?;
        let mut child = Command::new(&self.translator)
            .args(&self.translator_args)
            .stdin(Stdio::piped())
            .stdout(out)
            .spawn()
            .map_err(Self::spawn_error(&self.translator))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(problem.as_bytes())
                .map_err(|e| Error::io(&self.translator, e))?;
        }
        let status = child.wait().map_err(|e| Error::io(&self.translator, e))?;
        if !status.success() {
            return Err(Self::status_error(&self.translator, status));
        }
        Ok(())
    }
}

impl SatPipeline for ExternalPipeline {
    fn solve(&self, problem: &str, files: &ScratchFiles) -> Result<SatStatus> {
        self.translate(problem, files)?;

        let log = File::create(files.log()).map_err(|e| Error::io(files.log(), e))?;
        let status = Command::new(&self.solver)
            .arg(self.hint.flag())
            .arg("-q")
            .arg(files.circuit())
            .stdin(Stdio::null())
            .stdout(log)
            .status()
            .map_err(Self::spawn_error(&self.solver))?;
        debug!(solver = %self.solver.display(), ?status, "solver exited");
        match status.code() {
            Some(EXIT_SAT) => Ok(SatStatus::Sat),
            Some(EXIT_UNSAT) => Ok(SatStatus::Unsat),
            _ => Err(Self::status_error(&self.solver, status)),
        }
    }
}
