//! Error type shared by every layer of the crate.
//!
//! UNSAT answers, exhausted heuristic budgets and interruptions are outcomes
//! carried by [`crate::solver::DegreeOutcome`], not errors.

use std::path::PathBuf;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A context whose operator product is not `±I`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhaseError {
    /// The product on one qubit is not a nonzero multiple of the identity.
    /// `qubit == n_qubits` flags the accumulated product.
    #[error("product on qubit {qubit} is not a multiple of the identity")]
    NotScalar {
        /// Offending qubit.
        qubit: u32,
    },
    /// The accumulated phase is a unit other than `±1`.
    #[error("context phase is {re}{im:+}i, expected +1 or -1")]
    NotReal {
        /// Real part of the phase.
        re: i32,
        /// Imaginary part of the phase.
        im: i32,
    },
}

/// Everything that can stop a contextuality computation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A qubit-letter string could not be decoded.
    #[error("malformed observable string {text:?}: {reason}")]
    MalformedObservable {
        /// The offending text.
        text: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Qubit count outside the supported range.
    #[error("qubit count {0} is outside 1..={max}", max = crate::symplectic::MAX_QUBITS)]
    QubitCount(u32),

    /// A context's operator product is not `±I`.
    #[error("algebraic consistency violation in context {context}: {source}")]
    Phase {
        /// Live-context index.
        context: usize,
        /// What the oracle found.
        #[source]
        source: PhaseError,
    },

    /// A context failed explicit validation.
    #[error("context {index} is invalid: {reason}")]
    InvalidContext {
        /// Pool index of the context.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// A live-context index points outside the pool.
    #[error("context index {index} is out of range for a pool of {len} contexts")]
    ContextIndex {
        /// The offending index.
        index: usize,
        /// Pool size.
        len: usize,
    },

    /// A candidate array does not cover every observable.
    #[error("candidate has {actual} signs, expected {expected}")]
    CandidateSize {
        /// `4^N`.
        expected: usize,
        /// What was supplied.
        actual: usize,
    },

    /// A per-observable table could not be allocated.
    #[error("failed to allocate {entries} entries for {what}")]
    Allocation {
        /// Table being allocated.
        what: &'static str,
        /// Requested length.
        entries: usize,
    },

    /// An external tool binary could not be started.
    #[error("external tool `{}` could not be started: {source}", .tool.display())]
    ToolMissing {
        /// Program path.
        tool: PathBuf,
        /// Spawn failure.
        #[source]
        source: std::io::Error,
    },

    /// An external tool exited with an unexpected status.
    #[error("external tool `{}` exited with unexpected status {status}", .tool.display())]
    ToolStatus {
        /// Program path.
        tool: PathBuf,
        /// Raw exit status.
        status: String,
    },

    /// An external tool wrote something that cannot be parsed.
    #[error("unparsable output in {}:{line}: {text:?}", .path.display())]
    MalformedOutput {
        /// File being parsed.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// The offending line.
        text: String,
    },

    /// File I/O failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A context file line cannot be read.
    #[error("context file line {line}: {reason}")]
    MalformedContextFile {
        /// 1-based line number.
        line: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// A solution letter string cannot be decoded.
    #[error("malformed solution text: {0}")]
    MalformedSolution(String),

    /// A built-in output pattern failed to compile.
    #[error("invalid output pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Configuration is invalid or unreadable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The heuristic worker pool could not be built.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    /// A solver's claimed score disagrees with the independent checker.
    #[error("solver claimed distance {claimed} but its solution scores {actual}")]
    ScoreMismatch {
        /// Score reported by the solver.
        claimed: usize,
        /// Score from the checker.
        actual: usize,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Allocates a dense table of `len` copies of `value`, reporting allocation
/// failure instead of aborting.
pub(crate) fn dense_table<T: Clone>(what: &'static str, len: usize, value: T) -> Result<Vec<T>> {
    let mut table = Vec::new();
    table
        .try_reserve_exact(len)
        .map_err(|_| Error::Allocation { what, entries: len })?;
    table.resize(len, value);
    Ok(table)
}
