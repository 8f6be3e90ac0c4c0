//! Contextuality degree of Pauli-observable configurations.
//!
//! A configuration is a set of *contexts*: small sets of pairwise commuting
//! N-qubit Pauli observables whose ordered product is `+I` or `-I`. A
//! classical ±1 assignment of the observables satisfies a context when the
//! product of its signs matches that quantum sign. The *contextuality
//! degree* is the least number of contexts any classical assignment must
//! violate.
//!
//! # Layers
//!
//! | Module | Role |
//! |--------|------|
//! | [`symplectic`] | bit-vector observables, commutation, quadratic form, transvection |
//! | [`oracle`] | exact context signs over 2×2 Gaussian-integer matrices |
//! | [`assignment`] | context pools, live subsets, cached signs, scoring |
//! | [`solver`] | exact SAT bound tightening, parallel local search, the engine |
//! | [`config`] | TOML-loadable solver settings |
//!
//! # Example
//!
//! ```
//! use contextuality::assignment::{parse_contexts, Candidate, QuantumAssignment};
//!
//! let (pool, n) = parse_contexts(
//!     "XI,IX,XX\nIZ,ZI,ZZ\nXZ,ZX,YY\nXI,IZ,XZ\nIX,ZI,ZX\nXX,ZZ,YY\n",
//! )
//! .unwrap();
//! let qa = QuantumAssignment::new(&pool, n).unwrap();
//! assert_eq!(qa.negative_count().unwrap(), 1);
//!
//! let positive = Candidate::all_positive(n).unwrap();
//! assert_eq!(qa.score(&positive).unwrap(), 1);
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod assignment;
pub mod cancel;
pub mod config;
pub mod error;
pub mod oracle;
pub mod solver;
pub mod symplectic;

pub use assignment::{Candidate, ContextPool, QuantumAssignment};
pub use cancel::CancelFlag;
pub use config::DegreeConfig;
pub use error::{Error, PhaseError, Result};
pub use solver::{DegreeEngine, DegreeOutcome, SolverChoice};
pub use symplectic::Observable;
