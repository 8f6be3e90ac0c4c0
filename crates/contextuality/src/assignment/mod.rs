//! Quantum assignments: a pool of contexts, the live subset, and their signs.
//!
//! A [`ContextPool`] stores contexts in one flat buffer with a fixed number
//! of slots per context; unused slots hold the identity sentinel. A
//! [`QuantumAssignment`] borrows a pool, selects the live contexts by index,
//! and caches each live context's quantum sign ("negativity") on first use.
//!
//! # Scoring
//!
//! A classical sign assignment ([`Candidate`]) gives every observable a bit.
//! A context is *valid* under a candidate when the XOR of its points' bits
//! equals its quantum sign. [`QuantumAssignment::score`] counts the invalid
//! live contexts; it is the single ground truth both solvers are checked
//! against, and the all-positive candidate scores exactly
//! [`QuantumAssignment::negative_count`].
//!
//! # Example
//!
//! ```
//! use contextuality::assignment::{isotropic_lines, Candidate, QuantumAssignment};
//!
//! let doily = isotropic_lines(2).unwrap();
//! let qa = QuantumAssignment::new(&doily, 2).unwrap();
//! assert_eq!(qa.len(), 15);
//!
//! let positive = Candidate::all_positive(2).unwrap();
//! assert_eq!(qa.score(&positive).unwrap(), qa.negative_count().unwrap());
//! ```

mod candidate;
mod incidence;
mod io;
mod lines;
mod report;

pub use candidate::Candidate;
pub use incidence::Incidence;
pub use io::{parse_contexts, read_contexts, write_contexts};
pub use lines::isotropic_lines;
pub use report::{ContextRow, ReportedPoint, ScoreReport};

use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::oracle;
use crate::symplectic::{check_qubits, commute, observable_count, Observable};

/// Flat, fixed-stride storage of contexts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextPool {
    points_per_context: usize,
    points: Vec<Observable>,
}

impl ContextPool {
    /// Empty pool with `points_per_context` slots per context.
    pub fn new(points_per_context: usize) -> Self {
        Self {
            points_per_context,
            points: Vec::new(),
        }
    }

    /// Builds a pool whose stride is the longest row; shorter rows are padded
    /// with the identity sentinel.
    pub fn from_rows<R: AsRef<[Observable]>>(rows: &[R]) -> Self {
        let stride = rows.iter().map(|r| r.as_ref().len()).max().unwrap_or(0);
        let mut pool = Self::new(stride);
        pool.points.reserve(stride * rows.len());
        for row in rows {
            let row = row.as_ref();
            pool.points.extend_from_slice(row);
            pool.points
                .extend(std::iter::repeat(Observable::IDENTITY).take(stride - row.len()));
        }
        pool
    }

    /// Wraps an existing flat buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidContext`] if the buffer length is not a
    /// multiple of `points_per_context`, or the stride is zero for a
    /// non-empty buffer.
    pub fn from_flat(points: Vec<Observable>, points_per_context: usize) -> Result<Self> {
        if points_per_context == 0 && !points.is_empty() {
            return Err(Error::InvalidContext {
                index: 0,
                reason: "zero points per context".into(),
            });
        }
        if points_per_context != 0 && points.len() % points_per_context != 0 {
            return Err(Error::InvalidContext {
                index: points.len() / points_per_context,
                reason: format!(
                    "buffer of {} points is not a multiple of {points_per_context}",
                    points.len()
                ),
            });
        }
        Ok(Self {
            points_per_context,
            points,
        })
    }

    /// Appends a context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidContext`] if it has more points than the stride.
    pub fn push(&mut self, context: &[Observable]) -> Result<()> {
        if context.len() > self.points_per_context {
            return Err(Error::InvalidContext {
                index: self.len(),
                reason: format!(
                    "{} points exceed the capacity of {}",
                    context.len(),
                    self.points_per_context
                ),
            });
        }
        self.points.extend_from_slice(context);
        self.points.extend(
            std::iter::repeat(Observable::IDENTITY).take(self.points_per_context - context.len()),
        );
        Ok(())
    }

    /// Reserves room for `contexts` more contexts.
    ///
    /// # Errors
    ///
    /// [`Error::Allocation`] if the buffer cannot grow that far.
    pub fn try_reserve(&mut self, contexts: usize) -> Result<()> {
        let too_large = || Error::Allocation {
            what: "context pool",
            entries: contexts,
        };
        let slots = contexts
            .checked_mul(self.points_per_context)
            .ok_or_else(too_large)?;
        self.points.try_reserve_exact(slots).map_err(|_| too_large())
    }

    /// Slots per context.
    pub fn points_per_context(&self) -> usize {
        self.points_per_context
    }

    /// Number of contexts.
    pub fn len(&self) -> usize {
        if self.points_per_context == 0 {
            0
        } else {
            self.points.len() / self.points_per_context
        }
    }

    /// True if the pool holds no contexts.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Points of context `index`, cut at the first identity sentinel.
    pub fn get(&self, index: usize) -> Option<&[Observable]> {
        if index >= self.len() {
            return None;
        }
        let start = index * self.points_per_context;
        let slots = &self.points[start..start + self.points_per_context];
        let len = slots
            .iter()
            .position(|obs| obs.is_identity())
            .unwrap_or(slots.len());
        Some(&slots[..len])
    }

    /// Iterates over all contexts, sentinel-trimmed.
    pub fn iter(&self) -> impl Iterator<Item = &[Observable]> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Checks that every context is a set of distinct, pairwise commuting
    /// observables on `n_qubits` qubits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidContext`] for the first offending context.
    pub fn validate(&self, n_qubits: u32) -> Result<()> {
        check_qubits(n_qubits)?;
        let limit = observable_count(n_qubits);
        for (index, context) in self.iter().enumerate() {
            let invalid = |reason: String| Error::InvalidContext { index, reason };
            for (i, &a) in context.iter().enumerate() {
                if a.index() >= limit {
                    return Err(invalid(format!(
                        "word {:#x} does not fit {n_qubits} qubits",
                        a.bits()
                    )));
                }
                for &b in &context[i + 1..] {
                    if a == b {
                        return Err(invalid(format!(
                            "{} appears twice",
                            a.display(n_qubits)
                        )));
                    }
                    if !commute(a, b, n_qubits) {
                        return Err(invalid(format!(
                            "{} and {} anticommute",
                            a.display(n_qubits),
                            b.display(n_qubits)
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// The live contexts of a pool, with their cached quantum signs.
#[derive(Debug)]
pub struct QuantumAssignment<'p> {
    pool: &'p ContextPool,
    indices: Vec<usize>,
    n_qubits: u32,
    negativity: OnceLock<Vec<bool>>,
}

impl<'p> QuantumAssignment<'p> {
    /// Every context of `pool` is live.
    ///
    /// # Errors
    ///
    /// See [`QuantumAssignment::with_indices`].
    pub fn new(pool: &'p ContextPool, n_qubits: u32) -> Result<Self> {
        Self::with_indices(pool, (0..pool.len()).collect(), n_qubits)
    }

    /// Only the contexts at `indices` are live, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QubitCount`] for an unsupported qubit count,
    /// [`Error::ContextIndex`] for an index outside the pool, and
    /// [`Error::InvalidContext`] if a live point does not fit `n_qubits` or
    /// appears twice in its context.
    pub fn with_indices(pool: &'p ContextPool, indices: Vec<usize>, n_qubits: u32) -> Result<Self> {
        check_qubits(n_qubits)?;
        let limit = observable_count(n_qubits);
        for &index in &indices {
            let context = pool.get(index).ok_or(Error::ContextIndex {
                index,
                len: pool.len(),
            })?;
            if let Some(obs) = context.iter().find(|obs| obs.index() >= limit) {
                return Err(Error::InvalidContext {
                    index,
                    reason: format!("word {:#x} does not fit {n_qubits} qubits", obs.bits()),
                });
            }
            // Incremental scoring counts each incidence once per point.
            for (i, obs) in context.iter().enumerate() {
                if context[i + 1..].contains(obs) {
                    return Err(Error::InvalidContext {
                        index,
                        reason: format!("{} appears twice", obs.display(n_qubits)),
                    });
                }
            }
        }
        Ok(Self {
            pool,
            indices,
            n_qubits,
            negativity: OnceLock::new(),
        })
    }

    /// Qubit count.
    pub fn n_qubits(&self) -> u32 {
        self.n_qubits
    }

    /// The borrowed pool.
    pub fn pool(&self) -> &'p ContextPool {
        self.pool
    }

    /// Pool indices of the live contexts.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of live contexts.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True if no context is live.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Size of a per-observable table, `4^N`.
    pub fn observable_count(&self) -> usize {
        observable_count(self.n_qubits)
    }

    /// Points of live context `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`.
    pub fn context(&self, i: usize) -> &'p [Observable] {
        let pool: &'p ContextPool = self.pool;
        match pool.get(self.indices[i]) {
            Some(points) => points,
            None => unreachable!("live indices are checked at construction"),
        }
    }

    /// Iterates over the live contexts.
    pub fn contexts(&self) -> impl Iterator<Item = &'p [Observable]> + '_ {
        (0..self.len()).map(move |i| self.context(i))
    }

    /// Quantum sign of every live context, computed once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Phase`] if a context's product is not `±I`.
    pub fn negativity(&self) -> Result<&[bool]> {
        if let Some(cached) = self.negativity.get() {
            return Ok(cached);
        }
        let computed = self
            .contexts()
            .enumerate()
            .map(|(context, points)| {
                oracle::is_negative(points, self.n_qubits)
                    .map_err(|source| Error::Phase { context, source })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.negativity.get_or_init(|| computed))
    }

    /// Drops the cached signs so the next read recomputes them.
    pub fn invalidate_negativity(&mut self) {
        self.negativity.take();
    }

    /// Number of negative live contexts: the score of the all-positive
    /// candidate and the starting bound of the exact search.
    ///
    /// # Errors
    ///
    /// See [`QuantumAssignment::negativity`].
    pub fn negative_count(&self) -> Result<usize> {
        Ok(self.negativity()?.iter().filter(|&&neg| neg).count())
    }

    /// Hamming distance between the candidate's context parities and the
    /// quantum signs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CandidateSize`] if the candidate does not have `4^N`
    /// signs, or a sign error from [`QuantumAssignment::negativity`].
    pub fn score(&self, candidate: &Candidate) -> Result<usize> {
        self.check_candidate(candidate)?;
        let negativity = self.negativity()?;
        Ok(self
            .contexts()
            .zip(negativity)
            .filter(|(points, &neg)| candidate.parity(points) != neg)
            .count())
    }

    /// Largest number of live contexts sharing one observable.
    ///
    /// # Errors
    ///
    /// [`Error::Allocation`] if the `4^N` count table cannot be reserved.
    pub fn max_contexts_per_observable(&self) -> Result<usize> {
        let mut counts = crate::error::dense_table("context counts", self.observable_count(), 0usize)?;
        let mut max = 0;
        for points in self.contexts() {
            for obs in points {
                let count = &mut counts[obs.index()];
                *count += 1;
                max = max.max(*count);
            }
        }
        Ok(max)
    }

    /// The assignment of the live contexts that `candidate` satisfies
    /// (`valid = true`) or violates (`valid = false`).
    ///
    /// # Errors
    ///
    /// Same as [`QuantumAssignment::score`].
    pub fn restrict_by_validity(&self, candidate: &Candidate, valid: bool) -> Result<Self> {
        self.check_candidate(candidate)?;
        let negativity = self.negativity()?;
        let mut indices = Vec::new();
        let mut signs = Vec::new();
        for (i, points) in self.contexts().enumerate() {
            if (candidate.parity(points) == negativity[i]) == valid {
                indices.push(self.indices[i]);
                signs.push(negativity[i]);
            }
        }
        Ok(Self {
            pool: self.pool,
            indices,
            n_qubits: self.n_qubits,
            negativity: OnceLock::from(signs),
        })
    }

    /// Per-context listing of a candidate against the quantum signs.
    ///
    /// # Errors
    ///
    /// Same as [`QuantumAssignment::score`].
    pub fn report(&self, candidate: &Candidate) -> Result<ScoreReport> {
        self.check_candidate(candidate)?;
        ScoreReport::build(self, candidate)
    }

    /// `2·degree / contexts`, the normalised distance quoted with a degree.
    pub fn epsilon(&self, degree: usize) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            2.0 * degree as f64 / self.len() as f64
        }
    }

    fn check_candidate(&self, candidate: &Candidate) -> Result<()> {
        if candidate.len() == self.observable_count() {
            Ok(())
        } else {
            Err(Error::CandidateSize {
                expected: self.observable_count(),
                actual: candidate.len(),
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn grid_pool() -> ContextPool {
        let rows = [
            ["XI", "IX", "XX"],
            ["IZ", "ZI", "ZZ"],
            ["XZ", "ZX", "YY"],
            ["XI", "IZ", "XZ"],
            ["IX", "ZI", "ZX"],
            ["XX", "ZZ", "YY"],
        ];
        let rows: Vec<Vec<Observable>> = rows
            .iter()
            .map(|r| r.iter().map(|w| Observable::from_letters(w, 2).unwrap()).collect())
            .collect();
        ContextPool::from_rows(&rows)
    }

    #[test]
    fn pool_pads_short_rows() {
        let a = Observable::new(1);
        let b = Observable::new(2);
        let pool = ContextPool::from_rows(&[vec![a, b, a.product(b)], vec![a]]);
        assert_eq!(pool.points_per_context(), 3);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(1), Some(&[a][..]));
        assert_eq!(pool.get(2), None);
    }

    #[test]
    fn push_rejects_oversized_context() {
        let mut pool = ContextPool::new(2);
        let obs = Observable::new(1);
        assert!(pool.push(&[obs, obs]).is_ok());
        assert!(matches!(
            pool.push(&[obs, obs, obs]),
            Err(Error::InvalidContext { index: 1, .. })
        ));
    }

    #[test]
    fn from_flat_checks_stride() {
        let points = vec![Observable::new(1); 5];
        assert!(ContextPool::from_flat(points.clone(), 5).is_ok());
        assert!(ContextPool::from_flat(points, 3).is_err());
    }

    #[test]
    fn grid_has_one_negative_context() {
        let pool = grid_pool();
        let qa = QuantumAssignment::new(&pool, 2).unwrap();
        assert_eq!(qa.negativity().unwrap(), &[false, false, false, false, false, true]);
        assert_eq!(qa.negative_count().unwrap(), 1);
    }

    #[test]
    fn all_positive_scores_negative_count() {
        let pool = grid_pool();
        let qa = QuantumAssignment::new(&pool, 2).unwrap();
        let candidate = Candidate::all_positive(2).unwrap();
        assert_eq!(qa.score(&candidate).unwrap(), 1);
    }

    #[test]
    fn flipping_a_shared_point_moves_the_violation() {
        let pool = grid_pool();
        let qa = QuantumAssignment::new(&pool, 2).unwrap();
        let mut candidate = Candidate::all_positive(2).unwrap();
        // YY sits on the third row and the negative column
        candidate.flip(Observable::from_letters("YY", 2).unwrap());
        assert_eq!(qa.score(&candidate).unwrap(), 1);
        let violated = qa.restrict_by_validity(&candidate, false).unwrap();
        assert_eq!(violated.indices(), &[2]);
        let satisfied = qa.restrict_by_validity(&candidate, true).unwrap();
        assert_eq!(satisfied.len(), 5);
        assert_eq!(satisfied.negative_count().unwrap(), 1);
    }

    #[test]
    fn sparse_indices_select_contexts() {
        let pool = grid_pool();
        let qa = QuantumAssignment::with_indices(&pool, vec![5, 0], 2).unwrap();
        assert_eq!(qa.negativity().unwrap(), &[true, false]);
        assert!(matches!(
            QuantumAssignment::with_indices(&pool, vec![6], 2),
            Err(Error::ContextIndex { index: 6, len: 6 })
        ));
    }

    #[test]
    fn wrong_candidate_size_is_rejected() {
        let pool = grid_pool();
        let qa = QuantumAssignment::new(&pool, 2).unwrap();
        let candidate = Candidate::all_positive(3).unwrap();
        assert!(matches!(
            qa.score(&candidate),
            Err(Error::CandidateSize {
                expected: 16,
                actual: 64
            })
        ));
    }

    #[test]
    fn anticommuting_context_is_a_phase_error() {
        let x = Observable::from_letters("XI", 2).unwrap();
        let z = Observable::from_letters("ZI", 2).unwrap();
        let pool = ContextPool::from_rows(&[vec![x, z, x.product(z)]]);
        let qa = QuantumAssignment::new(&pool, 2).unwrap();
        assert!(matches!(qa.negativity(), Err(Error::Phase { context: 0, .. })));
        assert!(matches!(pool.validate(2), Err(Error::InvalidContext { index: 0, .. })));
    }

    #[test]
    fn repeated_point_is_rejected() {
        let xx = Observable::from_letters("XX", 2).unwrap();
        let mut rows: Vec<Vec<Observable>> = grid_pool().iter().map(<[_]>::to_vec).collect();
        rows.push(vec![xx, xx]);
        let pool = ContextPool::from_rows(&rows);
        assert!(matches!(
            QuantumAssignment::new(&pool, 2),
            Err(Error::InvalidContext { index: 6, .. })
        ));
        assert!(QuantumAssignment::with_indices(&pool, (0..6).collect(), 2).is_ok());
    }

    #[test]
    fn grid_validates() {
        assert!(grid_pool().validate(2).is_ok());
    }

    #[test]
    fn grid_incidence_is_two() {
        let pool = grid_pool();
        let qa = QuantumAssignment::new(&pool, 2).unwrap();
        assert_eq!(qa.max_contexts_per_observable().unwrap(), 2);
        assert!((qa.epsilon(1) - 2.0 / 6.0).abs() < 1e-12);
    }
}
