//! Observable → live-context incidence in compressed-row form.

use super::QuantumAssignment;
use crate::error::{dense_table, Error, Result};
use crate::symplectic::Observable;

/// For every observable word, the live contexts that contain it.
///
/// Built once per solve and shared read-only by every heuristic worker.
#[derive(Debug, Clone)]
pub struct Incidence {
    offsets: Vec<usize>,
    contexts: Vec<u32>,
    max_degree: usize,
}

impl Incidence {
    /// Counts, prefix-sums, then fills.
    ///
    /// # Errors
    ///
    /// [`Error::Allocation`] if the `4^N` offset table cannot be reserved or
    /// a context index does not fit the `u32` entries.
    pub fn build(qa: &QuantumAssignment<'_>) -> Result<Self> {
        let words = qa.observable_count();
        let mut offsets = dense_table("incidence offsets", words + 1, 0usize)?;
        for points in qa.contexts() {
            for obs in points {
                offsets[obs.index() + 1] += 1;
            }
        }
        let mut max_degree = 0;
        for w in 0..words {
            max_degree = max_degree.max(offsets[w + 1]);
            offsets[w + 1] += offsets[w];
        }

        let total = offsets[words];
        let mut contexts = dense_table("incidence entries", total, 0u32)?;
        let mut cursor = offsets.clone();
        for (c, points) in qa.contexts().enumerate() {
            let c = u32::try_from(c).map_err(|_| Error::Allocation {
                what: "incidence entries",
                entries: total,
            })?;
            for obs in points {
                let slot = &mut cursor[obs.index()];
                contexts[*slot] = c;
                *slot += 1;
            }
        }
        Ok(Self {
            offsets,
            contexts,
            max_degree,
        })
    }

    /// Live contexts containing `obs`.
    #[inline]
    pub fn contexts_of(&self, obs: Observable) -> &[u32] {
        let i = obs.index();
        match (self.offsets.get(i), self.offsets.get(i + 1)) {
            (Some(&lo), Some(&hi)) => &self.contexts[lo..hi],
            _ => &[],
        }
    }

    /// Largest number of contexts on one observable.
    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    /// Number of observable words covered.
    pub fn words(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }
}
