//! Per-context listing of a candidate against the quantum signs.

use std::fmt;

use serde::Serialize;

use super::{Candidate, QuantumAssignment};
use crate::error::Result;

/// One observable of a reported context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportedPoint {
    /// Qubit-letter form.
    pub observable: String,
    /// Classical sign under the candidate.
    pub negative: bool,
}

/// One live context of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextRow {
    /// Points with their classical signs.
    pub points: Vec<ReportedPoint>,
    /// Quantum sign of the context.
    pub quantum_negative: bool,
    /// XOR of the classical signs.
    pub classical_negative: bool,
    /// Whether the two agree.
    pub valid: bool,
    /// Invalid contexts up to and including this one.
    pub running_distance: usize,
}

/// A candidate checked context by context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    /// Rows in live-context order.
    pub contexts: Vec<ContextRow>,
    /// Number of negative contexts.
    pub negative_contexts: usize,
    /// Hamming distance of the candidate.
    pub distance: usize,
}

impl ScoreReport {
    pub(super) fn build(qa: &QuantumAssignment<'_>, candidate: &Candidate) -> Result<Self> {
        let negativity = qa.negativity()?;
        let n = qa.n_qubits();
        let mut distance = 0;
        let contexts = qa
            .contexts()
            .zip(negativity)
            .map(|(points, &quantum_negative)| {
                let classical_negative = candidate.parity(points);
                let valid = classical_negative == quantum_negative;
                if !valid {
                    distance += 1;
                }
                ContextRow {
                    points: points
                        .iter()
                        .map(|&obs| ReportedPoint {
                            observable: obs.letters(n),
                            negative: candidate.sign(obs),
                        })
                        .collect(),
                    quantum_negative,
                    classical_negative,
                    valid,
                    running_distance: distance,
                }
            })
            .collect();
        Ok(Self {
            contexts,
            negative_contexts: negativity.iter().filter(|&&neg| neg).count(),
            distance,
        })
    }
}

fn sign(negative: bool) -> &'static str {
    if negative {
        "-1"
    } else {
        "+1"
    }
}

impl fmt::Display for ScoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "context => quantum / classical")?;
        for row in &self.contexts {
            for point in &row.points {
                write!(f, "{}({})", point.observable, sign(point.negative))?;
            }
            write!(
                f,
                "  =>  {} / {} : {}",
                sign(row.quantum_negative),
                sign(row.classical_negative),
                if row.valid { "valid" } else { "invalid" }
            )?;
            if !row.valid {
                write!(f, " {}", row.running_distance)?;
            }
            writeln!(f)?;
        }
        writeln!(f)?;
        writeln!(f, "negative contexts: {}", self.negative_contexts)?;
        write!(f, "Hamming distance: {}", self.distance)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::assignment::isotropic_lines;
    use crate::symplectic::Observable;

    #[test]
    fn report_matches_score() {
        let pool = isotropic_lines(2).unwrap();
        let qa = QuantumAssignment::new(&pool, 2).unwrap();
        let mut candidate = Candidate::all_positive(2).unwrap();
        candidate.flip(Observable::new(5));
        let report = qa.report(&candidate).unwrap();
        assert_eq!(report.distance, qa.score(&candidate).unwrap());
        assert_eq!(report.negative_contexts, 3);
        assert_eq!(report.contexts.len(), 15);
        let last_invalid = report.contexts.iter().rev().find(|r| !r.valid);
        assert_eq!(last_invalid.map(|r| r.running_distance), Some(report.distance));
    }

    #[test]
    fn display_lists_every_context() {
        let pool = isotropic_lines(2).unwrap();
        let qa = QuantumAssignment::new(&pool, 2).unwrap();
        let report = qa.report(&Candidate::all_positive(2).unwrap()).unwrap();
        let text = report.to_string();
        assert_eq!(text.matches("=>").count(), 16);
        assert!(text.ends_with("Hamming distance: 3"));
    }
}
