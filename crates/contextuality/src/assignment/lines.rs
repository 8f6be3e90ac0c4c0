//! Totally isotropic lines of the symplectic polar space.

use super::ContextPool;
use crate::error::{Error, Result};
use crate::symplectic::{check_qubits, commute, observable_count, Observable};

/// Every line `{a, b, a·b}` of pairwise commuting, non-identity N-qubit
/// observables, each listed once with `a < b < a·b`.
///
/// There are 15 lines for two qubits and 315 for three.
///
/// # Errors
///
/// [`Error::QubitCount`] for an unsupported qubit count, and
/// [`Error::Allocation`] when the lines do not fit in memory.
pub fn isotropic_lines(n_qubits: u32) -> Result<ContextPool> {
    check_qubits(n_qubits)?;
    let count = line_count(n_qubits);
    let too_large = || Error::Allocation {
        what: "isotropic lines",
        entries: usize::try_from(count).unwrap_or(usize::MAX),
    };
    let mut pool = ContextPool::new(3);
    pool.try_reserve(usize::try_from(count).map_err(|_| too_large())?)?;
    let words = u32::try_from(observable_count(n_qubits)).map_err(|_| too_large())?;
    for a in 1..words {
        for b in a + 1..words {
            let (a, b) = (Observable::new(a), Observable::new(b));
            let c = a.product(b);
            if c > b && commute(a, b, n_qubits) {
                pool.push(&[a, b, c])?;
            }
        }
    }
    Ok(pool)
}

/// `(4^N - 1)(4^(N-1) - 1) / 3`, the number of lines of the polar space.
fn line_count(n_qubits: u32) -> u128 {
    let points = (1u128 << (2 * n_qubits)) - 1;
    let per_point = (1u128 << (2 * n_qubits - 2)) - 1;
    points * per_point / 3
}
