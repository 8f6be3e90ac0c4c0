//! Boolean-circuit text for the translator.
//!
//! ```text
//! BC1.1
//! ASSIGN [5,6](EVEN(v2,v1,v3)
//! ,ODD(v3,v12,v15)
//! );
//! ```
//!
//! Each context becomes an `EVEN`/`ODD` gate over variables `v<word>`; the
//! cardinality envelope requires at least `contexts - bound` of them to hold.

use crate::assignment::QuantumAssignment;
use crate::error::Result;

/// Header token of the circuit format.
pub const HEADER: &str = "BC1.1";

/// Circuit asking for a sign assignment that violates at most `bound`
/// contexts. `bound = None` drops the envelope: every context must hold.
///
/// # Errors
///
/// Propagates sign errors from the assignment.
pub fn write_problem(qa: &QuantumAssignment<'_>, bound: Option<usize>) -> Result<String> {
    let negativity = qa.negativity()?;
    let total = qa.len();
    let mut out = String::with_capacity(16 + total * 24);
    out.push_str(HEADER);
    out.push('\n');
    out.push_str("ASSIGN ");
    if let Some(bound) = bound {
        out.push_str(&format!("[{},{}](", total.saturating_sub(bound), total));
    }
    for (i, (points, &negative)) in qa.contexts().zip(negativity).enumerate() {
        if i != 0 {
            out.push(',');
        }
        if points.is_empty() {
            out.push_str("T\n");
            continue;
        }
        out.push_str(if negative { "ODD(" } else { "EVEN(" });
        for (j, obs) in points.iter().enumerate() {
            if j != 0 {
                out.push(',');
            }
            out.push('v');
            out.push_str(&obs.bits().to_string());
        }
        out.push_str(")\n");
    }
    if bound.is_some() {
        out.push(')');
    }
    out.push(';');
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::assignment::ContextPool;
    use crate::symplectic::Observable;

    fn pool() -> ContextPool {
        let ctx = |words: [&str; 3]| -> Vec<Observable> {
            words
                .iter()
                .map(|w| Observable::from_letters(w, 2).unwrap())
                .collect()
        };
        let mut pool = ContextPool::from_rows(&[ctx(["XI", "IX", "XX"]), ctx(["XX", "ZZ", "YY"])]);
        pool.push(&[]).unwrap();
        pool
    }

    #[test]
    fn envelope_bounds_satisfied_contexts() {
        let pool = pool();
        let qa = QuantumAssignment::with_indices(&pool, vec![0, 1], 2).unwrap();
        let text = write_problem(&qa, Some(1)).unwrap();
        assert_eq!(
            text,
            "BC1.1\nASSIGN [1,2](EVEN(v2,v1,v3)\n,ODD(v3,v12,v15)\n);"
        );
    }

    #[test]
    fn plain_problem_has_no_envelope() {
        let pool = pool();
        let qa = QuantumAssignment::new(&pool, 2).unwrap();
        let text = write_problem(&qa, None).unwrap();
        assert_eq!(
            text,
            "BC1.1\nASSIGN EVEN(v2,v1,v3)\n,ODD(v3,v12,v15)\n,T\n;"
        );
    }
}
