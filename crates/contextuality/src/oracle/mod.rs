//! Context sign oracle over 2×2 Gaussian-integer matrices.
//!
//! Every one-qubit Pauli matrix has entries in `{0, ±1, ±i}`, and so does any
//! product of them, so the whole computation stays in ℤ[i] without rounding.
//!
//! For a context `P¹ P² … Pᵏ` of N-qubit observables, the product factorises
//! qubit by qubit: for each qubit `q` the ordered product `P¹_q P²_q … Pᵏ_q`
//! must be a scalar multiple of the identity, and the context's sign is the
//! product of those N scalars, which must be `+1` or `-1`.
//!
//! # Matrices
//!
//! | Pauli | Matrix            |
//! |-------|-------------------|
//! | I     | `[[1, 0], [0, 1]]`  |
//! | X     | `[[0, 1], [1, 0]]`  |
//! | Y     | `[[0, -i], [i, 0]]` |
//! | Z     | `[[1, 0], [0, -1]]` |
//!
//! # Example
//!
//! ```
//! use contextuality::oracle::is_negative;
//! use contextuality::symplectic::Observable;
//!
//! let ctx = |words: [&str; 3]| words.map(|w| Observable::from_letters(w, 2).unwrap());
//!
//! // XX · ZZ · YY = -II
//! assert!(is_negative(&ctx(["XX", "ZZ", "YY"]), 2).unwrap());
//! // XI · IX · XX = +II
//! assert!(!is_negative(&ctx(["XI", "IX", "XX"]), 2).unwrap());
//! ```

use crate::error::PhaseError;
use crate::symplectic::{Observable, Pauli};

/// A Gaussian integer `re + im·i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GaussianInt {
    /// Real part.
    pub re: i32,
    /// Imaginary part.
    pub im: i32,
}

impl GaussianInt {
    /// 0
    pub const ZERO: Self = Self::new(0, 0);
    /// 1
    pub const ONE: Self = Self::new(1, 0);
    /// -1
    pub const MINUS_ONE: Self = Self::new(-1, 0);
    /// i
    pub const I: Self = Self::new(0, 1);
    /// -i
    pub const MINUS_I: Self = Self::new(0, -1);

    /// Builds `re + im·i`.
    #[inline]
    pub const fn new(re: i32, im: i32) -> Self {
        Self { re, im }
    }

    /// True for 0.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.re == 0 && self.im == 0
    }

    /// Sum.
    #[inline]
    pub const fn add(self, other: Self) -> Self {
        Self::new(self.re + other.re, self.im + other.im)
    }

    /// Product.
    #[inline]
    pub const fn mul(self, other: Self) -> Self {
        Self::new(
            self.re * other.re - self.im * other.im,
            self.re * other.im + self.im * other.re,
        )
    }

    /// Structural equality usable in `const` contexts.
    #[inline]
    pub const fn const_eq(self, other: Self) -> bool {
        self.re == other.re && self.im == other.im
    }
}

/// Row-major 2×2 matrix `[[a, b], [c, d]]` over ℤ[i].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PauliMatrix {
    /// Top left.
    pub a: GaussianInt,
    /// Top right.
    pub b: GaussianInt,
    /// Bottom left.
    pub c: GaussianInt,
    /// Bottom right.
    pub d: GaussianInt,
}

impl PauliMatrix {
    /// The identity matrix.
    pub const IDENTITY: Self = Self::new(
        GaussianInt::ONE,
        GaussianInt::ZERO,
        GaussianInt::ZERO,
        GaussianInt::ONE,
    );

    /// Builds `[[a, b], [c, d]]`.
    #[inline]
    pub const fn new(a: GaussianInt, b: GaussianInt, c: GaussianInt, d: GaussianInt) -> Self {
        Self { a, b, c, d }
    }

    /// Matrix product `self · rhs`.
    #[inline]
    pub const fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.a.mul(rhs.a).add(self.b.mul(rhs.c)),
            self.a.mul(rhs.b).add(self.b.mul(rhs.d)),
            self.c.mul(rhs.a).add(self.d.mul(rhs.c)),
            self.c.mul(rhs.b).add(self.d.mul(rhs.d)),
        )
    }

    /// The scalar `λ` if this matrix is `λ·I` with `λ ≠ 0`.
    #[inline]
    pub const fn scalar(self) -> Option<GaussianInt> {
        if self.a.const_eq(self.d) && self.b.is_zero() && self.c.is_zero() && !self.a.is_zero() {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Indexed by the two-bit code: I, X, Z, Y.
const PAULI_MATRICES: [PauliMatrix; 4] = [
    PauliMatrix::IDENTITY,
    PauliMatrix::new(
        GaussianInt::ZERO,
        GaussianInt::ONE,
        GaussianInt::ONE,
        GaussianInt::ZERO,
    ),
    PauliMatrix::new(
        GaussianInt::ONE,
        GaussianInt::ZERO,
        GaussianInt::ZERO,
        GaussianInt::MINUS_ONE,
    ),
    PauliMatrix::new(
        GaussianInt::ZERO,
        GaussianInt::MINUS_I,
        GaussianInt::I,
        GaussianInt::ZERO,
    ),
];

/// Matrix of a one-qubit Pauli operator.
#[inline]
pub const fn matrix_of(pauli: Pauli) -> PauliMatrix {
    PAULI_MATRICES[pauli as usize]
}

/// Ordered product of the points' matrices on one qubit, composed right to
/// left so the result is `P¹_q · P²_q · … · Pᵏ_q`.
#[inline]
pub fn qubit_product(points: &[Observable], qubit: u32, n_qubits: u32) -> PauliMatrix {
    points.iter().rev().fold(PauliMatrix::IDENTITY, |acc, obs| {
        matrix_of(obs.pauli_at(qubit, n_qubits)).mul(acc)
    })
}

/// Global phase of a context's operator product.
///
/// Points after the first identity sentinel are ignored.
///
/// # Errors
///
/// Returns [`PhaseError`] if some qubit's product is not a nonzero multiple
/// of the identity, or if the accumulated phase is not `±1`. Either case
/// means the context is not a valid set of commuting observables.
pub fn context_phase(points: &[Observable], n_qubits: u32) -> Result<GaussianInt, PhaseError> {
    let len = points
        .iter()
        .position(|obs| obs.is_identity())
        .unwrap_or(points.len());
    let points = &points[..len];

    let mut total = PauliMatrix::IDENTITY;
    for qubit in 0..n_qubits {
        let product = qubit_product(points, qubit, n_qubits);
        if product.scalar().is_none() {
            return Err(PhaseError::NotScalar { qubit });
        }
        total = product.mul(total);
    }

    match total.scalar() {
        Some(phase) if phase == GaussianInt::ONE || phase == GaussianInt::MINUS_ONE => Ok(phase),
        Some(phase) => Err(PhaseError::NotReal {
            re: phase.re,
            im: phase.im,
        }),
        None => Err(PhaseError::NotScalar { qubit: n_qubits }),
    }
}

/// True iff the context's ordered product is `-I`.
///
/// # Errors
///
/// See [`context_phase`].
pub fn is_negative(points: &[Observable], n_qubits: u32) -> Result<bool, PhaseError> {
    Ok(context_phase(points, n_qubits)? == GaussianInt::MINUS_ONE)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ctx(words: &[&str]) -> Vec<Observable> {
        words
            .iter()
            .map(|w| Observable::from_letters(w, w.len() as u32).unwrap())
            .collect()
    }

    #[test]
    fn pauli_squares_are_identity() {
        for p in Pauli::ALL {
            let m = matrix_of(p);
            assert_eq!(m.mul(m), PauliMatrix::IDENTITY, "{p:?}");
        }
    }

    #[test]
    fn xy_is_iz() {
        let xy = matrix_of(Pauli::X).mul(matrix_of(Pauli::Y));
        let iz = PauliMatrix::new(
            GaussianInt::I,
            GaussianInt::ZERO,
            GaussianInt::ZERO,
            GaussianInt::MINUS_I,
        );
        assert_eq!(xy, iz);
    }

    #[test]
    fn mermin_square_rows_and_columns() {
        // Every row and column of the Mermin square is positive except the
        // column XX, ZZ, YY.
        let positive = [
            ["XI", "IX", "XX"],
            ["IZ", "ZI", "ZZ"],
            ["XZ", "ZX", "YY"],
            ["XI", "IZ", "XZ"],
            ["IX", "ZI", "ZX"],
        ];
        for line in positive {
            assert!(!is_negative(&ctx(&line), 2).unwrap(), "{line:?}");
        }
        assert!(is_negative(&ctx(&["XX", "ZZ", "YY"]), 2).unwrap());
    }

    #[test]
    fn sentinel_truncates_context() {
        let mut points = ctx(&["XX", "ZZ", "YY"]);
        points.push(Observable::IDENTITY);
        points.push(Observable::new(0b0001));
        assert!(is_negative(&points, 2).unwrap());
    }

    #[test]
    fn anticommuting_points_are_rejected() {
        // X · Z is not a multiple of the identity
        let err = is_negative(&ctx(&["X", "Z"]), 1).unwrap_err();
        assert_eq!(err, PhaseError::NotScalar { qubit: 0 });
    }

    #[test]
    fn imaginary_phase_is_rejected() {
        // X · Y · Z = i·I on a single qubit
        let err = is_negative(&ctx(&["X", "Y", "Z"]), 1).unwrap_err();
        assert_eq!(err, PhaseError::NotReal { re: 0, im: 1 });
    }
}
