//! Symplectic bit-vector algebra for N-qubit Pauli observables.
//!
//! An observable `P₁ ⊗ P₂ ⊗ … ⊗ P_N` is stored as a `2N`-bit word. The
//! high `N` bits are the Z-part and the low `N` bits are the X-part; qubit 0
//! is the most significant bit of each half.
//!
//! # Encoding
//!
//! | Pauli | Z bit | X bit |
//! |-------|-------|-------|
//! | I     | 0     | 0     |
//! | X     | 0     | 1     |
//! | Z     | 1     | 0     |
//! | Y     | 1     | 1     |
//!
//! ```text
//! 2 qubits, word 0bRS_TU: RS is the Z-part, TU is the X-part
//! 0b0000 =  0 → II (identity, reserved as the end-of-context sentinel)
//! 0b0110 =  6 → XZ
//! 0b1111 = 15 → YY
//! ```
//!
//! Multiplying two observables is XOR on the words (up to a phase, which the
//! sign oracle tracks separately). Two observables commute iff their
//! symplectic inner product is 0.
//!
//! # Example
//!
//! ```
//! use contextuality::symplectic::{inner_product, Observable};
//!
//! let xx = Observable::from_letters("XX", 2).unwrap();
//! let zz = Observable::from_letters("ZZ", 2).unwrap();
//! let zi = Observable::from_letters("ZI", 2).unwrap();
//!
//! assert_eq!(inner_product(xx, zz, 2), 0); // XX and ZZ commute
//! assert_eq!(inner_product(xx, zi, 2), 1); // XX and ZI anticommute
//! assert_eq!(xx.product(zz).letters(2), "YY");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest supported qubit count: a `2N`-bit word must fit in `u32`.
pub const MAX_QUBITS: u32 = 16;

/// A one-qubit Pauli operator, valued by its (Z bit, X bit) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Pauli {
    /// Identity.
    I = 0b00,
    /// Bit flip.
    X = 0b01,
    /// Phase flip.
    Z = 0b10,
    /// `Y = iXZ`.
    Y = 0b11,
}

impl Pauli {
    /// All four operators in letter order.
    pub const ALL: [Self; 4] = [Self::I, Self::X, Self::Y, Self::Z];

    /// Two-bit code `(z << 1) | x`.
    #[inline]
    pub const fn bits(self) -> u32 {
        self as u32
    }

    /// Operator for a two-bit code; higher bits are ignored.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        match bits & 0b11 {
            0b00 => Self::I,
            0b01 => Self::X,
            0b10 => Self::Z,
            _ => Self::Y,
        }
    }

    /// Qubit letter of the operator.
    #[inline]
    pub const fn letter(self) -> char {
        match self {
            Self::I => 'I',
            Self::X => 'X',
            Self::Y => 'Y',
            Self::Z => 'Z',
        }
    }

    /// Operator for a qubit letter.
    #[inline]
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'I' => Some(Self::I),
            'X' => Some(Self::X),
            'Y' => Some(Self::Y),
            'Z' => Some(Self::Z),
            _ => None,
        }
    }
}

/// An N-qubit Pauli observable in symplectic encoding.
///
/// The qubit count is not stored; every operation that depends on it takes
/// it as a parameter, and the owning assignment guarantees it is consistent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Observable(u32);

impl Observable {
    /// The identity, used as the "no more points" sentinel inside contexts.
    pub const IDENTITY: Self = Self(0);

    /// Wraps a raw symplectic word.
    #[inline]
    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw symplectic word.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Dense table index of this observable (its word).
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// True for the identity sentinel.
    #[inline]
    pub const fn is_identity(self) -> bool {
        self.0 == 0
    }

    /// The Z-part (high `n_qubits` bits).
    #[inline]
    pub const fn z_part(self, n_qubits: u32) -> u32 {
        self.0 >> n_qubits
    }

    /// The X-part (low `n_qubits` bits).
    #[inline]
    pub const fn x_part(self, n_qubits: u32) -> u32 {
        self.0 & mask(n_qubits)
    }

    /// Joins a Z-part and an X-part into one observable.
    #[inline]
    pub const fn from_parts(z: u32, x: u32, n_qubits: u32) -> Self {
        Self((z << n_qubits) | (x & mask(n_qubits)))
    }

    /// Operator product modulo phase (XOR of the words).
    #[inline]
    pub const fn product(self, other: Self) -> Self {
        Self(self.0 ^ other.0)
    }

    /// The one-qubit operator acting on `qubit` (0 is the leftmost letter).
    ///
    /// ```
    /// use contextuality::symplectic::{Observable, Pauli};
    ///
    /// let obs = Observable::from_letters("IXZZ", 4).unwrap();
    /// assert_eq!(obs.pauli_at(1, 4), Pauli::X);
    /// assert_eq!(obs.pauli_at(3, 4), Pauli::Z);
    /// ```
    #[inline]
    pub const fn pauli_at(self, qubit: u32, n_qubits: u32) -> Pauli {
        let shift = n_qubits - qubit - 1;
        let x = (self.x_part(n_qubits) >> shift) & 1;
        let z = (self.z_part(n_qubits) >> shift) & 1;
        Pauli::from_bits((z << 1) | x)
    }

    /// Copy of this observable with `qubit` replaced by `pauli`.
    #[inline]
    pub const fn with_pauli(self, qubit: u32, pauli: Pauli, n_qubits: u32) -> Self {
        let shift = n_qubits - qubit - 1;
        let cleared = self.0 & !(1 << shift) & !(1 << (shift + n_qubits));
        let z = (pauli.bits() >> 1) << (shift + n_qubits);
        let x = (pauli.bits() & 1) << shift;
        Self(cleared | z | x)
    }

    /// Parses a qubit-letter string such as `"XZIY"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedObservable`] if the string length is not
    /// `n_qubits` or a letter is not one of `I`, `X`, `Y`, `Z`.
    pub fn from_letters(text: &str, n_qubits: u32) -> Result<Self> {
        check_qubits(n_qubits)?;
        let malformed = |reason: String| Error::MalformedObservable {
            text: text.to_string(),
            reason,
        };
        let length = text.chars().count();
        if length != n_qubits as usize {
            return Err(malformed(format!(
                "expected {n_qubits} letters, found {length}"
            )));
        }
        let mut obs = Self::IDENTITY;
        for (qubit, letter) in text.chars().enumerate() {
            let pauli = Pauli::from_letter(letter)
                .ok_or_else(|| malformed(format!("unknown letter {letter:?}")))?;
            obs = obs.with_pauli(qubit as u32, pauli, n_qubits);
        }
        Ok(obs)
    }

    /// The qubit-letter string of this observable.
    pub fn letters(self, n_qubits: u32) -> String {
        (0..n_qubits)
            .map(|qubit| self.pauli_at(qubit, n_qubits).letter())
            .collect()
    }

    /// A `Display` adapter printing the qubit letters.
    pub const fn display(self, n_qubits: u32) -> Letters {
        Letters {
            obs: self,
            n_qubits,
        }
    }
}

/// Prints an observable as qubit letters.
#[derive(Debug, Clone, Copy)]
pub struct Letters {
    obs: Observable,
    n_qubits: u32,
}

impl fmt::Display for Letters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for qubit in 0..self.n_qubits {
            write!(f, "{}", self.obs.pauli_at(qubit, self.n_qubits).letter())?;
        }
        Ok(())
    }
}

/// Checks that `n_qubits` is in `1..=MAX_QUBITS`.
///
/// # Errors
///
/// Returns [`Error::QubitCount`] otherwise.
pub fn check_qubits(n_qubits: u32) -> Result<()> {
    if (1..=MAX_QUBITS).contains(&n_qubits) {
        Ok(())
    } else {
        Err(Error::QubitCount(n_qubits))
    }
}

/// Number of observable words for `n_qubits`, identity included (`4^N`).
#[inline]
pub const fn observable_count(n_qubits: u32) -> usize {
    1usize << (2 * n_qubits)
}

/// Low-bit mask of width `bits`.
#[inline]
pub const fn mask(bits: u32) -> u32 {
    if bits >= 32 {
        u32::MAX
    } else {
        (1u32 << bits) - 1
    }
}

/// Parity of the low `width` bits of `word`, folded in O(log width) shifts.
///
/// Folds that cannot touch bits inside `width` are skipped.
#[inline]
pub const fn bit_parity(word: u32, width: u32) -> u32 {
    let mut n = word;
    if width > 16 {
        n ^= n >> 16;
    }
    if width > 8 {
        n ^= n >> 8;
    }
    if width > 4 {
        n ^= n >> 4;
    }
    if width > 2 {
        n ^= n >> 2;
    }
    n ^= n >> 1;
    n & 1
}

/// Bitwise form of the symplectic product, before the parity fold.
#[inline]
pub const fn inner_product_vector(a: Observable, b: Observable, n_qubits: u32) -> u32 {
    (a.z_part(n_qubits) & b.x_part(n_qubits)) ^ (b.z_part(n_qubits) & a.x_part(n_qubits))
}

/// Symplectic inner product: 1 iff `a` and `b` anticommute.
#[inline]
pub const fn inner_product(a: Observable, b: Observable, n_qubits: u32) -> u32 {
    bit_parity(inner_product_vector(a, b, n_qubits), n_qubits)
}

/// True iff `a` and `b` commute as Pauli operators.
#[inline]
pub const fn commute(a: Observable, b: Observable, n_qubits: u32) -> bool {
    inner_product(a, b, n_qubits) == 0
}

/// Quadratic form based at `base`: `Q_base(x) = Q₀(x) + ⟨base, x⟩`, where
/// `Q₀(x)` is the parity of `Z(x) & X(x)` (the number of `Y` letters).
#[inline]
pub const fn quadratic_form(base: Observable, x: Observable, n_qubits: u32) -> u32 {
    let q0 = x.z_part(n_qubits) & x.x_part(n_qubits);
    bit_parity(q0 ^ inner_product_vector(base, x, n_qubits), n_qubits)
}

/// Transvection `T_p(q) = q + ⟨p, q⟩ p`.
///
/// ```
/// use contextuality::symplectic::{transvection, Observable};
///
/// let p = Observable::from_letters("XI", 2).unwrap();
/// let q = Observable::from_letters("ZI", 2).unwrap();
/// assert_eq!(transvection(p, q, 2).letters(2), "YI"); // anticommuting: q·p
/// assert_eq!(transvection(p, p, 2), p);               // commuting: unchanged
/// ```
#[inline]
pub const fn transvection(p: Observable, q: Observable, n_qubits: u32) -> Observable {
    Observable(q.0 ^ (inner_product(p, q, n_qubits) * p.0))
}

/// Qubit-letter string to observable (see [`Observable::from_letters`]).
///
/// # Errors
///
/// Returns [`Error::MalformedObservable`] on a bad letter or length.
pub fn decode(text: &str, n_qubits: u32) -> Result<Observable> {
    Observable::from_letters(text, n_qubits)
}

/// Observable to qubit-letter string.
pub fn encode(obs: Observable, n_qubits: u32) -> String {
    obs.letters(n_qubits)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn obs(text: &str) -> Observable {
        Observable::from_letters(text, text.len() as u32).unwrap()
    }

    #[test]
    fn two_qubit_words_match_table() {
        let expected = [
            ("II", 0b0000),
            ("IX", 0b0001),
            ("XI", 0b0010),
            ("XX", 0b0011),
            ("IZ", 0b0100),
            ("IY", 0b0101),
            ("XZ", 0b0110),
            ("XY", 0b0111),
            ("ZI", 0b1000),
            ("ZX", 0b1001),
            ("YI", 0b1010),
            ("YX", 0b1011),
            ("ZZ", 0b1100),
            ("ZY", 0b1101),
            ("YZ", 0b1110),
            ("YY", 0b1111),
        ];
        for (text, word) in expected {
            assert_eq!(obs(text).bits(), word, "{text}");
            assert_eq!(Observable::new(word).letters(2), text);
        }
    }

    #[test]
    fn one_qubit_commutation() {
        for a in Pauli::ALL {
            for b in Pauli::ALL {
                let pa = Observable::new(a.bits());
                let pb = Observable::new(b.bits());
                let anticommute = a != b && a != Pauli::I && b != Pauli::I;
                assert_eq!(inner_product(pa, pb, 1) == 1, anticommute, "{a:?} {b:?}");
            }
        }
    }

    #[test]
    fn inner_product_counts_anticommuting_letters() {
        // XZ vs ZX: both positions anticommute, so the operators commute
        assert_eq!(inner_product(obs("XZ"), obs("ZX"), 2), 0);
        // XZI vs ZZI: one anticommuting position
        assert_eq!(inner_product(obs("XZI"), obs("ZZI"), 3), 1);
    }

    #[test]
    fn parity_fold_matches_popcount() {
        for width in 1..=MAX_QUBITS {
            for word in [0u32, 1, 0b1011, 0xFFFF, 0x1234_5678, u32::MAX] {
                let masked = word & mask(width);
                assert_eq!(bit_parity(masked, width), masked.count_ones() & 1);
            }
        }
    }

    #[test]
    fn quadratic_form_at_identity_counts_y() {
        assert_eq!(quadratic_form(Observable::IDENTITY, obs("YIX"), 3), 1);
        assert_eq!(quadratic_form(Observable::IDENTITY, obs("YYZ"), 3), 0);
    }

    #[test]
    fn quadratic_form_shifts_by_inner_product() {
        let base = obs("XI");
        let x = obs("ZZ");
        let q0 = quadratic_form(Observable::IDENTITY, x, 2);
        assert_eq!(quadratic_form(base, x, 2), q0 ^ inner_product(base, x, 2));
    }

    #[test]
    fn transvection_is_an_involution() {
        let p = obs("XYZ");
        for word in 0..observable_count(3) as u32 {
            let q = Observable::new(word);
            assert_eq!(transvection(p, transvection(p, q, 3), 3), q);
        }
    }

    #[test]
    fn malformed_letters_are_rejected() {
        assert!(matches!(
            Observable::from_letters("XQ", 2),
            Err(Error::MalformedObservable { .. })
        ));
        assert!(matches!(
            Observable::from_letters("XXX", 2),
            Err(Error::MalformedObservable { .. })
        ));
        assert!(matches!(
            Observable::from_letters("X", 0),
            Err(Error::QubitCount(0))
        ));
    }

    #[test]
    fn with_pauli_replaces_one_letter() {
        let o = obs("XYZ").with_pauli(1, Pauli::I, 3);
        assert_eq!(o.letters(3), "XIZ");
        assert_eq!(format!("{}", o.display(3)), "XIZ");
    }
}
