//! Classical sign assignment over every observable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{dense_table, Error, Result};
use crate::symplectic::{check_qubits, observable_count, Observable};

/// Signs packed per letter.
const SIGNS_PER_LETTER: usize = 4;

/// One bit per observable, indexed by the observable's word. `true` is `-1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Candidate {
    signs: Vec<bool>,
}

impl Candidate {
    /// Every observable at `+1`.
    ///
    /// # Errors
    ///
    /// [`Error::QubitCount`] or [`Error::Allocation`].
    pub fn all_positive(n_qubits: u32) -> Result<Self> {
        check_qubits(n_qubits)?;
        Ok(Self {
            signs: dense_table("candidate signs", observable_count(n_qubits), false)?,
        })
    }

    /// Wraps a sign vector as is.
    pub fn from_signs(signs: Vec<bool>) -> Self {
        Self { signs }
    }

    /// Number of signs.
    pub fn len(&self) -> usize {
        self.signs.len()
    }

    /// True when there are no signs.
    pub fn is_empty(&self) -> bool {
        self.signs.is_empty()
    }

    /// The raw sign vector.
    pub fn signs(&self) -> &[bool] {
        &self.signs
    }

    /// Mutable access for solvers that write signs in place.
    pub fn signs_mut(&mut self) -> &mut [bool] {
        &mut self.signs
    }

    /// Sign of `obs`; `false` for words outside the table.
    #[inline]
    pub fn sign(&self, obs: Observable) -> bool {
        self.signs.get(obs.index()).copied().unwrap_or(false)
    }

    /// Sets the sign of `obs`. Out-of-range words are ignored.
    #[inline]
    pub fn set(&mut self, obs: Observable, negative: bool) {
        if let Some(slot) = self.signs.get_mut(obs.index()) {
            *slot = negative;
        }
    }

    /// Toggles the sign of `obs`. Out-of-range words are ignored.
    #[inline]
    pub fn flip(&mut self, obs: Observable) {
        if let Some(slot) = self.signs.get_mut(obs.index()) {
            *slot = !*slot;
        }
    }

    /// XOR of the signs of `points`.
    #[inline]
    pub fn parity(&self, points: &[Observable]) -> bool {
        points.iter().fold(false, |acc, &obs| acc ^ self.sign(obs))
    }

    /// Number of `-1` signs.
    pub fn negative_signs(&self) -> usize {
        self.signs.iter().filter(|&&s| s).count()
    }

    /// Renders four signs per letter: letter `i` is `'a'` plus the bits of
    /// signs `4i..4i+4`, lowest index in the lowest bit.
    pub fn to_letters(&self) -> String {
        self.signs
            .chunks(SIGNS_PER_LETTER)
            .map(|chunk| {
                let bits = chunk
                    .iter()
                    .enumerate()
                    .fold(0u8, |acc, (j, &s)| acc | (u8::from(s) << j));
                char::from(b'a' + bits)
            })
            .collect()
    }

    /// Parses [`Candidate::to_letters`] output for an `n_qubits` table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedSolution`] if the text has the wrong length
    /// or a letter outside `'a'..='p'`.
    pub fn from_letters(text: &str, n_qubits: u32) -> Result<Self> {
        let mut candidate = Self::all_positive(n_qubits)?;
        let text = text.trim();
        let expected = candidate.len().div_ceil(SIGNS_PER_LETTER);
        if text.chars().count() != expected {
            return Err(Error::MalformedSolution(format!(
                "expected {expected} letters for {n_qubits} qubits, got {}",
                text.chars().count()
            )));
        }
        for (chunk, letter) in candidate.signs.chunks_mut(SIGNS_PER_LETTER).zip(text.chars()) {
            let bits = match letter {
                'a'..='p' => letter as u8 - b'a',
                _ => {
                    return Err(Error::MalformedSolution(format!(
                        "letter {letter:?} is outside 'a'..='p'"
                    )))
                }
            };
            for (j, slot) in chunk.iter_mut().enumerate() {
                *slot = (bits >> j) & 1 == 1;
            }
        }
        Ok(candidate)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_letters())
    }
}

/// Parses letters without a known qubit count: the table size is inferred
/// from the text length and must be a power of four.
impl FromStr for Candidate {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let letters = text.trim().chars().count();
        let signs = letters * SIGNS_PER_LETTER;
        let n_qubits = (1..=crate::symplectic::MAX_QUBITS)
            .find(|&n| observable_count(n) == signs)
            .ok_or_else(|| {
                Error::MalformedSolution(format!(
                    "{letters} letters do not cover a 4^N sign table"
                ))
            })?;
        Self::from_letters(text, n_qubits)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn letters_pack_low_index_first() {
        let mut c = Candidate::all_positive(1).unwrap();
        assert_eq!(c.to_letters(), "a");
        c.set(Observable::new(0), true);
        assert_eq!(c.to_letters(), "b");
        c.set(Observable::new(3), true);
        assert_eq!(c.to_letters(), "j");
    }

    #[test]
    fn letters_parse_back() {
        let mut c = Candidate::all_positive(2).unwrap();
        for word in [1, 6, 7, 15] {
            c.flip(Observable::new(word));
        }
        let text = c.to_letters();
        assert_eq!(text.len(), 4);
        assert_eq!(Candidate::from_letters(&text, 2).unwrap(), c);
        assert_eq!(text.parse::<Candidate>().unwrap(), c);
    }

    #[test]
    fn bad_letters_are_rejected() {
        assert!(matches!(
            Candidate::from_letters("aaaz", 2),
            Err(Error::MalformedSolution(_))
        ));
        assert!(matches!(
            Candidate::from_letters("aa", 2),
            Err(Error::MalformedSolution(_))
        ));
        assert!("aaa".parse::<Candidate>().is_err());
    }

    #[test]
    fn parity_is_xor_of_signs() {
        let mut c = Candidate::all_positive(2).unwrap();
        let points = [Observable::new(1), Observable::new(4), Observable::new(5)];
        assert!(!c.parity(&points));
        c.flip(points[1]);
        assert!(c.parity(&points));
        assert_eq!(c.negative_signs(), 1);
    }
}
