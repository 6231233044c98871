//! Validated triangle angle weights.

use std::fmt;

use thiserror::Error;

use crate::fraction::{gcd, AngleFraction};

/// Reasons a list of integers is not a valid triangle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeightsError {
    /// A triangle has exactly three angles.
    #[error("expected exactly 3 angle weights, got {0}")]
    WrongCount(usize),
    /// Every angle weight must be a positive integer.
    #[error("angle weights must be positive integers, got {0:?}")]
    NonPositive(Vec<i64>),
    /// The weights are not in lowest terms.
    #[error("angle weights ({a}, {b}, {c}) share the common factor {gcd}")]
    NotCoprime {
        /// First weight.
        a: u64,
        /// Second weight.
        b: u64,
        /// Third weight.
        c: u64,
        /// Their greatest common divisor.
        gcd: u64,
    },
    /// The weights are too large for the cone angle arithmetic.
    #[error("angle weights ({a}, {b}, {c}) are too large: twice their sum must not exceed {max}")]
    TooLarge {
        /// First weight.
        a: u64,
        /// Second weight.
        b: u64,
        /// Third weight.
        c: u64,
        /// Largest admissible value of `2(a + b + c)`.
        max: u64,
    },
}

/// Largest admissible `2n`, so that cone angles and zero orders fit in `i64`.
pub const MAX_SCALE: u64 = i64::MAX as u64;

/// The angles `(aπ/n, bπ/n, cπ/n)` of a rational triangle, `n = a + b + c`.
///
/// Invariant: all three weights are positive, `gcd(a, b, c) = 1`, and
/// `2(a + b + c) ≤` [`MAX_SCALE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<i64>", into = "[u64; 3]"))]
pub struct TriangleWeights {
    weights: [u64; 3],
}

impl TriangleWeights {
    /// Validates three weights.
    ///
    /// # Errors
    ///
    /// Returns [`WeightsError::NonPositive`] if a weight is zero,
    /// [`WeightsError::TooLarge`] if twice their sum exceeds [`MAX_SCALE`],
    /// and [`WeightsError::NotCoprime`] if the weights share a common factor.
    pub fn new(a: u64, b: u64, c: u64) -> Result<Self, WeightsError> {
        if a == 0 || b == 0 || c == 0 {
            return Err(WeightsError::NonPositive(vec![a as i64, b as i64, c as i64]));
        }
        let scale = a
            .checked_add(b)
            .and_then(|n| n.checked_add(c))
            .and_then(|n| n.checked_mul(2));
        if !scale.is_some_and(|scale| scale <= MAX_SCALE) {
            return Err(WeightsError::TooLarge {
                a,
                b,
                c,
                max: MAX_SCALE,
            });
        }
        let common = gcd(gcd(a, b), c);
        if common != 1 {
            return Err(WeightsError::NotCoprime {
                a,
                b,
                c,
                gcd: common,
            });
        }
        Ok(Self { weights: [a, b, c] })
    }

    /// Validates weights as they come from the command line.
    ///
    /// # Errors
    ///
    /// Returns [`WeightsError::WrongCount`] unless exactly three weights are
    /// given, [`WeightsError::NonPositive`] if any weight is `≤ 0`,
    /// [`WeightsError::TooLarge`] if twice their sum exceeds [`MAX_SCALE`],
    /// and [`WeightsError::NotCoprime`] if they share a common factor.
    pub fn from_slice(weights: &[i64]) -> Result<Self, WeightsError> {
        let [a, b, c] = match weights {
            [a, b, c] => [*a, *b, *c],
            _ => return Err(WeightsError::WrongCount(weights.len())),
        };
        if a <= 0 || b <= 0 || c <= 0 {
            return Err(WeightsError::NonPositive(weights.to_vec()));
        }
        Self::new(a as u64, b as u64, c as u64)
    }

    /// The three weights in input order.
    #[must_use]
    pub fn as_array(&self) -> [u64; 3] {
        self.weights
    }

    /// `n = a + b + c`, the common denominator of the three angles. Never
    /// overflows: `2n ≤` [`MAX_SCALE`].
    #[must_use]
    pub fn sum(&self) -> u64 {
        self.weights.iter().sum()
    }

    /// The three angles as fractions of `π` in lowest terms.
    #[must_use]
    pub fn angles(&self) -> [AngleFraction; 3] {
        let n = self.sum();
        self.weights.map(|w| {
            let g = gcd(w, n);
            AngleFraction::from_reduced(w / g, n / g)
        })
    }
}

impl TryFrom<Vec<i64>> for TriangleWeights {
    type Error = WeightsError;

    fn try_from(weights: Vec<i64>) -> Result<Self, Self::Error> {
        Self::from_slice(&weights)
    }
}

impl From<TriangleWeights> for [u64; 3] {
    fn from(weights: TriangleWeights) -> Self {
        weights.weights
    }
}

impl fmt::Display for TriangleWeights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.weights;
        write!(f, "({a}, {b}, {c})")
    }
}
