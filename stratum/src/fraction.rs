//! Reduced angle fractions.

use std::fmt;

/// Greatest common divisor by the Euclidean algorithm. `gcd(0, 0) = 0`.
#[must_use]
pub const fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// An angle `y/d · π` with `y/d` in lowest terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AngleFraction {
    numerator: u64,
    denominator: u64,
}

impl AngleFraction {
    /// Reduces `numerator / denominator`. Returns `None` for a zero denominator.
    #[must_use]
    pub fn reduced(numerator: u64, denominator: u64) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        let g = gcd(numerator, denominator).max(1);
        Some(Self {
            numerator: numerator / g,
            denominator: denominator / g,
        })
    }

    /// Wraps a fraction the caller already reduced over a positive denominator.
    pub(crate) fn from_reduced(numerator: u64, denominator: u64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Numerator `y`.
    #[must_use]
    pub fn numerator(self) -> u64 {
        self.numerator
    }

    /// Denominator `d`.
    #[must_use]
    pub fn denominator(self) -> u64 {
        self.denominator
    }

    /// Rewrites the fraction over an even denominator.
    ///
    /// An odd `d` is replaced by `2d` and `y` by `2y`; an even `d` is kept.
    /// The result is generally not in lowest terms. Angles of validated
    /// weights have `y ≤ d ≤ n`, so doubling stays below `2n`.
    #[must_use]
    pub fn with_even_denominator(self) -> Self {
        if self.denominator % 2 == 1 {
            Self {
                numerator: 2 * self.numerator,
                denominator: 2 * self.denominator,
            }
        } else {
            self
        }
    }
}

impl fmt::Display for AngleFraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
