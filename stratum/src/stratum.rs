//! Strata of Abelian and quadratic differentials.
//!
//! A stratum is named by the orders of the zeros of its differentials. Orders
//! are kept as a multiset (`order → multiplicity`); a zero of order `0` is a
//! marked point and counts towards the dimension.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Whether the unfolding carries a translation or a half-translation structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DifferentialKind {
    /// Abelian differentials (translation surfaces), stratum `H(...)`.
    Abelian,
    /// Quadratic differentials (half-translation surfaces), stratum `Q(...)`.
    Quadratic,
}

impl DifferentialKind {
    /// Letter used in the stratum name.
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            DifferentialKind::Abelian => 'H',
            DifferentialKind::Quadratic => 'Q',
        }
    }

    /// Smallest admissible zero order: `0` for Abelian, `-1` (a simple pole)
    /// for quadratic differentials.
    #[must_use]
    pub fn min_order(self) -> i64 {
        match self {
            DifferentialKind::Abelian => 0,
            DifferentialKind::Quadratic => -1,
        }
    }

    /// The sum of zero orders is `modulus · (g − 1)`.
    fn modulus(self) -> i64 {
        match self {
            DifferentialKind::Abelian => 2,
            DifferentialKind::Quadratic => 4,
        }
    }
}

impl fmt::Display for DifferentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifferentialKind::Abelian => f.write_str("Abelian"),
            DifferentialKind::Quadratic => f.write_str("Quadratic"),
        }
    }
}

/// Zero orders that do not describe a stratum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StratumError {
    /// No singularity at all.
    #[error("a stratum needs at least one singularity")]
    Empty,
    /// An order below the admissible minimum for the kind.
    #[error("zero order {order} is not allowed for {kind} differentials")]
    OrderTooSmall {
        /// Kind of differential.
        kind: DifferentialKind,
        /// Offending order.
        order: i64,
    },
    /// The orders are incompatible with Gauss–Bonnet.
    #[error("zero orders sum to {sum}, which is not {modulus}(g - 1) for a genus g >= 0")]
    GaussBonnet {
        /// Sum of the zero orders with multiplicity.
        sum: i64,
        /// 2 for Abelian, 4 for quadratic differentials.
        modulus: i64,
    },
    /// Multiplicities or orders too large for the genus and dimension to be
    /// computed.
    #[error("zero orders and multiplicities are too large to describe a stratum")]
    Overflow,
}

/// The predicted ambient stratum: a kind plus `zero order → multiplicity`.
///
/// Read-only once constructed; only [`Stratum::new`] builds one, so it is
/// serialized but never deserialized.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Stratum {
    kind: DifferentialKind,
    zeros: BTreeMap<i64, u64>,
    genus: u64,
    dimension: u64,
}

impl Stratum {
    /// Builds a stratum from `(order, multiplicity)` pairs. Repeated orders
    /// accumulate; pairs with multiplicity zero are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StratumError`] if there is no singularity, an order is below
    /// [`DifferentialKind::min_order`], the orders violate Gauss–Bonnet, or
    /// the counts overflow.
    pub fn new(
        kind: DifferentialKind,
        zeros: impl IntoIterator<Item = (i64, u64)>,
    ) -> Result<Self, StratumError> {
        let mut orders = BTreeMap::new();
        for (order, mult) in zeros {
            if mult == 0 {
                continue;
            }
            if order < kind.min_order() {
                return Err(StratumError::OrderTooSmall { kind, order });
            }
            let entry: &mut u64 = orders.entry(order).or_insert(0);
            *entry = entry.checked_add(mult).ok_or(StratumError::Overflow)?;
        }
        if orders.is_empty() {
            return Err(StratumError::Empty);
        }

        let mut sum: i64 = 0;
        let mut count: u64 = 0;
        for (&order, &mult) in &orders {
            let mult_signed = i64::try_from(mult).map_err(|_| StratumError::Overflow)?;
            sum = order
                .checked_mul(mult_signed)
                .and_then(|term| sum.checked_add(term))
                .ok_or(StratumError::Overflow)?;
            count = count.checked_add(mult).ok_or(StratumError::Overflow)?;
        }
        let modulus = kind.modulus();
        if sum % modulus != 0 || sum < -modulus {
            return Err(StratumError::GaussBonnet { sum, modulus });
        }
        // sum >= -modulus, so the genus is non-negative.
        let genus = (sum / modulus + 1) as u64;
        let offset = match kind {
            DifferentialKind::Abelian => 1,
            DifferentialKind::Quadratic => 2,
        };
        let dimension = genus
            .checked_mul(2)
            .and_then(|d| d.checked_add(count))
            .ok_or(StratumError::Overflow)?
            .saturating_sub(offset);

        Ok(Self {
            kind,
            zeros: orders,
            genus,
            dimension,
        })
    }

    /// Abelian or quadratic.
    #[must_use]
    pub fn kind(&self) -> DifferentialKind {
        self.kind
    }

    /// `(order, multiplicity)` pairs, highest order first.
    pub fn zeros(&self) -> impl Iterator<Item = (i64, u64)> + '_ {
        self.zeros.iter().rev().map(|(&order, &mult)| (order, mult))
    }

    /// Number of singularities, marked points included.
    #[must_use]
    pub fn singularity_count(&self) -> u64 {
        self.zeros.values().sum()
    }

    /// Genus from Gauss–Bonnet.
    #[must_use]
    pub fn genus(&self) -> u64 {
        self.genus
    }

    /// Complex dimension of the stratum in period coordinates.
    ///
    /// `2g + n − 1` for Abelian and `2g + n − 2` for quadratic differentials,
    /// where `n` counts marked points as singularities.
    #[must_use]
    pub fn dimension(&self) -> u64 {
        self.dimension
    }
}

impl fmt::Display for Stratum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}(", self.kind.symbol(), self.genus)?;
        for (i, (order, mult)) in self.zeros().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if mult == 1 {
                write!(f, "{order}")?;
            } else {
                write!(f, "{order}^{mult}")?;
            }
        }
        f.write_str(")")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn torus_with_marked_points() {
        let s = Stratum::new(DifferentialKind::Abelian, [(0, 3)]).unwrap();
        assert_eq!(s.genus(), 1);
        assert_eq!(s.singularity_count(), 3);
        assert_eq!(s.dimension(), 4);
        assert_eq!(s.to_string(), "H_1(0^3)");
    }

    #[test]
    fn genus_two_strata() {
        let h2 = Stratum::new(DifferentialKind::Abelian, [(2, 1)]).unwrap();
        assert_eq!((h2.genus(), h2.dimension()), (2, 4));
        let h11 = Stratum::new(DifferentialKind::Abelian, [(1, 2)]).unwrap();
        assert_eq!((h11.genus(), h11.dimension()), (2, 5));
    }

    #[test]
    fn pillowcase() {
        let q = Stratum::new(DifferentialKind::Quadratic, [(-1, 4)]).unwrap();
        assert_eq!(q.genus(), 0);
        assert_eq!(q.dimension(), 2);
        assert_eq!(q.to_string(), "Q_0(-1^4)");
    }

    #[test]
    fn orders_print_in_decreasing_order() {
        let q = Stratum::new(DifferentialKind::Quadratic, [(-1, 4), (0, 1), (1, 1), (-1, 1)])
            .unwrap();
        assert_eq!(q.to_string(), "Q_0(1, 0, -1^5)");
        assert_eq!(q.singularity_count(), 7);
    }

    #[test]
    fn rejects_invalid_orders() {
        assert_eq!(
            Stratum::new(DifferentialKind::Abelian, [(-1, 2)]),
            Err(StratumError::OrderTooSmall {
                kind: DifferentialKind::Abelian,
                order: -1
            })
        );
        assert_eq!(
            Stratum::new(DifferentialKind::Abelian, [(1, 1)]),
            Err(StratumError::GaussBonnet { sum: 1, modulus: 2 })
        );
        assert_eq!(
            Stratum::new(DifferentialKind::Quadratic, [(-1, 2)]),
            Err(StratumError::GaussBonnet {
                sum: -2,
                modulus: 4
            })
        );
        assert_eq!(
            Stratum::new(DifferentialKind::Abelian, [(0, 0)]),
            Err(StratumError::Empty)
        );
    }

    #[test]
    fn rejects_overflowing_counts() {
        assert_eq!(
            Stratum::new(DifferentialKind::Abelian, [(0, u64::MAX), (0, 1)]),
            Err(StratumError::Overflow)
        );
        assert_eq!(
            Stratum::new(DifferentialKind::Abelian, [(2, u64::MAX)]),
            Err(StratumError::Overflow)
        );
        assert_eq!(
            Stratum::new(DifferentialKind::Abelian, [(i64::MAX - 1, 2)]),
            Err(StratumError::Overflow)
        );
    }
}
