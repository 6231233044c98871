//! Angle-to-stratum prediction.
//!
//! Each vertex of angle `wπ/n` becomes, in the unfolding, a family of cone
//! points. Writing `w/n = y/d` in lowest terms over an even denominator, the
//! vertex contributes `N/d` cone points of angle `yπ`, where `N` is `n` made
//! even. An odd `y` can only occur on a half-translation surface, so any odd
//! `y` makes the predicted stratum quadratic.

use std::collections::BTreeMap;

use crate::fraction::AngleFraction;
use crate::stratum::{DifferentialKind, Stratum, StratumError};
use crate::weights::TriangleWeights;

/// Cone angles of the unfolding: `y → multiplicity` for cone angle `yπ`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConeAngles {
    scale: u64,
    angles: BTreeMap<u64, u64>,
}

impl ConeAngles {
    /// An empty multiset over the common scale `N`.
    #[must_use]
    pub fn new(scale: u64) -> Self {
        Self {
            scale,
            angles: BTreeMap::new(),
        }
    }

    /// Adds `N/d` cone points of angle `yπ` for a fraction `y/d` whose
    /// denominator divides `N`.
    pub fn accumulate(&mut self, angle: AngleFraction) {
        let mult = self.scale / angle.denominator();
        *self.angles.entry(angle.numerator()).or_insert(0) += mult;
    }

    /// The common scale `N`.
    #[must_use]
    pub fn scale(&self) -> u64 {
        self.scale
    }

    /// `(y, multiplicity)` pairs in increasing `y`.
    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.angles.iter().map(|(&y, &mult)| (y, mult))
    }

    /// `Σ y · multiplicity`, the total cone angle in units of `π`.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.iter().map(|(y, mult)| y * mult).sum()
    }

    /// Zero orders of the differential: `y − 2` for quadratic, `(y − 2)/2`
    /// for Abelian differentials.
    pub fn zero_orders(
        &self,
        kind: DifferentialKind,
    ) -> impl Iterator<Item = (i64, u64)> + '_ {
        self.iter().map(move |(y, mult)| {
            let excess = y as i64 - 2;
            match kind {
                DifferentialKind::Quadratic => (excess, mult),
                DifferentialKind::Abelian => (excess.div_euclid(2), mult),
            }
        })
    }
}

/// Everything the prediction derives from the angle weights.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Prediction {
    /// Input triangle.
    pub weights: TriangleWeights,
    /// Each angle over an even denominator, in input order.
    pub fractions: [AngleFraction; 3],
    /// Cone angles of the unfolding.
    pub cone_angles: ConeAngles,
    /// The ambient stratum, an upper bound for the orbit closure.
    pub stratum: Stratum,
}

/// Predicts the ambient stratum of the unfolding of a triangle.
///
/// # Errors
///
/// Returns [`StratumError`] if the cone angles do not form a stratum. Valid
/// triangle weights always produce one: every cone angle, multiplicity, and
/// zero order is bounded by the scale `N ≤ 2n`, which validation keeps
/// within `i64`.
pub fn predict(weights: &TriangleWeights) -> Result<Prediction, StratumError> {
    let n = weights.sum();
    let scale = if n % 2 == 0 { n } else { 2 * n };

    let fractions = weights.angles().map(AngleFraction::with_even_denominator);

    let mut quadratic = false;
    let mut cone_angles = ConeAngles::new(scale);
    for angle in fractions {
        // Oddness is read after the denominator was made even: a numerator
        // that had to be doubled is even and never forces a quadratic
        // differential.
        quadratic |= angle.numerator() % 2 == 1;
        cone_angles.accumulate(angle);
    }

    let kind = if quadratic {
        DifferentialKind::Quadratic
    } else {
        DifferentialKind::Abelian
    };
    let stratum = Stratum::new(kind, cone_angles.zero_orders(kind))?;

    Ok(Prediction {
        weights: *weights,
        fractions,
        cone_angles,
        stratum,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn predicted(a: u64, b: u64, c: u64) -> Prediction {
        predict(&TriangleWeights::new(a, b, c).unwrap()).unwrap()
    }

    #[test]
    fn equilateral_is_a_torus_with_three_marked_points() {
        let p = predicted(1, 1, 1);
        assert_eq!(p.cone_angles.scale(), 6);
        assert_eq!(p.cone_angles.iter().collect::<Vec<_>>(), vec![(2, 3)]);
        assert_eq!(p.stratum.kind(), DifferentialKind::Abelian);
        assert_eq!(p.stratum.to_string(), "H_1(0^3)");
        assert_eq!(p.stratum.dimension(), 4);
    }

    #[test]
    fn isosceles_right_triangle_is_the_pillowcase() {
        let p = predicted(1, 1, 2);
        assert_eq!(p.cone_angles.scale(), 4);
        assert_eq!(p.cone_angles.iter().collect::<Vec<_>>(), vec![(1, 4)]);
        assert_eq!(p.stratum.to_string(), "Q_0(-1^4)");
        assert_eq!(p.stratum.dimension(), 2);
    }

    #[test]
    fn thirty_sixty_ninety() {
        let p = predicted(1, 2, 3);
        assert_eq!(p.stratum.kind(), DifferentialKind::Quadratic);
        assert_eq!(p.stratum.to_string(), "Q_0(0, -1^4)");
        assert_eq!(p.stratum.dimension(), 3);
    }

    #[test]
    fn heptagon_triangle() {
        let p = predicted(1, 2, 4);
        assert_eq!(p.cone_angles.scale(), 14);
        assert_eq!(p.stratum.to_string(), "H_3(3, 1, 0)");
        assert_eq!(p.stratum.dimension(), 8);
    }

    #[test]
    fn repeated_angles_accumulate() {
        let p = predicted(2, 3, 4);
        // 3/9 = 1/3 becomes 2/6 and contributes 18/6 = 3 marked points.
        assert_eq!(
            p.cone_angles.iter().collect::<Vec<_>>(),
            vec![(2, 3), (4, 1), (8, 1)]
        );
        assert_eq!(p.stratum.to_string(), "H_3(3, 1, 0^3)");
        assert_eq!(p.stratum.dimension(), 10);
    }

    #[test]
    fn largest_admissible_weights_predict() {
        let half = crate::weights::MAX_SCALE / 2;
        let p = predicted(half - 2, 1, 1);
        let n = half;
        assert_eq!(p.cone_angles.scale(), 2 * n);
        assert_eq!(p.cone_angles.total(), p.cone_angles.scale());
        assert_eq!(p.stratum.kind(), DifferentialKind::Abelian);
        assert_eq!(p.stratum.singularity_count(), 3);
    }

    #[test]
    fn fractions_are_kept_in_input_order() {
        let p = predicted(1, 2, 3);
        let shown: Vec<String> = p.fractions.iter().map(ToString::to_string).collect();
        assert_eq!(shown, vec!["1/6", "2/6", "1/2"]);
    }
}
