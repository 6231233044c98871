//! Tangent space bookkeeping in period coordinates.
//!
//! Vectors live in relative cohomology `H¹(S, Σ; R)`, written in a fixed basis
//! of period coordinates. The span keeps a fully reduced row-echelon basis:
//! every basis row has a `1` in its pivot column and `0` in the pivot columns
//! of all other rows, so reducing a vector is a single pass.

use crate::error::BackendError;

/// Relative size below which a reduced entry counts as zero.
pub const TOLERANCE: f64 = 1e-9;

/// Linear span of the vectors inserted so far.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSpan {
    ambient: usize,
    rows: Vec<Vec<f64>>,
    pivots: Vec<usize>,
}

impl LinearSpan {
    /// The zero subspace of `R^ambient`.
    #[must_use]
    pub fn new(ambient: usize) -> Self {
        Self {
            ambient,
            rows: Vec::new(),
            pivots: Vec::new(),
        }
    }

    /// Dimension of the surrounding space.
    #[must_use]
    pub fn ambient_dimension(&self) -> usize {
        self.ambient
    }

    /// Dimension of the span.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.rows.len()
    }

    /// Reduced basis rows.
    pub fn basis(&self) -> impl Iterator<Item = &[f64]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Adds `v` to the span. Returns whether the dimension grew.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::DimensionMismatch`] if `v` has the wrong length.
    pub fn insert(&mut self, v: &[f64]) -> Result<bool, BackendError> {
        self.check(v, "tangent vector")?;
        Ok(self.grow(v))
    }

    /// Inserts a vector already known to have the ambient length.
    fn grow(&mut self, v: &[f64]) -> bool {
        let Some((pivot, residue)) = self.residue(v) else {
            return false;
        };

        let head = residue[pivot];
        let row: Vec<f64> = residue.iter().map(|x| x / head).collect();
        for existing in &mut self.rows {
            let factor = existing[pivot];
            if factor != 0.0 {
                for (e, r) in existing.iter_mut().zip(&row) {
                    *e -= factor * r;
                }
                existing[pivot] = 0.0;
            }
        }
        self.rows.push(row);
        self.pivots.push(pivot);
        true
    }

    /// Whether `v` lies in the span.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::DimensionMismatch`] if `v` has the wrong length.
    pub fn contains(&self, v: &[f64]) -> Result<bool, BackendError> {
        self.check(v, "tangent vector")?;
        Ok(self.residue(v).is_none())
    }

    /// Dimension of the image of the span under `map`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::DimensionMismatch`] if `map` does not act on
    /// the ambient space of the span.
    pub fn image_dimension(&self, map: &LinearMap) -> Result<usize, BackendError> {
        if map.source != self.ambient {
            return Err(BackendError::DimensionMismatch {
                context: "linear map source".to_string(),
                expected: self.ambient,
                found: map.source,
            });
        }
        Ok(self.image_rank(map))
    }

    /// Rank of the image; `map.source` must equal the ambient dimension.
    fn image_rank(&self, map: &LinearMap) -> usize {
        let mut image = LinearSpan::new(map.target_dimension());
        for basis in &self.rows {
            image.grow(&map.apply(basis));
        }
        image.dimension()
    }

    /// Reduces `v` against the basis. Returns the pivot and the residue if
    /// something independent is left, `None` if `v` lies in the span.
    fn residue(&self, v: &[f64]) -> Option<(usize, Vec<f64>)> {
        let scale = v.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
        if scale == 0.0 {
            return None;
        }

        let mut residue = v.to_vec();
        for (row, &pivot) in self.rows.iter().zip(&self.pivots) {
            let factor = residue[pivot];
            if factor != 0.0 {
                for (r, b) in residue.iter_mut().zip(row) {
                    *r -= factor * b;
                }
            }
        }

        let (pivot, largest) = residue
            .iter()
            .enumerate()
            .fold((0, 0.0_f64), |(best, size), (i, x)| {
                if x.abs() > size {
                    (i, x.abs())
                } else {
                    (best, size)
                }
            });
        if largest <= TOLERANCE * scale {
            None
        } else {
            Some((pivot, residue))
        }
    }

    fn check(&self, v: &[f64], context: &str) -> Result<(), BackendError> {
        if v.len() == self.ambient {
            Ok(())
        } else {
            Err(BackendError::DimensionMismatch {
                context: context.to_string(),
                expected: self.ambient,
                found: v.len(),
            })
        }
    }
}

/// A linear map `R^source → R^target`, given by `target` rows of length
/// `source`. Row lengths are checked once, on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearMap {
    source: usize,
    rows: Vec<Vec<f64>>,
}

impl LinearMap {
    /// Wraps matrix rows acting on `R^source`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::DimensionMismatch`] for the first row whose
    /// length is not `source`.
    pub fn new(source: usize, rows: Vec<Vec<f64>>) -> Result<Self, BackendError> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != source {
                return Err(BackendError::DimensionMismatch {
                    context: format!("linear map row {i}"),
                    expected: source,
                    found: row.len(),
                });
            }
        }
        Ok(Self { source, rows })
    }

    /// Dimension of the domain.
    #[must_use]
    pub fn source_dimension(&self) -> usize {
        self.source
    }

    /// Dimension of the codomain.
    #[must_use]
    pub fn target_dimension(&self) -> usize {
        self.rows.len()
    }

    fn apply(&self, v: &[f64]) -> Vec<f64> {
        self.rows.iter().map(|row| dot(row, v)).collect()
    }
}

/// The tangent space of an orbit closure together with the projection from
/// relative to absolute period coordinates.
///
/// Both act on the same period coordinates by construction, so the absolute
/// dimension is always defined.
#[derive(Debug, Clone, PartialEq)]
pub struct TangentSpace {
    span: LinearSpan,
    absolute: LinearMap,
}

impl TangentSpace {
    /// The zero tangent space in `R^period_dimension`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::DimensionMismatch`] if `absolute` does not act
    /// on `R^period_dimension`.
    pub fn new(period_dimension: usize, absolute: LinearMap) -> Result<Self, BackendError> {
        if absolute.source != period_dimension {
            return Err(BackendError::DimensionMismatch {
                context: "absolute projection".to_string(),
                expected: period_dimension,
                found: absolute.source,
            });
        }
        Ok(Self {
            span: LinearSpan::new(period_dimension),
            absolute,
        })
    }

    /// Adds a tangent vector. Returns whether the dimension grew.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::DimensionMismatch`] if `v` has the wrong length.
    pub fn insert(&mut self, v: &[f64]) -> Result<bool, BackendError> {
        self.span.insert(v)
    }

    /// Dimension of the tangent space.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.span.dimension()
    }

    /// Dimension of its projection to absolute cohomology.
    #[must_use]
    pub fn absolute_dimension(&self) -> usize {
        self.span.image_rank(&self.absolute)
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SQRT3_2: f64 = 0.866_025_403_784_438_6;

    #[test]
    fn independent_vectors_grow_the_span() {
        let mut span = LinearSpan::new(3);
        assert!(span.insert(&[1.0, 2.0, 0.0]).unwrap());
        assert!(span.insert(&[0.0, 1.0, 1.0]).unwrap());
        assert_eq!(span.dimension(), 2);
        assert!(!span.insert(&[1.0, 3.0, 1.0]).unwrap());
        assert!(!span.insert(&[0.0, 0.0, 0.0]).unwrap());
        assert_eq!(span.dimension(), 2);
        assert!(span.insert(&[0.0, 0.0, 5.0]).unwrap());
        assert_eq!(span.dimension(), 3);
    }

    #[test]
    fn irrational_combinations_are_recognised() {
        let re = [1.5, 0.0, 1.0, 0.5];
        let im = [SQRT3_2, 2.0 * SQRT3_2, 0.0, -SQRT3_2];
        let mut span = LinearSpan::new(4);
        span.insert(&re).unwrap();
        span.insert(&im).unwrap();

        let (c, s) = (0.5_f64, SQRT3_2);
        let twist: Vec<f64> = re.iter().zip(&im).map(|(r, i)| c * i - s * r).collect();
        assert!(span.contains(&twist).unwrap());
        assert!(!span.insert(&twist).unwrap());
        assert!(!span.contains(&[0.0, 0.0, 1.0, 0.0]).unwrap());
    }

    #[test]
    fn basis_is_fully_reduced() {
        let mut span = LinearSpan::new(3);
        span.insert(&[2.0, 4.0, 6.0]).unwrap();
        span.insert(&[0.0, 3.0, 3.0]).unwrap();
        let rows: Vec<&[f64]> = span.basis().collect();
        for (i, row) in rows.iter().enumerate() {
            let pivot = span.pivots[i];
            assert!((row[pivot] - 1.0).abs() < 1e-12);
            for (j, other) in rows.iter().enumerate() {
                if i != j {
                    assert!(other[pivot].abs() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn image_dimension_projects_the_span() {
        let mut span = LinearSpan::new(4);
        span.insert(&[1.0, 0.0, 1.0, 0.0]).unwrap();
        span.insert(&[0.0, 0.0, 0.0, 1.0]).unwrap();
        let absolute =
            LinearMap::new(4, vec![vec![1.0, 0.0, 0.0, 0.0], vec![0.0, 1.0, 0.0, 0.0]]).unwrap();
        assert_eq!(span.image_dimension(&absolute).unwrap(), 1);
    }

    #[test]
    fn wrong_length_is_an_error() {
        let mut span = LinearSpan::new(2);
        assert!(matches!(
            span.insert(&[1.0]),
            Err(BackendError::DimensionMismatch {
                expected: 2,
                found: 1,
                ..
            })
        ));
        let wider = LinearMap::new(3, vec![vec![1.0, 0.0, 0.0]]).unwrap();
        assert!(matches!(
            span.image_dimension(&wider),
            Err(BackendError::DimensionMismatch {
                expected: 2,
                found: 3,
                ..
            })
        ));
    }

    #[test]
    fn linear_map_rows_are_checked_on_construction() {
        assert!(matches!(
            LinearMap::new(3, vec![vec![1.0, 0.0, 0.0], vec![1.0, 0.0]]),
            Err(BackendError::DimensionMismatch {
                expected: 3,
                found: 2,
                ..
            })
        ));
        let map = LinearMap::new(3, vec![vec![0.0, 1.0, 0.0]]).unwrap();
        assert_eq!((map.source_dimension(), map.target_dimension()), (3, 1));
    }

    #[test]
    fn tangent_space_projects_to_absolute_coordinates() {
        let absolute =
            LinearMap::new(3, vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]).unwrap();
        let mut tangent = TangentSpace::new(3, absolute).unwrap();
        assert_eq!((tangent.dimension(), tangent.absolute_dimension()), (0, 0));

        assert!(tangent.insert(&[0.0, 0.0, 1.0]).unwrap());
        assert_eq!((tangent.dimension(), tangent.absolute_dimension()), (1, 0));

        assert!(tangent.insert(&[1.0, 1.0, 0.0]).unwrap());
        assert!(tangent.insert(&[1.0, 0.0, 2.0]).unwrap());
        assert_eq!((tangent.dimension(), tangent.absolute_dimension()), (3, 2));
    }

    #[test]
    fn tangent_space_rejects_a_projection_on_other_coordinates() {
        let absolute = LinearMap::new(2, vec![vec![1.0, 0.0]]).unwrap();
        assert!(matches!(
            TangentSpace::new(3, absolute),
            Err(BackendError::DimensionMismatch {
                expected: 3,
                found: 2,
                ..
            })
        ));
    }
}
