//! Capability interface of the geometry engine.
//!
//! The survey never looks inside a surface. It needs a handful of operations
//! from an orbit closure and from the flow decompositions it hands out, and
//! these traits are exactly that surface area. [`crate::replay`] implements
//! them from recorded data.

use std::fmt;

use flatsurf_stratum::TriangleWeights;
use serde::{Deserialize, Serialize};

use crate::config::Bound;
use crate::error::BackendError;

/// A direction in the plane, as the holonomy of the saddle connection that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Direction {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl Direction {
    /// A direction from its components.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean length.
    #[must_use]
    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// How a flow decomposition splits the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComponentCounts {
    /// Periodic components.
    pub cylinders: usize,
    /// Minimal (non-periodic) components.
    pub minimal: usize,
    /// Components the engine could not classify.
    pub undetermined: usize,
}

/// The flow of a surface in one direction.
pub trait FlowDecomposition {
    /// Direction of the flow.
    fn direction(&self) -> Direction;

    /// Computes the partition into cylinders and minimal components.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the engine fails outright. Components it
    /// cannot classify are reported through [`FlowDecomposition::counts`].
    fn decompose(&mut self) -> Result<(), BackendError>;

    /// Component counts. Before [`FlowDecomposition::decompose`] every
    /// component is undetermined.
    fn counts(&self) -> ComponentCounts;

    /// Whether the direction is parabolic.
    fn is_parabolic(&self) -> bool;
}

/// A running approximation of the `GL(2,R)`-orbit closure of a surface.
pub trait OrbitClosure {
    /// The underlying surface.
    type Surface: fmt::Display;
    /// Flow decompositions handed out by [`OrbitClosure::decompositions`].
    type Decomposition: FlowDecomposition;
    /// Sequence of decompositions. It owns its data, so the closure can be
    /// updated while the sequence is drained.
    type Decompositions: Iterator<Item = Self::Decomposition>;

    /// The underlying surface.
    fn surface(&self) -> &Self::Surface;

    /// Dimension of the tangent space found so far.
    fn tangent_space_dimension(&self) -> usize;

    /// Dimension of the projection of the tangent space to absolute cohomology.
    fn absolute_dimension(&self) -> usize;

    /// One decomposition per direction of a saddle connection of length at
    /// most `bound`.
    fn decompositions(&self, bound: Bound) -> Self::Decompositions;

    /// Extends the tangent space by what a decomposed direction reveals.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the decomposition's data does not fit the
    /// tangent space.
    fn update_tangent_space(
        &mut self,
        decomposition: &Self::Decomposition,
    ) -> Result<(), BackendError>;
}

/// Unfolds triangles and wraps the result in an orbit closure.
pub trait GeometryBackend {
    /// Orbit closure type produced by this backend.
    type Closure: OrbitClosure;

    /// Unfolds the billiard in a triangle into a translation surface.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the backend cannot produce the surface.
    fn build_surface(
        &self,
        weights: &TriangleWeights,
    ) -> Result<<Self::Closure as OrbitClosure>::Surface, BackendError>;

    /// Starts an orbit closure computation at a surface.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the initial tangent space cannot be built.
    fn orbit_closure(
        &self,
        surface: <Self::Closure as OrbitClosure>::Surface,
    ) -> Result<Self::Closure, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_display_and_length() {
        let d = Direction::new(3.0, 4.0);
        assert_eq!(d.to_string(), "(3, 4)");
        assert_eq!(d.length_squared(), 25.0);
    }
}
