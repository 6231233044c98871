//! A geometry backend that replays a recorded survey trace.
//!
//! A trace stores what the geometry engine computed for one triangle: the
//! surface, its period coordinates, the initial tangent space, and for every
//! sampled direction the decomposition outcome and the tangent vectors it
//! contributes. Replaying a trace drives the survey exactly as the live
//! engine would, up to the recorded saddle connection length.
//!
//! # Format
//!
//! ```json
//! {
//!   "angles": [1, 1, 1],
//!   "surface": "hexagonal torus with 3 marked points",
//!   "period_dimension": 4,
//!   "absolute_projection": [[1, 0, 0, 0], [0, 1, 0, 0]],
//!   "tangent_space": [[1.5, 0, 1, 0.5], [0.866, 1.732, 0, -0.866]],
//!   "decompositions": [
//!     { "direction": {"x": 1, "y": 0}, "length": 1, "cylinders": 1,
//!       "minimal": 0, "parabolic": true, "tangent_vectors": [[...]] }
//!   ]
//! }
//! ```

use std::fmt;
use std::path::Path;

use flatsurf_stratum::TriangleWeights;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Bound;
use crate::error::BackendError;
use crate::orbit::{ComponentCounts, Direction, FlowDecomposition, GeometryBackend, OrbitClosure};
use crate::tangent::{LinearMap, TangentSpace, TOLERANCE};

/// A recorded survey of one triangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Trace {
    /// Triangle the trace was recorded for.
    pub angles: [u64; 3],
    /// Printable description of the unfolded surface.
    pub surface: String,
    /// Rank of relative homology, the length of every vector below.
    pub period_dimension: usize,
    /// Rows of the map from relative to absolute period coordinates.
    pub absolute_projection: Vec<Vec<f64>>,
    /// Vectors spanning the initial tangent space.
    pub tangent_space: Vec<Vec<f64>>,
    /// Sampled directions.
    pub decompositions: Vec<RecordedDirection>,
}

/// What the engine found in one direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordedDirection {
    /// Holonomy of the saddle connection defining the direction.
    pub direction: Direction,
    /// Length of that saddle connection.
    pub length: f64,
    /// Cylinders after decomposition.
    pub cylinders: usize,
    /// Minimal components after decomposition.
    pub minimal: usize,
    /// Components left undetermined after decomposition.
    #[serde(default)]
    pub undetermined: usize,
    /// Whether the direction is parabolic.
    pub parabolic: bool,
    /// Vectors this direction adds to the tangent space.
    #[serde(default)]
    pub tangent_vectors: Vec<Vec<f64>>,
}

impl RecordedDirection {
    fn components(&self) -> usize {
        self.cylinders + self.minimal + self.undetermined
    }
}

impl Trace {
    /// Parses a trace from JSON and checks its internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Parse`] for invalid JSON and the errors of
    /// [`Trace::validate`].
    pub fn from_json(json: &str, origin: &Path) -> Result<Self, BackendError> {
        let trace: Trace = serde_json::from_str(json).map_err(|source| BackendError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        trace.validate()?;
        Ok(trace)
    }

    /// Reads and validates a trace file.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Io`] if the file cannot be read, otherwise the
    /// errors of [`Trace::from_json`].
    pub fn load(path: &Path) -> Result<Self, BackendError> {
        let json = std::fs::read_to_string(path).map_err(|source| BackendError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let trace = Self::from_json(&json, path)?;
        debug!(
            path = %path.display(),
            directions = trace.decompositions.len(),
            "loaded trace"
        );
        Ok(trace)
    }

    /// Checks vector lengths, saddle connection lengths, and that no
    /// direction is recorded twice.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::DimensionMismatch`] or
    /// [`BackendError::Malformed`] on the first inconsistency.
    pub fn validate(&self) -> Result<(), BackendError> {
        let expected = self.period_dimension;
        let check = |v: &[f64], context: String| {
            if v.len() == expected {
                Ok(())
            } else {
                Err(BackendError::DimensionMismatch {
                    context,
                    expected,
                    found: v.len(),
                })
            }
        };

        for (i, row) in self.absolute_projection.iter().enumerate() {
            check(row, format!("absolute_projection[{i}]"))?;
        }
        for (i, v) in self.tangent_space.iter().enumerate() {
            check(v, format!("tangent_space[{i}]"))?;
        }

        for (i, record) in self.decompositions.iter().enumerate() {
            for (j, v) in record.tangent_vectors.iter().enumerate() {
                check(v, format!("decompositions[{i}].tangent_vectors[{j}]"))?;
            }
            if !(record.length.is_finite() && record.length > 0.0) {
                return Err(BackendError::Malformed(format!(
                    "decompositions[{i}] has invalid length {}",
                    record.length
                )));
            }
            if record.direction.length_squared() == 0.0 {
                return Err(BackendError::Malformed(format!(
                    "decompositions[{i}] has a zero direction"
                )));
            }
            if record.components() == 0 {
                return Err(BackendError::Malformed(format!(
                    "decompositions[{i}] has no components"
                )));
            }
            for (k, other) in self.decompositions[..i].iter().enumerate() {
                if parallel(record.direction, other.direction) {
                    return Err(BackendError::Malformed(format!(
                        "decompositions[{i}] repeats the direction of decompositions[{k}]"
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parallel(u: Direction, v: Direction) -> bool {
    let cross = u.x * v.y - u.y * v.x;
    let scale = (u.length_squared() * v.length_squared()).sqrt();
    cross.abs() <= TOLERANCE * scale
}

/// Replays a [`Trace`].
#[derive(Debug, Clone)]
pub struct ReplayBackend {
    trace: Trace,
}

impl ReplayBackend {
    /// Wraps a trace after validating it.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Trace::validate`].
    pub fn new(trace: Trace) -> Result<Self, BackendError> {
        trace.validate()?;
        Ok(Self { trace })
    }

    /// Loads the trace at `path`.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Trace::load`].
    pub fn from_path(path: &Path) -> Result<Self, BackendError> {
        Ok(Self {
            trace: Trace::load(path)?,
        })
    }

    /// The replayed trace.
    #[must_use]
    pub fn trace(&self) -> &Trace {
        &self.trace
    }
}

impl GeometryBackend for ReplayBackend {
    type Closure = ReplayClosure;

    fn build_surface(&self, weights: &TriangleWeights) -> Result<ReplaySurface, BackendError> {
        let requested = weights.as_array();
        if requested != self.trace.angles {
            return Err(BackendError::TraceMismatch {
                recorded: self.trace.angles,
                requested,
            });
        }
        Ok(ReplaySurface {
            weights: *weights,
            description: self.trace.surface.clone(),
        })
    }

    fn orbit_closure(&self, surface: ReplaySurface) -> Result<ReplayClosure, BackendError> {
        let absolute = LinearMap::new(
            self.trace.period_dimension,
            self.trace.absolute_projection.clone(),
        )?;
        let mut tangent = TangentSpace::new(self.trace.period_dimension, absolute)?;
        for v in &self.trace.tangent_space {
            tangent.insert(v)?;
        }

        let mut directions = self.trace.decompositions.clone();
        directions.sort_by(|a, b| a.length.total_cmp(&b.length));

        Ok(ReplayClosure {
            surface,
            tangent,
            directions,
        })
    }
}

/// The surface of a replayed trace.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySurface {
    weights: TriangleWeights,
    description: String,
}

impl ReplaySurface {
    /// The triangle this surface unfolds.
    #[must_use]
    pub fn weights(&self) -> TriangleWeights {
        self.weights
    }
}

impl fmt::Display for ReplaySurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Orbit closure state of a replayed trace.
#[derive(Debug, Clone)]
pub struct ReplayClosure {
    surface: ReplaySurface,
    tangent: TangentSpace,
    directions: Vec<RecordedDirection>,
}

impl OrbitClosure for ReplayClosure {
    type Surface = ReplaySurface;
    type Decomposition = ReplayDecomposition;
    type Decompositions = std::vec::IntoIter<ReplayDecomposition>;

    fn surface(&self) -> &ReplaySurface {
        &self.surface
    }

    fn tangent_space_dimension(&self) -> usize {
        self.tangent.dimension()
    }

    fn absolute_dimension(&self) -> usize {
        self.tangent.absolute_dimension()
    }

    fn decompositions(&self, bound: Bound) -> Self::Decompositions {
        let limit = bound.squared() * (1.0 + TOLERANCE);
        self.directions
            .iter()
            .filter(|record| record.length * record.length <= limit)
            .cloned()
            .map(|record| ReplayDecomposition {
                record,
                decomposed: false,
            })
            .collect::<Vec<_>>()
            .into_iter()
    }

    fn update_tangent_space(
        &mut self,
        decomposition: &ReplayDecomposition,
    ) -> Result<(), BackendError> {
        if !decomposition.decomposed {
            return Err(BackendError::Malformed(format!(
                "direction {} must be decomposed before it can update the tangent space",
                decomposition.direction()
            )));
        }
        for v in &decomposition.record.tangent_vectors {
            let grew = self.tangent.insert(v)?;
            debug!(
                direction = %decomposition.direction(),
                grew,
                dimension = self.tangent.dimension(),
                "tangent vector"
            );
        }
        Ok(())
    }
}

/// One replayed direction.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayDecomposition {
    record: RecordedDirection,
    decomposed: bool,
}

impl FlowDecomposition for ReplayDecomposition {
    fn direction(&self) -> Direction {
        self.record.direction
    }

    fn decompose(&mut self) -> Result<(), BackendError> {
        self.decomposed = true;
        Ok(())
    }

    fn counts(&self) -> ComponentCounts {
        if self.decomposed {
            ComponentCounts {
                cylinders: self.record.cylinders,
                minimal: self.record.minimal,
                undetermined: self.record.undetermined,
            }
        } else {
            ComponentCounts {
                cylinders: 0,
                minimal: 0,
                undetermined: self.record.components(),
            }
        }
    }

    fn is_parabolic(&self) -> bool {
        self.record.parabolic
    }
}
