//! The survey loop.
//!
//! Drains a bounded sequence of flow decompositions, one at a time. Each
//! sample refines three running classifications and feeds the orbit
//! closure's tangent space; the tangent space dimension is a lower bound on
//! the dimension of the orbit closure.
//!
//! Progress is reported as [`SurveyEvent`] values passed to a caller-owned
//! sink; nothing here writes to the console.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Bound;
use crate::error::SurveyError;
use crate::orbit::{ComponentCounts, Direction, FlowDecomposition, OrbitClosure};

/// Running periodicity and parabolicity classifications.
///
/// All flags start `true` and can only ever become `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationState {
    /// No sampled direction is free of minimal components.
    pub sc_periodic: bool,
    /// Every sampled direction with a cylinder is completely periodic.
    pub cyl_periodic: bool,
    /// Every sampled direction with a cylinder is parabolic.
    pub parabolic: bool,
}

impl Default for ClassificationState {
    fn default() -> Self {
        Self {
            sc_periodic: true,
            cyl_periodic: true,
            parabolic: true,
        }
    }
}

impl ClassificationState {
    /// Whether a further sample can still change a flag.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.sc_periodic || self.cyl_periodic || self.parabolic
    }

    /// Folds one decomposed direction into the flags.
    ///
    /// Both periodicity updates read the flags as they were before this
    /// sample. `is_parabolic` is only consulted for a direction with
    /// cylinders while `parabolic` still holds.
    pub fn observe(&mut self, counts: ComponentCounts, is_parabolic: impl FnOnce() -> bool) {
        if !self.is_open() {
            return;
        }
        let ComponentCounts {
            cylinders, minimal, ..
        } = counts;
        let before = *self;
        self.cyl_periodic = before.cyl_periodic && (cylinders == 0 || minimal == 0);
        self.sc_periodic = before.sc_periodic && minimal != 0;
        if cylinders > 0 && before.parabolic {
            self.parabolic = is_parabolic();
        }
    }
}

/// The best lower bound on the orbit closure dimension seen so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionTracker {
    dimension: usize,
}

impl DimensionTracker {
    /// Starts at the closure's initial tangent space dimension.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> usize {
        self.dimension
    }

    /// Records a freshly read dimension. Returns the new value exactly when
    /// it strictly exceeds the previous one; a smaller reading is ignored.
    pub fn record(&mut self, dimension: usize) -> Option<usize> {
        if dimension > self.dimension {
            self.dimension = dimension;
            Some(dimension)
        } else {
            if dimension < self.dimension {
                warn!(
                    tracked = self.dimension,
                    reported = dimension,
                    "tangent space dimension decreased; keeping the larger value"
                );
            }
            None
        }
    }
}

/// Progress of a survey run, in the order it happens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SurveyEvent {
    /// The triangle is about to be unfolded.
    Unfolding {
        /// Triangle angle weights.
        angles: [u64; 3],
    },
    /// The unfolding is available.
    SurfaceBuilt {
        /// Printable description of the surface.
        surface: String,
    },
    /// A direction is about to be decomposed.
    Investigating {
        /// Position in the sample sequence, from 0.
        index: usize,
        /// The direction.
        direction: Direction,
    },
    /// A direction was decomposed.
    Decomposed {
        /// The direction.
        direction: Direction,
        /// Number of cylinders.
        cylinders: usize,
        /// Number of minimal components.
        minimal: usize,
    },
    /// The tangent space dimension strictly increased.
    NewTangentVector {
        /// New dimension.
        dimension: usize,
    },
}

/// Outcome of the survey loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyResult {
    /// Number of directions processed.
    pub samples: usize,
    /// Final tangent space dimension, a lower bound on the closure dimension.
    pub closure_dimension: usize,
    /// Dimension of the tangent space's projection to absolute cohomology.
    pub absolute_dimension: usize,
    /// Final classifications.
    pub classification: ClassificationState,
}

/// Runs the survey over the decompositions the closure hands out up to `bound`.
///
/// # Errors
///
/// See [`run`].
pub fn survey<C: OrbitClosure>(
    closure: &mut C,
    bound: Bound,
    on_event: impl FnMut(&SurveyEvent),
) -> Result<SurveyResult, SurveyError> {
    let decompositions = closure.decompositions(bound);
    run(closure, decompositions, bound, on_event)
}

/// Runs the survey over an explicit sequence of decompositions.
///
/// `bound` is only used in the diagnostic of an undetermined component.
///
/// # Errors
///
/// Returns [`SurveyError::Undetermined`] as soon as a decomposed direction
/// still has undetermined components, and [`SurveyError::Backend`] if the
/// closure rejects a decomposition. No result is produced in either case.
pub fn run<C, I>(
    closure: &mut C,
    decompositions: I,
    bound: Bound,
    mut on_event: impl FnMut(&SurveyEvent),
) -> Result<SurveyResult, SurveyError>
where
    C: OrbitClosure,
    I: IntoIterator<Item = C::Decomposition>,
{
    let mut classification = ClassificationState::default();
    let mut dimension = DimensionTracker::new(closure.tangent_space_dimension());
    let mut samples = 0;

    for (index, mut decomposition) in decompositions.into_iter().enumerate() {
        let direction = decomposition.direction();
        on_event(&SurveyEvent::Investigating { index, direction });

        decomposition.decompose()?;
        let counts = decomposition.counts();
        if counts.undetermined != 0 {
            return Err(SurveyError::Undetermined {
                direction: direction.to_string(),
                undetermined: counts.undetermined,
                bound: bound.get(),
            });
        }
        on_event(&SurveyEvent::Decomposed {
            direction,
            cylinders: counts.cylinders,
            minimal: counts.minimal,
        });

        classification.observe(counts, || decomposition.is_parabolic());
        debug!(
            %direction,
            cylinders = counts.cylinders,
            minimal = counts.minimal,
            ?classification,
            "decomposed"
        );

        closure.update_tangent_space(&decomposition)?;
        if let Some(new) = dimension.record(closure.tangent_space_dimension()) {
            info!(dimension = new, %direction, "new tangent vector");
            on_event(&SurveyEvent::NewTangentVector { dimension: new });
        }
        samples += 1;
    }

    Ok(SurveyResult {
        samples,
        closure_dimension: dimension.get(),
        absolute_dimension: closure.absolute_dimension(),
        classification,
    })
}
