//! Numeric survey of the `GL(2,R)`-orbit closure of a triangle billiard.
//!
//! A survey brackets the orbit closure of the unfolding of a triangle:
//!
//! - from above by the ambient stratum predicted from the angles alone
//!   ([`flatsurf_stratum::predict`]);
//! - from below by the tangent space grown from flow decompositions in the
//!   directions of short saddle connections ([`survey::run`]).
//!
//! Along the way it records whether every sampled direction was periodic and
//! parabolic.
//!
//! # Entry Point
//!
//! ```no_run
//! use std::path::Path;
//! use flatsurf_survey::{run_survey, ReplayBackend, SurveyConfig};
//!
//! let config = SurveyConfig::from_args(&[1, 1, 1], 5, None, Path::new("traces"))
//!     .expect("valid configuration");
//! let backend = ReplayBackend::from_path(&config.trace).expect("readable trace");
//! let report = run_survey(&backend, &config, |_| {}).expect("survey completes");
//! println!("{}", report.summary());
//! ```
//!
//! # Pipeline
//!
//! | Step | Component |
//! |------|-----------|
//! | 1. validate weights and bound | [`config`] |
//! | 2. predict the ambient stratum | [`flatsurf_stratum::predict`] |
//! | 3. unfold and start the orbit closure | [`orbit::GeometryBackend`] |
//! | 4. drain decompositions | [`survey`] |
//! | 5. render | [`report`] |

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod config;
pub mod error;
pub mod orbit;
pub mod replay;
pub mod report;
pub mod survey;
pub mod tangent;

pub use config::{Bound, SurveyConfig, DEFAULT_BOUND, DEFAULT_TRACE_DIR};
pub use error::{BackendError, SurveyError};
pub use orbit::{ComponentCounts, Direction, FlowDecomposition, GeometryBackend, OrbitClosure};
pub use replay::{ReplayBackend, Trace};
pub use report::{Rank, Reporter, SurveyReport};
pub use survey::{ClassificationState, DimensionTracker, SurveyEvent, SurveyResult};

use tracing::info;

/// Runs a complete survey: prediction, unfolding, and the survey loop.
///
/// Events are passed to `on_event` as they happen; the returned report holds
/// the final numbers.
///
/// # Errors
///
/// Returns [`SurveyError::Stratum`] if the prediction fails,
/// [`SurveyError::Backend`] if the backend cannot unfold the triangle or
/// rejects a decomposition, and [`SurveyError::Undetermined`] if a sampled
/// direction cannot be fully decomposed.
pub fn run_survey<B: GeometryBackend>(
    backend: &B,
    config: &SurveyConfig,
    mut on_event: impl FnMut(&SurveyEvent),
) -> Result<SurveyReport, SurveyError> {
    let prediction = flatsurf_stratum::predict(&config.weights)?;
    info!(
        weights = %config.weights,
        stratum = %prediction.stratum,
        dimension = prediction.stratum.dimension(),
        "predicted ambient locus"
    );

    on_event(&SurveyEvent::Unfolding {
        angles: config.weights.as_array(),
    });
    let surface = backend.build_surface(&config.weights)?;
    let mut closure = backend.orbit_closure(surface)?;
    on_event(&SurveyEvent::SurfaceBuilt {
        surface: closure.surface().to_string(),
    });

    let result = survey::survey(&mut closure, config.bound, &mut on_event)?;
    info!(
        samples = result.samples,
        closure_dimension = result.closure_dimension,
        absolute_dimension = result.absolute_dimension,
        "survey finished"
    );

    Ok(SurveyReport::new(
        config.weights,
        config.bound,
        prediction.stratum,
        result,
    ))
}
