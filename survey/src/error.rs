//! Error taxonomy of a survey run.
//!
//! Nothing is recovered silently: every variant terminates the run.

use std::path::PathBuf;

use flatsurf_stratum::{StratumError, WeightsError};
use thiserror::Error;

/// Failures reported by a geometry backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// A trace file could not be read.
    #[error("cannot read trace {path}: {source}")]
    Io {
        /// Trace location.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A trace file is not valid JSON for the trace schema.
    #[error("cannot parse trace {path}: {source}")]
    Parse {
        /// Trace location.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// A trace recorded for another triangle.
    #[error("trace was recorded for {recorded:?}, not for {requested:?}")]
    TraceMismatch {
        /// Weights stored in the trace.
        recorded: [u64; 3],
        /// Weights asked for.
        requested: [u64; 3],
    },
    /// A vector whose length does not match the period coordinates.
    #[error("{context}: expected a vector of length {expected}, got {found}")]
    DimensionMismatch {
        /// Where the vector came from.
        context: String,
        /// Number of period coordinates.
        expected: usize,
        /// Length of the offending vector.
        found: usize,
    },
    /// Any other inconsistency in the backend's data.
    #[error("malformed backend data: {0}")]
    Malformed(String),
}

/// Root error of a survey run.
#[derive(Debug, Error)]
pub enum SurveyError {
    /// Malformed triangle weights.
    #[error("invalid triangle: {0}")]
    Weights(#[from] WeightsError),
    /// The sampling bound must be positive.
    #[error("invalid bound {0}: the bound on saddle connection length must be a positive integer")]
    InvalidBound(i64),
    /// The predicted cone angles do not form a stratum.
    #[error("cannot build the ambient stratum: {0}")]
    Stratum(#[from] StratumError),
    /// A direction could not be fully decomposed.
    #[error(
        "direction {direction} has {undetermined} undetermined component(s); \
         the bound {bound} is too small for this triangle, rerun with a larger --bound"
    )]
    Undetermined {
        /// The offending direction, formatted.
        direction: String,
        /// Number of undetermined components.
        undetermined: usize,
        /// Bound in effect.
        bound: u32,
    },
    /// The geometry backend failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl SurveyError {
    /// True for malformed input detected before any computation.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, SurveyError::Weights(_) | SurveyError::InvalidBound(_))
    }

    /// True for an undetermined component found mid-run.
    #[must_use]
    pub fn is_consistency(&self) -> bool {
        matches!(self, SurveyError::Undetermined { .. })
    }
}
