//! Run configuration, validated before any computation starts.

use std::path::{Path, PathBuf};

use flatsurf_stratum::TriangleWeights;
use serde::{Deserialize, Serialize};

use crate::error::SurveyError;

/// Default bound on the length of sampled saddle connections.
pub const DEFAULT_BOUND: u32 = 10;

/// Default directory searched for recorded traces.
pub const DEFAULT_TRACE_DIR: &str = "traces";

/// Bound on the length of the saddle connections whose directions are sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Bound(u32);

impl Bound {
    /// Validates a bound.
    ///
    /// # Errors
    ///
    /// Returns [`SurveyError::InvalidBound`] unless `1 ≤ bound ≤ u32::MAX`.
    pub fn new(bound: i64) -> Result<Self, SurveyError> {
        match u32::try_from(bound) {
            Ok(b) if b > 0 => Ok(Self(b)),
            _ => Err(SurveyError::InvalidBound(bound)),
        }
    }

    /// The bound itself.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Squared bound; lengths are compared squared.
    #[must_use]
    pub fn squared(self) -> f64 {
        f64::from(self.0) * f64::from(self.0)
    }
}

impl Default for Bound {
    fn default() -> Self {
        Self(DEFAULT_BOUND)
    }
}

impl TryFrom<i64> for Bound {
    type Error = SurveyError;

    fn try_from(bound: i64) -> Result<Self, Self::Error> {
        Self::new(bound)
    }
}

impl From<Bound> for u32 {
    fn from(bound: Bound) -> Self {
        bound.0
    }
}

impl std::fmt::Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated survey request.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyConfig {
    /// The triangle.
    pub weights: TriangleWeights,
    /// Sampling bound.
    pub bound: Bound,
    /// Recorded decomposition trace to replay.
    pub trace: PathBuf,
}

impl SurveyConfig {
    /// Validates raw command-line values.
    ///
    /// Without an explicit `trace`, the trace is looked up as
    /// `<trace_dir>/<a>-<b>-<c>.json`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error ([`SurveyError::is_configuration`]) for
    /// malformed weights or a non-positive bound.
    pub fn from_args(
        angles: &[i64],
        bound: i64,
        trace: Option<PathBuf>,
        trace_dir: &Path,
    ) -> Result<Self, SurveyError> {
        let weights = TriangleWeights::from_slice(angles)?;
        let bound = Bound::new(bound)?;
        let trace = trace.unwrap_or_else(|| default_trace_path(trace_dir, &weights));
        Ok(Self {
            weights,
            bound,
            trace,
        })
    }
}

/// `<dir>/<a>-<b>-<c>.json`.
#[must_use]
pub fn default_trace_path(dir: &Path, weights: &TriangleWeights) -> PathBuf {
    let [a, b, c] = weights.as_array();
    dir.join(format!("{a}-{b}-{c}.json"))
}
