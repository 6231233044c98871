//! Ambient stratum prediction for rational triangle billiards.
//!
//! A triangle with angles `(aπ/n, bπ/n, cπ/n)`, `n = a + b + c`, unfolds to a
//! translation surface. The cone angles of that surface are determined by the
//! three angle weights alone, which pins down the stratum the unfolding lives
//! in. This stratum is an upper bound for the `GL(2,R)`-orbit closure of the
//! unfolding.
//!
//! # Entry Point
//!
//! ```
//! use flatsurf_stratum::{predict, DifferentialKind, TriangleWeights};
//!
//! let weights = TriangleWeights::new(1, 1, 1).expect("coprime weights");
//! let prediction = predict(&weights).expect("valid stratum");
//! assert_eq!(prediction.stratum.kind(), DifferentialKind::Abelian);
//! assert_eq!(prediction.stratum.to_string(), "H_1(0^3)");
//! assert_eq!(prediction.stratum.dimension(), 4);
//! ```
//!
//! # Stratum naming
//!
//! | Kind | Name | Dimension |
//! |------|------|-----------|
//! | Abelian | `H_g(k1, ..., kn)`, `Σ kᵢ = 2g − 2` | `2g + n − 1` |
//! | Quadratic | `Q_g(k1, ..., kn)`, `Σ kᵢ = 4g − 4` | `2g + n − 2` |

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod fraction;
pub mod predict;
pub mod stratum;
pub mod weights;

pub use fraction::{gcd, AngleFraction};
pub use predict::{predict, ConeAngles, Prediction};
pub use stratum::{DifferentialKind, Stratum, StratumError};
pub use weights::{TriangleWeights, WeightsError, MAX_SCALE};
