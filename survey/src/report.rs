//! Rendering of survey progress and the final summary.

use std::fmt;
use std::io::{self, Write};

use flatsurf_stratum::{Stratum, TriangleWeights};
use serde::Serialize;

use crate::config::Bound;
use crate::survey::{SurveyEvent, SurveyResult};

/// Half of the absolute dimension, printed exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct Rank {
    absolute_dimension: usize,
}

impl Rank {
    /// The rank of a closure with the given absolute dimension.
    #[must_use]
    pub fn from_absolute_dimension(absolute_dimension: usize) -> Self {
        Self { absolute_dimension }
    }
}

impl From<Rank> for String {
    fn from(rank: Rank) -> Self {
        rank.to_string()
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.absolute_dimension;
        if d % 2 == 0 {
            write!(f, "{}", d / 2)
        } else {
            write!(f, "{d}/2")
        }
    }
}

/// Everything a finished run reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyReport {
    /// The triangle.
    pub weights: TriangleWeights,
    /// The sampling bound.
    pub bound: Bound,
    /// Predicted ambient stratum.
    pub ambient_locus: Stratum,
    /// Dimension of the ambient stratum.
    pub ambient_dimension: u64,
    /// Outcome of the survey loop.
    pub result: SurveyResult,
    /// `absolute_dimension / 2`.
    pub rank: Rank,
}

impl SurveyReport {
    /// Assembles a report.
    #[must_use]
    pub fn new(
        weights: TriangleWeights,
        bound: Bound,
        ambient_locus: Stratum,
        result: SurveyResult,
    ) -> Self {
        Self {
            weights,
            bound,
            ambient_dimension: ambient_locus.dimension(),
            ambient_locus,
            rank: Rank::from_absolute_dimension(result.absolute_dimension),
            result,
        }
    }

    /// The multi-line human-readable summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let c = &self.result.classification;
        format!(
            "Up to bound {} on the length of saddle connection\n\
             ambient locus: {} (of dimension {})\n\
             orbit closure dimension: {}\n\
             rank: {}\n\
             saddle connection completely periodic: {}\n\
             cylinder completely periodic: {}\n\
             parabolic: {}\n",
            self.bound,
            self.ambient_locus,
            self.ambient_dimension,
            self.result.closure_dimension,
            self.rank,
            c.sc_periodic,
            c.cyl_periodic,
            c.parabolic,
        )
    }
}

/// Writes survey output line by line.
///
/// An `Investigating` line is left open and completed by the matching
/// `Decomposed` event, so progress stays visible while a direction is being
/// decomposed.
pub struct Reporter<W: Write> {
    out: W,
}

impl<W: Write> Reporter<W> {
    /// A reporter writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Renders one event.
    ///
    /// # Errors
    ///
    /// Returns any error of the underlying writer.
    pub fn event(&mut self, event: &SurveyEvent) -> io::Result<()> {
        match event {
            SurveyEvent::Unfolding { angles } => {
                let [a, b, c] = angles;
                writeln!(self.out, "Unfolding [{a}, {b}, {c}]")
            }
            SurveyEvent::SurfaceBuilt { surface } => writeln!(self.out, "{surface}"),
            SurveyEvent::Investigating { direction, .. } => {
                write!(self.out, "Investigating in direction {direction} ")?;
                self.out.flush()
            }
            SurveyEvent::Decomposed {
                cylinders, minimal, ..
            } => writeln!(
                self.out,
                "decomposes into {cylinders} cylinders and {minimal} minimal components"
            ),
            SurveyEvent::NewTangentVector { dimension } => {
                writeln!(self.out, "NEW TANGENT VECTOR: dim={dimension}")
            }
        }
    }

    /// Renders the final summary.
    ///
    /// # Errors
    ///
    /// Returns any error of the underlying writer.
    pub fn summary(&mut self, report: &SurveyReport) -> io::Result<()> {
        self.out.write_all(report.summary().as_bytes())?;
        self.out.flush()
    }

    /// Renders the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns any error of the underlying writer or of serialization.
    pub fn json(&mut self, report: &SurveyReport) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut self.out, report)?;
        writeln!(self.out)
    }

    /// Gives the writer back.
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use flatsurf_stratum::DifferentialKind;

    use super::*;
    use crate::orbit::Direction;
    use crate::survey::ClassificationState;

    fn report(absolute_dimension: usize) -> SurveyReport {
        SurveyReport::new(
            TriangleWeights::new(1, 1, 1).unwrap(),
            Bound::new(5).unwrap(),
            Stratum::new(DifferentialKind::Abelian, [(0, 3)]).unwrap(),
            SurveyResult {
                samples: 15,
                closure_dimension: 2,
                absolute_dimension,
                classification: ClassificationState {
                    sc_periodic: false,
                    cyl_periodic: true,
                    parabolic: true,
                },
            },
        )
    }

    #[test]
    fn rank_is_exact() {
        assert_eq!(Rank::from_absolute_dimension(2).to_string(), "1");
        assert_eq!(Rank::from_absolute_dimension(3).to_string(), "3/2");
        assert_eq!(Rank::from_absolute_dimension(0).to_string(), "0");
    }

    #[test]
    fn summary_lines() {
        let summary = report(2).summary();
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Up to bound 5 on the length of saddle connection",
                "ambient locus: H_1(0^3) (of dimension 4)",
                "orbit closure dimension: 2",
                "rank: 1",
                "saddle connection completely periodic: false",
                "cylinder completely periodic: true",
                "parabolic: true",
            ]
        );
    }

    #[test]
    fn progress_lines() {
        let mut reporter = Reporter::new(Vec::new());
        let direction = Direction::new(1.0, 0.0);
        for event in [
            SurveyEvent::Unfolding { angles: [1, 1, 1] },
            SurveyEvent::SurfaceBuilt {
                surface: "torus".into(),
            },
            SurveyEvent::Investigating {
                index: 0,
                direction,
            },
            SurveyEvent::Decomposed {
                direction,
                cylinders: 1,
                minimal: 0,
            },
            SurveyEvent::NewTangentVector { dimension: 3 },
        ] {
            reporter.event(&event).unwrap();
        }
        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(
            text,
            "Unfolding [1, 1, 1]\n\
             torus\n\
             Investigating in direction (1, 0) decomposes into 1 cylinders and 0 minimal components\n\
             NEW TANGENT VECTOR: dim=3\n"
        );
    }

    #[test]
    fn json_report() {
        let mut reporter = Reporter::new(Vec::new());
        reporter.json(&report(2)).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&reporter.into_inner()).unwrap();
        assert_eq!(value["weights"], serde_json::json!([1, 1, 1]));
        assert_eq!(value["bound"], 5);
        assert_eq!(value["ambient_dimension"], 4);
        assert_eq!(value["ambient_locus"]["kind"], "Abelian");
        assert_eq!(value["ambient_locus"]["genus"], 1);
        assert_eq!(value["ambient_locus"]["dimension"], 4);
        assert_eq!(value["rank"], "1");
        assert_eq!(value["result"]["closure_dimension"], 2);
        assert_eq!(value["result"]["classification"]["cyl_periodic"], true);
    }
}
