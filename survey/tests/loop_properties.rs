//! Property tests of the survey loop over generated traces.

use std::path::PathBuf;

use flatsurf_survey::replay::RecordedDirection;
use flatsurf_survey::{
    run_survey, Direction, ReplayBackend, SurveyConfig, SurveyEvent, Trace,
};
use proptest::prelude::*;

const PERIOD_DIMENSION: usize = 4;

/// One generated direction: counts, parabolicity, and the coordinate axis
/// its tangent vector points along (if any).
type Row = (usize, usize, bool, Option<usize>);

fn unit(axis: usize) -> Vec<f64> {
    let mut v = vec![0.0; PERIOD_DIMENSION];
    v[axis] = 1.0;
    v
}

fn trace(initial: &[usize], rows: &[Row]) -> Trace {
    let decompositions = rows
        .iter()
        .enumerate()
        .map(|(i, &(cylinders, minimal, parabolic, axis))| {
            // Distinct slopes, increasing length.
            let direction = Direction::new(i as f64 + 1.0, 1.0);
            RecordedDirection {
                direction,
                length: direction.length_squared().sqrt(),
                cylinders,
                minimal,
                undetermined: 0,
                parabolic,
                tangent_vectors: axis.into_iter().map(unit).collect(),
            }
        })
        .collect();
    Trace {
        angles: [1, 1, 1],
        surface: "generated".into(),
        period_dimension: PERIOD_DIMENSION,
        absolute_projection: vec![unit(0), unit(1)],
        tangent_space: initial.iter().copied().map(unit).collect(),
        decompositions,
    }
}

fn row() -> impl Strategy<Value = Row> {
    (
        0usize..3,
        0usize..3,
        any::<bool>(),
        prop::option::of(0..PERIOD_DIMENSION),
    )
        .prop_map(|(c, m, p, axis)| (if c + m == 0 { 1 } else { c }, m, p, axis))
}

proptest! {
    #[test]
    fn loop_matches_a_direct_fold(
        initial in prop::collection::btree_set(0..PERIOD_DIMENSION, 0..3),
        rows in prop::collection::vec(row(), 0..20),
    ) {
        let initial: Vec<usize> = initial.into_iter().collect();
        let backend = ReplayBackend::new(trace(&initial, &rows)).unwrap();
        let config = SurveyConfig::from_args(&[1, 1, 1], 1000, Some(PathBuf::new()), &PathBuf::new())
            .unwrap();

        let mut events = Vec::new();
        let report = run_survey(&backend, &config, |e| events.push(e.clone())).unwrap();
        let result = report.result;

        prop_assert_eq!(result.samples, rows.len());

        let c = result.classification;
        prop_assert_eq!(c.sc_periodic, rows.iter().all(|r| r.1 != 0));
        prop_assert_eq!(c.cyl_periodic, rows.iter().all(|r| r.0 == 0 || r.1 == 0));
        prop_assert_eq!(c.parabolic, rows.iter().all(|r| r.0 == 0 || r.2));

        let mut axes: std::collections::BTreeSet<usize> = initial.iter().copied().collect();
        axes.extend(rows.iter().filter_map(|r| r.3));
        prop_assert_eq!(result.closure_dimension, axes.len());
        prop_assert_eq!(result.absolute_dimension, axes.iter().filter(|&&a| a < 2).count());

        let growth: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                SurveyEvent::NewTangentVector { dimension } => Some(*dimension),
                _ => None,
            })
            .collect();
        prop_assert_eq!(growth.len(), axes.len() - initial.len());
        prop_assert!(growth.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(growth.iter().all(|&d| d > initial.len()));
    }

    #[test]
    fn bound_selects_a_prefix(
        rows in prop::collection::vec(row(), 1..12),
        bound in 1i64..15,
    ) {
        let backend = ReplayBackend::new(trace(&[], &rows)).unwrap();
        let config = SurveyConfig::from_args(&[1, 1, 1], bound, Some(PathBuf::new()), &PathBuf::new())
            .unwrap();
        let report = run_survey(&backend, &config, |_| {}).unwrap();

        let expected = (1..=rows.len())
            .filter(|&k| (k * k + 1) as i64 <= bound * bound)
            .count();
        prop_assert_eq!(report.result.samples, expected);
    }
}
