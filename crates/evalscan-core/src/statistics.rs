//! Aggregate score statistics.
//!
//! Groups scored evaluations by course and by instructor and averages each
//! score field over the evaluations where it is available. These aggregates
//! are what course and instructor comparisons are drawn from.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::score::{EvaluationScores, ScoreField};

/// Aggregate statistics across all scored evaluations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateStats {
    /// Keyed by "DEPT NUMBER".
    pub per_course: BTreeMap<String, GroupStats>,
    /// Keyed by instructor name.
    pub per_instructor: BTreeMap<String, GroupStats>,
}

/// Statistics for one course or instructor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupStats {
    /// Number of evaluations in the group.
    pub evaluations: usize,
    /// Mean of each score field over evaluations where it was available.
    pub mean_scores: BTreeMap<ScoreField, f64>,
}

impl GroupStats {
    pub fn mean(&self, field: ScoreField) -> Option<f64> {
        self.mean_scores.get(&field).copied()
    }
}

#[derive(Default)]
struct Accumulator {
    evaluations: usize,
    sums: BTreeMap<ScoreField, (f64, usize)>,
}

impl Accumulator {
    fn add(&mut self, scores: &EvaluationScores) {
        self.evaluations += 1;
        for field in ScoreField::ALL {
            if let Some(v) = scores.get(field).and_then(|s| s.value()) {
                let entry = self.sums.entry(field).or_insert((0.0, 0));
                entry.0 += v;
                entry.1 += 1;
            }
        }
    }

    fn finish(self) -> GroupStats {
        GroupStats {
            evaluations: self.evaluations,
            mean_scores: self
                .sums
                .into_iter()
                .map(|(field, (sum, n))| (field, sum / n as f64))
                .collect(),
        }
    }
}

/// Compute per-course and per-instructor statistics.
///
/// Evaluations without a course header are left out of the per-course
/// grouping; each listed instructor is credited with the evaluation.
pub fn compute_aggregate_stats(scores: &[EvaluationScores]) -> AggregateStats {
    let mut courses: BTreeMap<String, Accumulator> = BTreeMap::new();
    let mut instructors: BTreeMap<String, Accumulator> = BTreeMap::new();

    for s in scores {
        if let Some(label) = s.course_label() {
            courses.entry(label).or_default().add(s);
        }
        for name in &s.instructors {
            instructors.entry(name.clone()).or_default().add(s);
        }
    }

    AggregateStats {
        per_course: courses.into_iter().map(|(k, a)| (k, a.finish())).collect(),
        per_instructor: instructors
            .into_iter()
            .map(|(k, a)| (k, a.finish()))
            .collect(),
    }
}
