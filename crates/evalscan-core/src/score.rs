//! Likert score aggregation.
//!
//! Reduces the raw percentage-block lines collected for one category into a
//! single number on a 0–100 scale, where 0 means every respondent answered
//! "Strongly Disagree" and 100 means every respondent answered "Strongly Agree".
//!
//! For a five-token line `[p0..p4]` the weighted score is
//! `p0 + 2·p1 + 3·p2 + 4·p3 + 5·p4` out of a possible `5·Σp`. A six-token
//! line carries an N/A share first, which is left out of both.

use serde::Serialize;

use crate::model::{Category, EvaluationRecord};
use crate::percent::extract_percentages;

/// A category score, or the explicit marker that none could be computed.
///
/// Serializes as a number, or `null` when unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "Option<f64>")]
pub enum ScoreResult {
    Available(f64),
    Unavailable,
}

impl ScoreResult {
    pub fn value(self) -> Option<f64> {
        match self {
            ScoreResult::Available(v) => Some(v),
            ScoreResult::Unavailable => None,
        }
    }

    pub fn is_available(self) -> bool {
        matches!(self, ScoreResult::Available(_))
    }
}

impl From<ScoreResult> for Option<f64> {
    fn from(score: ScoreResult) -> Self {
        score.value()
    }
}

/// Weighted score and possible score for one line.
fn weigh(values: &[u32]) -> Option<(u64, u64)> {
    let rated = match values.len() {
        6 => &values[1..],
        5 => values,
        _ => return None,
    };
    let weighted = rated
        .iter()
        .zip(1u64..)
        .map(|(&p, w)| u64::from(p) * w)
        .sum();
    let possible = rated.iter().map(|&p| u64::from(p)).sum::<u64>() * 5;
    Some((weighted, possible))
}

/// Round to one decimal place. Ties on the exact binary value go to the
/// even digit.
fn round_one_decimal(x: f64) -> f64 {
    format!("{x:.1}").parse().unwrap_or(x)
}

/// Compute the score for one category's percentage-block lines.
///
/// Any line without exactly five or six percentages makes the whole category
/// unavailable, as does a zero total across all lines.
pub fn compute_category_score<S: AsRef<str>>(lines: &[S]) -> ScoreResult {
    let mut total_weighted = 0u64;
    let mut total_possible = 0u64;

    for line in lines {
        let values = extract_percentages(line.as_ref());
        let Some((weighted, possible)) = weigh(&values) else {
            tracing::trace!(
                "category line has {} percentage(s), score unavailable: {:?}",
                values.len(),
                line.as_ref()
            );
            return ScoreResult::Unavailable;
        };
        total_weighted += weighted;
        total_possible += possible;
    }

    if total_possible == 0 {
        return ScoreResult::Unavailable;
    }

    ScoreResult::Available(round_one_decimal(
        total_weighted as f64 / total_possible as f64 * 100.0,
    ))
}

/// The score fields derived from one evaluation record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationScores {
    pub unique_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dept: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub instructors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor_score: Option<ScoreResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignments_score: Option<ScoreResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tests_score: Option<ScoreResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<ScoreResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readings_score: Option<ScoreResult>,
}

/// Which score field a category feeds. `The_Course` has no score field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreField {
    InstructorScore,
    AssignmentsScore,
    TestsScore,
    OverallScore,
    ReadingsScore,
}

impl ScoreField {
    pub const ALL: [ScoreField; 5] = [
        ScoreField::InstructorScore,
        ScoreField::AssignmentsScore,
        ScoreField::TestsScore,
        ScoreField::OverallScore,
        ScoreField::ReadingsScore,
    ];

    pub fn category(self) -> Category {
        match self {
            ScoreField::InstructorScore => Category::Instructor,
            ScoreField::AssignmentsScore => Category::Assignments,
            ScoreField::TestsScore => Category::Tests,
            ScoreField::OverallScore => Category::Overall,
            ScoreField::ReadingsScore => Category::Readings,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScoreField::InstructorScore => "instructor_score",
            ScoreField::AssignmentsScore => "assignments_score",
            ScoreField::TestsScore => "tests_score",
            ScoreField::OverallScore => "overall_score",
            ScoreField::ReadingsScore => "readings_score",
        }
    }
}

impl EvaluationScores {
    pub fn get(&self, field: ScoreField) -> Option<ScoreResult> {
        match field {
            ScoreField::InstructorScore => self.instructor_score,
            ScoreField::AssignmentsScore => self.assignments_score,
            ScoreField::TestsScore => self.tests_score,
            ScoreField::OverallScore => self.overall_score,
            ScoreField::ReadingsScore => self.readings_score,
        }
    }

    /// "DEPT NUMBER" label, if both header fields were found.
    pub fn course_label(&self) -> Option<String> {
        match (&self.dept, &self.course_number) {
            (Some(dept), Some(number)) => Some(format!("{dept} {number}")),
            _ => None,
        }
    }
}

/// Score every rated category of a record.
///
/// Categories that are absent or empty produce no score at all, which is
/// different from a score that is unavailable.
pub fn score_record(record: &EvaluationRecord) -> EvaluationScores {
    let score = |field: ScoreField| {
        record
            .category(field.category())
            .filter(|lines| !lines.is_empty())
            .map(compute_category_score)
    };

    EvaluationScores {
        unique_id: record.unique_id,
        dept: record.dept.clone(),
        course_number: record.course_number.clone(),
        course: record.course.clone(),
        instructors: record.instructors.clone().unwrap_or_default(),
        year: record.year.clone(),
        instructor_score: score(ScoreField::InstructorScore),
        assignments_score: score(ScoreField::AssignmentsScore),
        tests_score: score(ScoreField::TestsScore),
        overall_score: score(ScoreField::OverallScore),
        readings_score: score(ScoreField::ReadingsScore),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn line(values: &[u32]) -> String {
        let tokens: Vec<String> = values.iter().map(|v| format!("{v}%")).collect();
        format!("Statement. {}", tokens.join(" "))
    }

    /// Round the exact binary value of `x` to tenths, ties to even.
    fn tenths_half_even(x: f64) -> f64 {
        let bits = x.to_bits();
        let exp = ((bits >> 52) & 0x7ff) as i32;
        let mantissa = u128::from((bits & ((1u64 << 52) - 1)) | (1u64 << 52));
        let shift = 1075 - exp;
        let scaled = mantissa * 10;
        let tenths = if shift <= 0 {
            scaled << -shift
        } else {
            let quotient = scaled >> shift;
            let remainder = scaled & ((1u128 << shift) - 1);
            let half = 1u128 << (shift - 1);
            if remainder > half || (remainder == half && quotient % 2 == 1) {
                quotient + 1
            } else {
                quotient
            }
        };
        tenths as f64 / 10.0
    }

    proptest! {
        /// Property: a five-token score follows the closed form and stays in range.
        #[test]
        fn five_token_closed_form(p in prop::collection::vec(0u32..=100, 5)) {
            let sum: u32 = p.iter().sum();
            prop_assume!(sum > 0);
            let weighted = p[0] + 2 * p[1] + 3 * p[2] + 4 * p[3] + 5 * p[4];
            let ratio = f64::from(weighted) / f64::from(5 * sum) * 100.0;
            let expected = tenths_half_even(ratio);
            let score = compute_category_score(&[line(&p)]);
            prop_assert_eq!(score, ScoreResult::Available(expected));
            let v = score.value().unwrap();
            prop_assert!((0.0..=100.0).contains(&v));
        }

        /// Property: the N/A share never changes a six-token score.
        #[test]
        fn na_share_is_ignored(na in 0u32..=100, p in prop::collection::vec(0u32..=100, 5)) {
            prop_assume!(p.iter().sum::<u32>() > 0);
            let mut with_na = vec![na];
            with_na.extend(&p);
            let mut zero_na = vec![0];
            zero_na.extend(&p);
            let six = compute_category_score(&[line(&with_na)]);
            prop_assert_eq!(six, compute_category_score(&[line(&zero_na)]));
            prop_assert_eq!(six, compute_category_score(&[line(&p)]));
        }

        /// Property: an all-zero category is unavailable however many lines it has.
        #[test]
        fn all_zero_unavailable(lines in 1usize..8, six in any::<bool>()) {
            let zeros = if six { vec![0; 6] } else { vec![0; 5] };
            let lines: Vec<String> = (0..lines).map(|_| line(&zeros)).collect();
            prop_assert_eq!(compute_category_score(&lines), ScoreResult::Unavailable);
        }
    }
}
