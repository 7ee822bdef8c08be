//! Core data model types for evalscan.
//!
//! An [`EvaluationRecord`] is the structured form of one raw evaluation. Every
//! field except `unique_id` is optional: a field is present only when its
//! section was located in the source text, so absence is meaningful.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named dimension rated through a percentage distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Instructor,
    Assignments,
    Tests,
    Overall,
    Readings,
    Course,
}

/// Category row labels that precede an indicator row, mapped to their category.
const CATEGORY_LABELS: &[(&str, Category)] = &[
    ("overall", Category::Overall),
    ("the tests", Category::Tests),
    ("the instructor", Category::Instructor),
    ("the assignments", Category::Assignments),
    ("the homework assignments", Category::Assignments),
    ("the readings", Category::Readings),
];

impl Category {
    /// All categories in record field order.
    pub const ALL: [Category; 6] = [
        Category::Instructor,
        Category::Assignments,
        Category::Tests,
        Category::Overall,
        Category::Readings,
        Category::Course,
    ];

    /// Look up the category introduced by a label line such as "The Instructor".
    ///
    /// `The_Course` has no label of its own; it is only reached by redirecting
    /// an open course-response block.
    pub fn from_label(label: &str) -> Option<Category> {
        let label = label.trim().to_lowercase();
        CATEGORY_LABELS
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, c)| *c)
    }

    /// The record field name for this category.
    pub fn field_name(self) -> &'static str {
        match self {
            Category::Instructor => "The_Instructor",
            Category::Assignments => "The_Assignments",
            Category::Tests => "The_Tests",
            Category::Overall => "Overall",
            Category::Readings => "The_Readings",
            Category::Course => "The_Course",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// The record field an answer block is collected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKey {
    CourseResponses,
    InstructorResponses,
    Category(Category),
}

impl ResponseKey {
    pub fn field_name(self) -> &'static str {
        match self {
            ResponseKey::CourseResponses => "course_responses",
            ResponseKey::InstructorResponses => "instructor_responses",
            ResponseKey::Category(c) => c.field_name(),
        }
    }
}

impl fmt::Display for ResponseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Yes and no counts for a yes/no question, serialized as `[yes, no]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YesNoTally(pub u32, pub u32);

impl YesNoTally {
    pub fn yes(&self) -> u32 {
        self.0
    }

    pub fn no(&self) -> u32 {
        self.1
    }
}

/// Self-reported weekly hours, kept as the numeric strings found in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyHours {
    pub low: String,
    pub avg: String,
    pub high: String,
}

/// The structured form of one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Sequential identifier, unique within one run.
    pub unique_id: u64,
    /// Four-letter department code (e.g. "MATH").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dept: Option<String>,
    /// Five-digit course number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_number: Option<String>,
    /// Course title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructors: Option<Vec<String>>,
    /// Declared number of responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_responses: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identical_courses: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    /// Free-text answers to course-quality questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_responses: Option<Vec<String>>,
    /// Free-text answers to instructor-quality questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor_responses: Option<Vec<String>>,
    /// Raw percentage-block lines per category.
    #[serde(rename = "The_Instructor", default, skip_serializing_if = "Option::is_none")]
    pub the_instructor: Option<Vec<String>>,
    #[serde(rename = "The_Assignments", default, skip_serializing_if = "Option::is_none")]
    pub the_assignments: Option<Vec<String>>,
    #[serde(rename = "The_Tests", default, skip_serializing_if = "Option::is_none")]
    pub the_tests: Option<Vec<String>>,
    #[serde(rename = "Overall", default, skip_serializing_if = "Option::is_none")]
    pub overall: Option<Vec<String>>,
    #[serde(rename = "The_Readings", default, skip_serializing_if = "Option::is_none")]
    pub the_readings: Option<Vec<String>>,
    #[serde(rename = "The_Course", default, skip_serializing_if = "Option::is_none")]
    pub the_course: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommend: Option<YesNoTally>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub good_instructor: Option<YesNoTally>,
}

impl EvaluationRecord {
    pub fn new(unique_id: u64) -> Self {
        Self {
            unique_id,
            ..Self::default()
        }
    }

    fn slot_mut(&mut self, key: ResponseKey) -> &mut Option<Vec<String>> {
        match key {
            ResponseKey::CourseResponses => &mut self.course_responses,
            ResponseKey::InstructorResponses => &mut self.instructor_responses,
            ResponseKey::Category(c) => self.category_slot_mut(c),
        }
    }

    fn category_slot_mut(&mut self, category: Category) -> &mut Option<Vec<String>> {
        match category {
            Category::Instructor => &mut self.the_instructor,
            Category::Assignments => &mut self.the_assignments,
            Category::Tests => &mut self.the_tests,
            Category::Overall => &mut self.overall,
            Category::Readings => &mut self.the_readings,
            Category::Course => &mut self.the_course,
        }
    }

    /// The collected answers for a key, if its section was found.
    pub fn answers(&self, key: ResponseKey) -> Option<&[String]> {
        match key {
            ResponseKey::CourseResponses => self.course_responses.as_deref(),
            ResponseKey::InstructorResponses => self.instructor_responses.as_deref(),
            ResponseKey::Category(c) => self.category(c),
        }
    }

    /// The raw percentage-block lines collected for a category.
    pub fn category(&self, category: Category) -> Option<&[String]> {
        match category {
            Category::Instructor => self.the_instructor.as_deref(),
            Category::Assignments => self.the_assignments.as_deref(),
            Category::Tests => self.the_tests.as_deref(),
            Category::Overall => self.overall.as_deref(),
            Category::Readings => self.the_readings.as_deref(),
            Category::Course => self.the_course.as_deref(),
        }
    }

    /// Mark a section as present without discarding what it already holds.
    pub fn ensure_field(&mut self, key: ResponseKey) {
        self.slot_mut(key).get_or_insert_with(Vec::new);
    }

    /// Mark a section as present and clear anything collected earlier.
    pub fn reset_field(&mut self, key: ResponseKey) {
        *self.slot_mut(key) = Some(Vec::new());
    }

    /// Append flushed answers to a section, creating it if needed.
    pub fn extend_field(&mut self, key: ResponseKey, answers: Vec<String>) {
        self.slot_mut(key).get_or_insert_with(Vec::new).extend(answers);
    }

    pub fn set_weekly_hours(&mut self, hours: WeeklyHours) {
        self.low_time = Some(hours.low);
        self.avg_time = Some(hours.avg);
        self.high_time = Some(hours.high);
    }

    /// "DEPT NUMBER" label, if both header fields were found.
    pub fn course_label(&self) -> Option<String> {
        match (&self.dept, &self.course_number) {
            (Some(dept), Some(number)) => Some(format!("{dept} {number}")),
            _ => None,
        }
    }
}
