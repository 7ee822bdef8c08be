//! Line classification.
//!
//! Pure functions that recognize header fields, section terminators and
//! category-indicator rows. None of these look at scanner state; the
//! response-count termination rule lives in the scanner because it depends
//! on how many answers have been collected.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::EvaluationRecord;
use crate::percent::contains_tally;
use crate::vocabulary::Vocabulary;

/// Number of leading lines searched for header fields.
pub const HEADER_LINES: usize = 10;

/// Phrases that end an answer block when a line equals one of them
/// (lowercased and trimmed).
pub const TERMINATOR_PHRASES: &[&str] = &[
    "overall",
    "explain",
    "the content material",
    "useful?",
    "exams",
    "the tests",
    "the textbook",
    "this course",
    "the homework assignments",
    "very useful",
    "labs",
    "level",
    "the instructor",
    "texts?",
    "additional comments",
    "the assignments",
    "weaknesses?",
    "strengths?",
    "anyone interested in the topic",
    "written comments",
    "which least?",
    "summary",
    "challenging?",
    "grading?",
];

/// Column-label rows announcing that percentage blocks follow.
pub const CATEGORY_INDICATORS: &[&str] = &[
    "n/a strongly disagree disagree neutral agree strongly agree",
    "none little some a lot extremely vigorously",
    "1 2 3 4 5",
    "na no gains a little gain moderate gain good gain great gain",
    "na 1-strongly disagree 2-disgree 3-neutral 4-agree 5-strongly agree",
    "a-strongly agree b-agree c-neutral d-disagree e-strongly disagree",
];

const COPYRIGHT_MARK: char = '©';

/// A header field captured from one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderField {
    Instructors(Vec<String>),
    CourseInfo {
        dept: String,
        number: String,
        title: String,
    },
    /// `None` when the count digits are missing.
    ResponseCount(Option<u32>),
    IdenticalCourses(String),
    SectionTerm {
        section: String,
        term: String,
        year: String,
    },
}

/// The classification of a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Header(Vec<HeaderField>),
    Terminator,
    CategoryIndicator,
    Content,
}

struct HeaderPatterns {
    instructor: Regex,
    course_info: Regex,
    responses: Regex,
    identical_courses: Regex,
    section_year: Regex,
}

static PATTERNS: LazyLock<HeaderPatterns> = LazyLock::new(|| HeaderPatterns {
    instructor: Regex::new(r"^Instructor\(s\): ?(.+)").expect("static regex must compile"),
    course_info: Regex::new(r"^([A-Z]{4}) (\d{5}): ?(.*)").expect("static regex must compile"),
    responses: Regex::new(r"esponses: ?(\d*)").expect("static regex must compile"),
    identical_courses: Regex::new(r"^Identical Courses: ?(.+)")
        .expect("static regex must compile"),
    section_year: Regex::new(r"^Section (\d{1,3}) - ([a-zA-Z]+) (\d{4})")
        .expect("static regex must compile"),
});

/// Extract every header field a line carries.
///
/// Most patterns are anchored at the line start; the response count is
/// searched anywhere so that labels like "Number of Responses: 12" match.
pub fn header_fields(line: &str) -> Vec<HeaderField> {
    let p = &*PATTERNS;
    let mut fields = Vec::new();

    if let Some(c) = p.course_info.captures(line) {
        fields.push(HeaderField::CourseInfo {
            dept: c[1].to_string(),
            number: c[2].to_string(),
            title: c[3].to_string(),
        });
    }
    if let Some(c) = p.instructor.captures(line) {
        fields.push(HeaderField::Instructors(
            c[1].split("; ").map(str::to_string).collect(),
        ));
    }
    if let Some(c) = p.responses.captures(line) {
        fields.push(HeaderField::ResponseCount(c[1].parse().ok()));
    }
    if let Some(c) = p.identical_courses.captures(line) {
        fields.push(HeaderField::IdenticalCourses(c[1].to_string()));
    }
    if let Some(c) = p.section_year.captures(line) {
        fields.push(HeaderField::SectionTerm {
            section: c[1].to_string(),
            term: c[2].to_string(),
            year: c[3].to_string(),
        });
    }

    fields
}

/// Populate header fields from the first [`HEADER_LINES`] lines.
///
/// Later lines overwrite earlier matches of the same field.
pub fn capture_headers<S: AsRef<str>>(lines: &[S], record: &mut EvaluationRecord) {
    for line in lines.iter().take(HEADER_LINES) {
        for field in header_fields(line.as_ref()) {
            match field {
                HeaderField::CourseInfo {
                    dept,
                    number,
                    title,
                } => {
                    record.dept = Some(dept);
                    record.course_number = Some(number);
                    record.course = Some(title);
                }
                HeaderField::Instructors(names) => record.instructors = Some(names),
                HeaderField::ResponseCount(count) => record.num_responses = count,
                HeaderField::IdenticalCourses(text) => record.identical_courses = Some(text),
                HeaderField::SectionTerm {
                    section,
                    term,
                    year,
                } => {
                    record.section = Some(section);
                    record.term = Some(term);
                    record.year = Some(year);
                }
            }
        }
    }
}

/// Returns `true` if the line is one of the fixed generic terminator phrases.
pub fn is_terminator_phrase(line: &str) -> bool {
    let line = line.trim().to_lowercase();
    TERMINATOR_PHRASES.contains(&line.as_str())
}

/// Returns `true` if the line ends an answer section on its own content.
///
/// That is: it carries a copyright mark, a bare `count / percent%` tally,
/// a generic terminator phrase, or any known question phrase.
pub fn is_terminator(line: &str, vocabulary: &Vocabulary) -> bool {
    line.contains(COPYRIGHT_MARK)
        || contains_tally(line)
        || is_terminator_phrase(line)
        || vocabulary.questions.matches(line)
}

/// Returns `true` if the line is exactly one of the Likert column-label rows.
pub fn is_category_indicator(line: &str) -> bool {
    let line = line.trim().to_lowercase();
    CATEGORY_INDICATORS.contains(&line.as_str())
}

/// Classify a line for diagnostics and tooling.
///
/// Header fields are only meaningful within the first [`HEADER_LINES`] lines;
/// the caller decides whether to ask.
pub fn classify_line(line: &str, vocabulary: &Vocabulary, in_header: bool) -> LineKind {
    if in_header {
        let fields = header_fields(line);
        if !fields.is_empty() {
            return LineKind::Header(fields);
        }
    }
    if is_category_indicator(line) {
        LineKind::CategoryIndicator
    } else if is_terminator(line, vocabulary) {
        LineKind::Terminator
    } else {
        LineKind::Content
    }
}
