//! Input loading and validation.
//!
//! Reads the evaluation corpus and the four question vocabularies. Missing or
//! unreadable files are fatal [`InputError`]s; everything else about input
//! quality is reported as warnings by [`validate_inputs`].

use std::collections::HashSet;
use std::path::Path;

use crate::classifier::capture_headers;
use crate::config::{Encoding, InputPaths};
use crate::error::InputError;
use crate::model::EvaluationRecord;
use crate::vocabulary::{PhraseList, Vocabulary};
use crate::window::LineWindow;

fn read_text(path: &Path, resource: &'static str, encoding: Encoding) -> Result<String, InputError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(encoding.decode(&bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(InputError::NotFound {
            resource,
            path: path.to_path_buf(),
        }),
        Err(source) => Err(InputError::Unreadable {
            resource,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Decode `\n`, `\r`, `\t` and `\\` escapes; other backslashes are kept.
pub fn unescape_evaluation(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// The first field of every CSV record, with the line it starts on.
fn csv_first_fields(content: &str) -> Result<Vec<(u64, String)>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut fields = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |pos| pos.line());
        fields.push((line, record.get(0).unwrap_or_default().to_string()));
    }
    Ok(fields)
}

/// Parse the evaluation corpus from text.
///
/// A `.json` source is an array of strings. A `.csv` source holds one
/// evaluation in the first field of each record, where quoted fields may
/// span lines. Anything else holds one escaped evaluation per line. Blank
/// evaluations are skipped.
pub fn parse_evaluations(content: &str, source_path: &Path) -> Result<Vec<String>, InputError> {
    let undecodable = |message: String| InputError::Undecodable {
        resource: "evaluation corpus",
        path: source_path.to_path_buf(),
        message,
    };
    let skip_blank = |line: u64| {
        tracing::warn!(
            "{}:{}: skipping blank evaluation",
            source_path.display(),
            line
        );
    };

    match source_path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => {
            serde_json::from_str::<Vec<String>>(content).map_err(|e| undecodable(e.to_string()))
        }
        Some("csv") => {
            let fields = csv_first_fields(content).map_err(|e| undecodable(e.to_string()))?;
            let mut evaluations = Vec::with_capacity(fields.len());
            for (line, text) in fields {
                if text.trim().is_empty() {
                    skip_blank(line);
                    continue;
                }
                evaluations.push(text);
            }
            Ok(evaluations)
        }
        _ => {
            let mut evaluations = Vec::new();
            for (number, line) in content.lines().enumerate() {
                if line.trim().is_empty() {
                    skip_blank(number as u64 + 1);
                    continue;
                }
                evaluations.push(unescape_evaluation(line));
            }
            Ok(evaluations)
        }
    }
}

/// Load the evaluation corpus.
pub fn load_evaluations(path: &Path, encoding: Encoding) -> Result<Vec<String>, InputError> {
    let content = read_text(path, "evaluation corpus", encoding)?;
    parse_evaluations(&content, path)
}

/// Parse a phrase list: the first CSV field of each record, trimmed.
/// Empty fields are skipped.
pub fn parse_phrases(content: &str) -> Result<Vec<String>, csv::Error> {
    Ok(csv_first_fields(content)?
        .into_iter()
        .map(|(_, field)| field.trim().to_string())
        .filter(|phrase| !phrase.is_empty())
        .collect())
}

/// Load a phrase list from a file.
pub fn load_phrase_list(
    path: &Path,
    resource: &'static str,
    encoding: Encoding,
) -> Result<PhraseList, InputError> {
    let content = read_text(path, resource, encoding)?;
    let phrases = parse_phrases(&content).map_err(|e| InputError::Undecodable {
        resource,
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    tracing::debug!("loaded {} phrase(s) from {}", phrases.len(), path.display());
    Ok(PhraseList::new(phrases))
}

/// Load all four vocabularies.
pub fn load_vocabulary(paths: &InputPaths, encoding: Encoding) -> Result<Vocabulary, InputError> {
    Ok(Vocabulary::new(
        load_phrase_list(&paths.questions, "question list", encoding)?,
        load_phrase_list(&paths.course_questions, "course question list", encoding)?,
        load_phrase_list(
            &paths.instructor_questions,
            "instructor question list",
            encoding,
        )?,
        load_phrase_list(
            &paths.agree_disagree_questions,
            "agree/disagree question list",
            encoding,
        )?,
    ))
}

/// A warning from input validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The list or evaluation the warning is about (if applicable).
    pub source: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn new(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            message: message.into(),
        }
    }
}

/// Validate the vocabularies and corpus for common issues.
pub fn validate_inputs(vocabulary: &Vocabulary, evaluations: &[String]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let lists = [
        ("questions", &vocabulary.questions),
        ("course_questions", &vocabulary.course_questions),
        ("instructor_questions", &vocabulary.instructor_questions),
        ("agree_disagree_questions", &vocabulary.agree_disagree_questions),
    ];

    // Check for empty lists and duplicate phrases
    for (name, list) in lists {
        if list.is_empty() {
            warnings.push(ValidationWarning::new(name, "list is empty"));
            continue;
        }
        let mut seen = HashSet::new();
        for phrase in list.phrases() {
            if !seen.insert(phrase.to_lowercase()) {
                warnings.push(ValidationWarning::new(
                    name,
                    format!("duplicate phrase: {phrase}"),
                ));
            }
        }
    }

    // Block-opening phrases that the full list would not terminate on
    for (name, list) in [lists[1], lists[2]] {
        for phrase in list.phrases() {
            if !vocabulary.questions.matches(phrase) {
                warnings.push(ValidationWarning::new(
                    name,
                    format!("phrase does not end the preceding block: {phrase}"),
                ));
            }
        }
    }

    // Phrases in both the course and the instructor list
    let course: HashSet<String> = vocabulary
        .course_questions
        .phrases()
        .iter()
        .map(|p| p.to_lowercase())
        .collect();
    for phrase in vocabulary.instructor_questions.phrases() {
        if course.contains(&phrase.to_lowercase()) {
            warnings.push(ValidationWarning::new(
                "instructor_questions",
                format!("phrase also in course_questions, instructor block wins: {phrase}"),
            ));
        }
    }

    // Evaluations without a recognizable course header
    for (index, text) in evaluations.iter().enumerate() {
        let window = LineWindow::new(text);
        let mut record = EvaluationRecord::new(index as u64);
        capture_headers(window.lines(), &mut record);
        if record.dept.is_none() {
            warnings.push(ValidationWarning::new(
                format!("evaluation {index}"),
                "no course header in the first lines",
            ));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn unescape_sequences() {
        assert_eq!(unescape_evaluation(r"a\nb\r\nc\td\\n"), "a\nb\r\nc\td\\n");
        assert_eq!(unescape_evaluation(r"C:\path\"), "C:\\path\\");
    }

    #[test]
    fn one_evaluation_per_line() {
        let content = "MATH 10101: A\\nWhy?\n\nECON 20100: B\\nOk\n";
        let evals = parse_evaluations(content, &PathBuf::from("evals.txt")).unwrap();
        assert_eq!(evals, vec!["MATH 10101: A\nWhy?", "ECON 20100: B\nOk"]);
    }

    #[test]
    fn json_array_of_evaluations() {
        let content = r#"["first\nsecond", "third"]"#;
        let evals = parse_evaluations(content, &PathBuf::from("evals.json")).unwrap();
        assert_eq!(evals, vec!["first\nsecond", "third"]);

        let bad = parse_evaluations("{}", &PathBuf::from("evals.json"));
        assert!(matches!(bad, Err(InputError::Undecodable { .. })));
    }

    #[test]
    fn csv_corpus_takes_first_field_across_lines() {
        let content = "\"MATH 10101: A\nWhy?\nBecause, really.\",extra\n\"\"\nECON 20100: B\\nOk\n";
        let evals = parse_evaluations(content, &PathBuf::from("unique_evals.csv")).unwrap();
        assert_eq!(
            evals,
            vec!["MATH 10101: A\nWhy?\nBecause, really.", "ECON 20100: B\\nOk"]
        );
    }

    #[test]
    fn phrases_unquoted_and_blank_lines_skipped() {
        let content = "Why?\r\n\n\"Overall, would you say you had a good instructor?\"\n\"Say \"\"hi\"\"\"\n\"\"\n";
        assert_eq!(
            parse_phrases(content).unwrap(),
            vec![
                "Why?",
                "Overall, would you say you had a good instructor?",
                "Say \"hi\"",
            ]
        );
    }

    #[test]
    fn phrase_is_first_column_of_quoted_row() {
        let content = "\"What, if anything, would you change?\",course\nHours / week?,hours,2\n";
        assert_eq!(
            parse_phrases(content).unwrap(),
            vec!["What, if anything, would you change?", "Hours / week?"]
        );
    }

    #[test]
    fn missing_file_is_named() {
        let dir = tempfile::tempdir().unwrap();
        let paths = InputPaths {
            evaluations: dir.path().join("evals.txt"),
            questions: dir.path().join("q.csv"),
            course_questions: dir.path().join("cq.csv"),
            instructor_questions: dir.path().join("iq.csv"),
            agree_disagree_questions: dir.path().join("aq.csv"),
        };
        std::fs::write(&paths.questions, "Why?\n").unwrap();

        let err = load_vocabulary(&paths, Encoding::Latin1).unwrap_err();
        assert!(err.is_missing());
        assert_eq!(err.path(), paths.course_questions.as_path());
        assert!(err.to_string().contains("course question list"));

        let err = load_evaluations(&paths.evaluations, Encoding::Latin1).unwrap_err();
        assert!(err.to_string().contains("evaluation corpus"));
    }

    #[test]
    fn load_latin1_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evals.txt");
        std::fs::write(&path, b"Great course\\n\xa9 2017\n").unwrap();
        let evals = load_evaluations(&path, Encoding::Latin1).unwrap();
        assert_eq!(evals, vec!["Great course\n© 2017"]);
    }

    #[test]
    fn validation_warnings() {
        let vocab = Vocabulary::new(
            PhraseList::new(["What are the strengths of this course?"]),
            PhraseList::new(["What are the strengths of this course?", "Any comments?"]),
            PhraseList::new(["any comments?", "Any comments?"]),
            PhraseList::empty(),
        );
        let evals = vec![
            "MATH 10101: Intro\nbody".to_string(),
            "no header here".to_string(),
        ];
        let warnings = validate_inputs(&vocab, &evals);
        let has = |needle: &str| warnings.iter().any(|w| w.message.contains(needle));

        assert!(has("list is empty"));
        assert!(has("duplicate phrase: Any comments?"));
        assert!(has("does not end the preceding block: Any comments?"));
        assert!(!has("does not end the preceding block: What are the strengths"));
        assert!(has("instructor block wins"));
        assert!(warnings
            .iter()
            .any(|w| w.source.as_deref() == Some("evaluation 1")));
        assert!(!warnings
            .iter()
            .any(|w| w.source.as_deref() == Some("evaluation 0")));
    }
}
