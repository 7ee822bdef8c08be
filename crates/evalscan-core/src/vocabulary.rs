//! Question vocabularies and case-insensitive phrase matching.
//!
//! Each list answers a single question: does this line contain any of these
//! phrases as a substring, ignoring case? The phrases are compiled once into
//! one alternation so a line is scanned in a single pass.

use regex::{Regex, RegexBuilder};

/// Compiled size ceiling for a vocabulary matcher.
const MATCHER_SIZE_LIMIT: usize = 64 * 1024 * 1024;

/// An immutable list of known phrases with a precomputed matcher.
#[derive(Debug, Clone)]
pub struct PhraseList {
    phrases: Vec<String>,
    lowered: Vec<String>,
    matcher: Option<Regex>,
}

impl PhraseList {
    /// Build a list, dropping blank phrases.
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let phrases: Vec<String> = phrases
            .into_iter()
            .map(Into::into)
            .filter(|p: &String| !p.trim().is_empty())
            .collect();
        let lowered = phrases.iter().map(|p| p.to_lowercase()).collect();
        let matcher = compile(&phrases);
        Self {
            phrases,
            lowered,
            matcher,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::<String>::new())
    }

    /// Returns `true` if `line` contains any phrase, ignoring case.
    pub fn matches(&self, line: &str) -> bool {
        if self.phrases.is_empty() {
            return false;
        }
        match &self.matcher {
            Some(re) => re.is_match(line),
            None => {
                let line = line.to_lowercase();
                self.lowered.iter().any(|p| line.contains(p.as_str()))
            }
        }
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

fn compile(phrases: &[String]) -> Option<Regex> {
    if phrases.is_empty() {
        return None;
    }
    let pattern = phrases
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");
    match RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .size_limit(MATCHER_SIZE_LIMIT)
        .build()
    {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(
                "phrase matcher for {} phrases did not compile, falling back to linear scan: {e}",
                phrases.len()
            );
            None
        }
    }
}

/// The four question vocabularies used during a run.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Every known question; any match ends the current answer block.
    pub questions: PhraseList,
    /// Questions whose answers are about the course.
    pub course_questions: PhraseList,
    /// Questions whose answers are about the instructor.
    pub instructor_questions: PhraseList,
    /// Agree/disagree statements rated in percentage blocks.
    pub agree_disagree_questions: PhraseList,
}

impl Vocabulary {
    pub fn new(
        questions: PhraseList,
        course_questions: PhraseList,
        instructor_questions: PhraseList,
        agree_disagree_questions: PhraseList,
    ) -> Self {
        Self {
            questions,
            course_questions,
            instructor_questions,
            agree_disagree_questions,
        }
    }
}
