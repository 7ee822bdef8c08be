//! Evaluation scanner.
//!
//! Turns the raw text of one evaluation into an [`EvaluationRecord`]. The
//! scanner is a finite-state machine: [`step`] is a pure transition from the
//! current [`ScanState`] and one line (with its surrounding window) to the
//! next state plus a list of [`Effect`]s, and [`apply`] folds those effects
//! into the record. Checks on a line are not mutually exclusive; they run in
//! a fixed order:
//!
//! 1. header capture (first ten lines, done before scanning)
//! 2. block termination
//! 3. content accumulation
//! 4. block opening triggers, later triggers overriding earlier ones
//! 5. side-channel extraction of weekly hours and yes/no tallies
//!
//! Opening a block discards any answers buffered for the previous block that
//! were not yet flushed. A block still open at the end of the evaluation is
//! flushed.

use std::sync::LazyLock;

use regex::Regex;

use crate::classifier::{capture_headers, is_category_indicator, is_terminator};
use crate::model::{Category, EvaluationRecord, ResponseKey, WeeklyHours, YesNoTally};
use crate::percent::{parse_block, parse_tally};
use crate::vocabulary::Vocabulary;
use crate::window::LineWindow;

/// Follow-up prompts that open a free-text block after a yes/no question.
const FOLLOW_UPS: &[&str] = &["Why?", "Please explain:", "In what way?"];

/// Distance from a follow-up prompt back to its yes/no question.
const FOLLOW_UP_DISTANCE: usize = 5;

/// Asked about TAs right after the instructor ratings.
const TA_FOLLOW_UP: &str = "What could she/he modify to help you learn more?";

const STANDALONE_INSTRUCTOR_PROMPTS: &[&str] = &["weaknesses?", "strengths?"];

/// Marks a language-course instructor rating introduced by "Explain".
const LANGUAGE_RATING_MARKER: &str = "rate instructor's ability";

static HOURS_QUESTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:How many hours per week (outside of attending required sessions )?did you spend on this course?|Hours / week?)",
    )
    .expect("static regex must compile")
});

static HOURS_ANSWER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Answer (\d\.?\d?)").expect("static regex must compile"));

/// The two yes/no questions whose tallies are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YesNoQuestion {
    Recommend,
    GoodInstructor,
}

impl YesNoQuestion {
    pub const ALL: [YesNoQuestion; 2] = [YesNoQuestion::Recommend, YesNoQuestion::GoodInstructor];

    pub fn text(self) -> &'static str {
        match self {
            YesNoQuestion::Recommend => "Would you recommend this class to another student?",
            YesNoQuestion::GoodInstructor => "Overall, would you say you had a good instructor?",
        }
    }

    /// The free-text block a follow-up prompt to this question opens.
    pub fn follow_up_key(self) -> ResponseKey {
        match self {
            YesNoQuestion::Recommend => ResponseKey::CourseResponses,
            YesNoQuestion::GoodInstructor => ResponseKey::InstructorResponses,
        }
    }

    fn matching(line: &str) -> Option<YesNoQuestion> {
        let line = line.trim();
        Self::ALL.into_iter().find(|q| q.text() == line)
    }
}

/// What kind of answer block the scanner is inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockMode {
    #[default]
    Idle,
    /// Collecting free-text answers.
    Text,
    /// Collecting percentage-block lines.
    Numeric,
}

/// Per-evaluation scanning state. Never shared between evaluations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanState {
    /// The field the current (or most recent) block belongs to.
    pub key: Option<ResponseKey>,
    pub mode: BlockMode,
    /// Answers buffered since the block opened.
    pub answers: Vec<String>,
    /// Free-text answers collected since the block opened.
    pub responses_found: u32,
}

impl ScanState {
    pub fn in_block(&self) -> bool {
        self.mode != BlockMode::Idle
    }

    /// Effects needed to close out the evaluation.
    pub fn finish(mut self) -> Vec<Effect> {
        match self.key {
            Some(key) if self.in_block() => vec![Effect::Flush {
                key,
                answers: std::mem::take(&mut self.answers),
            }],
            _ => Vec::new(),
        }
    }

    fn open(&mut self, key: ResponseKey, mode: BlockMode) {
        if !self.answers.is_empty() {
            tracing::trace!(
                "discarding {} unflushed answer(s) for {:?}",
                self.answers.len(),
                self.key
            );
        }
        self.key = Some(key);
        self.mode = mode;
        self.answers.clear();
        self.responses_found = 0;
    }
}

/// A change to the record produced by one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a finished block's answers to its field.
    Flush {
        key: ResponseKey,
        answers: Vec<String>,
    },
    /// Mark a field as present, keeping its contents.
    EnsureField(ResponseKey),
    /// Mark a field as present and empty.
    ResetField(ResponseKey),
    WeeklyHours(WeeklyHours),
    Tally {
        question: YesNoQuestion,
        tally: YesNoTally,
    },
}

/// Everything a transition may look at besides the state itself.
#[derive(Debug, Clone, Copy)]
pub struct LineContext<'w, 'a> {
    pub window: &'w LineWindow<'a>,
    pub index: usize,
    pub vocabulary: &'w Vocabulary,
    /// The declared response count from the header, if any.
    pub expected_responses: Option<u32>,
}

impl<'w, 'a> LineContext<'w, 'a> {
    pub fn line(&self) -> &'a str {
        self.window.get(self.index).unwrap_or_default()
    }

    fn previous(&self) -> Option<&'a str> {
        self.window.before(self.index, 1)
    }

    fn next(&self) -> Option<&'a str> {
        self.window.after(self.index, 1)
    }
}

/// Returns `true` if the open block ends at this line.
///
/// A declared response count of zero is distrusted and never ends a block.
fn ends_block(state: &ScanState, ctx: &LineContext<'_, '_>) -> bool {
    let count_reached = matches!(
        ctx.expected_responses,
        Some(expected) if expected != 0 && state.responses_found == expected
    );
    count_reached || is_terminator(ctx.line(), ctx.vocabulary)
}

/// Advance the state machine by one line.
pub fn step(mut state: ScanState, ctx: &LineContext<'_, '_>) -> (ScanState, Vec<Effect>) {
    let line = ctx.line();
    let mut effects = Vec::new();

    // Termination.
    if state.in_block() && ends_block(&state, ctx) {
        if let Some(key) = state.key {
            effects.push(Effect::Flush {
                key,
                answers: std::mem::take(&mut state.answers),
            });
        }
        state.mode = BlockMode::Idle;
    }

    // Accumulation.
    match state.mode {
        BlockMode::Text => {
            if line.trim().chars().count() >= 2 {
                state.answers.push(line.to_string());
                state.responses_found += 1;
            }
        }
        BlockMode::Numeric => match parse_block(line) {
            Some(block) => state.answers.push(block.line.to_string()),
            None => tracing::trace!("skipping non-percentage line in numeric block: {line:?}"),
        },
        BlockMode::Idle => {}
    }

    open_blocks(&mut state, ctx, &mut effects);

    // Side channels.
    if let Some(hours) = weekly_hours(ctx) {
        effects.push(Effect::WeeklyHours(hours));
    }
    if let Some((question, tally)) = yes_no_tally(ctx) {
        effects.push(Effect::Tally { question, tally });
    }

    (state, effects)
}

fn open_blocks(state: &mut ScanState, ctx: &LineContext<'_, '_>, effects: &mut Vec<Effect>) {
    let line = ctx.line();
    let trimmed = line.trim();
    let vocab = ctx.vocabulary;

    if vocab.course_questions.matches(line) {
        open_text(state, effects, ResponseKey::CourseResponses);
    }

    let lowered = trimmed.to_lowercase();
    if vocab.instructor_questions.matches(line)
        || STANDALONE_INSTRUCTOR_PROMPTS.contains(&lowered.as_str())
    {
        open_text(state, effects, ResponseKey::InstructorResponses);
    }

    let instructor_key = ResponseKey::Category(Category::Instructor);
    if state.key == Some(instructor_key) && trimmed == TA_FOLLOW_UP {
        open_text(state, effects, instructor_key);
    }

    if FOLLOW_UPS.contains(&trimmed) {
        let asked = ctx
            .window
            .before(ctx.index, FOLLOW_UP_DISTANCE)
            .and_then(YesNoQuestion::matching);
        if let Some(question) = asked {
            open_text(state, effects, question.follow_up_key());
        }
    }

    if is_category_indicator(line) {
        open_numeric(state, ctx, effects);
        state.responses_found = 0;
    }
}

fn open_text(state: &mut ScanState, effects: &mut Vec<Effect>, key: ResponseKey) {
    tracing::debug!("opening text block {key}");
    effects.push(Effect::EnsureField(key));
    state.open(key, BlockMode::Text);
}

/// Decide which category a Likert indicator row belongs to.
fn open_numeric(state: &mut ScanState, ctx: &LineContext<'_, '_>, effects: &mut Vec<Effect>) {
    let previous = ctx.previous();

    if let Some(category) = previous.and_then(Category::from_label) {
        let key = ResponseKey::Category(category);
        tracing::debug!("opening numeric block {key}");
        effects.push(Effect::ResetField(key));
        state.open(key, BlockMode::Numeric);
        return;
    }

    let language_rating = previous.is_some_and(|p| p.trim().eq_ignore_ascii_case("explain"))
        && ctx
            .next()
            .is_some_and(|n| n.to_lowercase().contains(LANGUAGE_RATING_MARKER));

    let redirect = if language_rating {
        Some(Category::Instructor)
    } else {
        match state.key {
            Some(ResponseKey::InstructorResponses) => Some(Category::Instructor),
            Some(ResponseKey::CourseResponses) => Some(Category::Course),
            _ => None,
        }
    };

    if let Some(category) = redirect {
        let key = ResponseKey::Category(category);
        tracing::debug!("opening numeric block {key} (redirected)");
        effects.push(Effect::EnsureField(key));
        state.open(key, BlockMode::Numeric);
    }
}

/// Low, average and high weekly hours from the three lines after the question.
///
/// All three must match or nothing is recorded.
fn weekly_hours(ctx: &LineContext<'_, '_>) -> Option<WeeklyHours> {
    if !HOURS_QUESTION.is_match(ctx.line()) {
        return None;
    }
    let answers = ctx.window.following(ctx.index, 3)?;
    let values = answers
        .iter()
        .map(|l| HOURS_ANSWER.captures(l).map(|c| c[1].to_string()))
        .collect::<Option<Vec<_>>>();

    match values.as_deref() {
        Some([low, avg, high]) => Some(WeeklyHours {
            low: low.clone(),
            avg: avg.clone(),
            high: high.clone(),
        }),
        _ => {
            tracing::trace!("weekly hours question at line {} without answers", ctx.index);
            None
        }
    }
}

/// Yes and no counts laid out as `Yes`, `n / p%`, `No`, `n / p%` after the question.
fn yes_no_tally(ctx: &LineContext<'_, '_>) -> Option<(YesNoQuestion, YesNoTally)> {
    let question = YesNoQuestion::matching(ctx.line())?;
    let at = |ahead| ctx.window.after(ctx.index, ahead).map(str::trim);

    if at(1)? != "Yes" || at(3)? != "No" {
        return None;
    }
    let yes = parse_tally(at(2)?)?;
    let no = parse_tally(at(4)?)?;
    Some((question, YesNoTally(yes, no)))
}

/// Fold transition effects into the record.
pub fn apply(record: &mut EvaluationRecord, effects: Vec<Effect>) {
    for effect in effects {
        match effect {
            Effect::Flush { key, answers } => {
                tracing::debug!(
                    "evaluation {}: flushing {} answer(s) into {key}",
                    record.unique_id,
                    answers.len()
                );
                record.extend_field(key, answers);
            }
            Effect::EnsureField(key) => record.ensure_field(key),
            Effect::ResetField(key) => record.reset_field(key),
            Effect::WeeklyHours(hours) => record.set_weekly_hours(hours),
            Effect::Tally { question, tally } => match question {
                YesNoQuestion::Recommend => record.recommend = Some(tally),
                YesNoQuestion::GoodInstructor => record.good_instructor = Some(tally),
            },
        }
    }
}

/// Scans evaluations against a shared vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct Scanner<'v> {
    vocabulary: &'v Vocabulary,
}

impl<'v> Scanner<'v> {
    pub fn new(vocabulary: &'v Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Scan one evaluation's raw text into a finished record.
    pub fn scan(&self, unique_id: u64, text: &str) -> EvaluationRecord {
        let window = LineWindow::new(text);
        let mut record = EvaluationRecord::new(unique_id);
        capture_headers(window.lines(), &mut record);

        let mut state = ScanState::default();
        for index in 0..window.len() {
            let ctx = LineContext {
                window: &window,
                index,
                vocabulary: self.vocabulary,
                expected_responses: record.num_responses,
            };
            let (next, effects) = step(state, &ctx);
            state = next;
            apply(&mut record, effects);
        }
        apply(&mut record, state.finish());

        record
    }
}

/// Scan one evaluation. See [`Scanner::scan`].
pub fn scan_evaluation(unique_id: u64, text: &str, vocabulary: &Vocabulary) -> EvaluationRecord {
    Scanner::new(vocabulary).scan(unique_id, text)
}
