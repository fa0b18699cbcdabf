//! Exam answer scoring.
//!
//! Answers arrive as a single delimited string, `"1.A-2.C-3.B"`: one
//! `{index}.{letter}` token per answered question, joined by `-`. The index
//! is the question's 1-based display order.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ExamConfig;
use crate::models::{Exam, Question, ScoreTally};

/// Parses an answer string into `display_order -> letter`.
///
/// Tokens that are not `{positive integer}.{letter}` are ignored. When an
/// index appears twice the first occurrence is kept.
///
/// # Examples
///
/// ```
/// use workforce_engine::calculation::parse_answers;
///
/// let answers = parse_answers("1.A-2. c -x.B-3.");
/// assert_eq!(answers.get(&1).map(String::as_str), Some("A"));
/// assert_eq!(answers.get(&2).map(String::as_str), Some("c"));
/// assert_eq!(answers.len(), 2);
/// ```
pub fn parse_answers(raw: &str) -> HashMap<u32, String> {
    let mut answers = HashMap::new();

    for token in raw.split('-') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let Some((index, letter)) = token.split_once('.') else {
            debug!(token, "Ignoring answer token without separator");
            continue;
        };
        let letter = letter.trim();
        match index.trim().parse::<u32>() {
            Ok(index) if index > 0 && !letter.is_empty() => {
                answers.entry(index).or_insert_with(|| letter.to_string());
            }
            _ => debug!(token, "Ignoring malformed answer token"),
        }
    }

    answers
}

fn is_correct(question: &Question, answer: Option<&String>) -> bool {
    answer.is_some_and(|letter| {
        letter
            .trim()
            .eq_ignore_ascii_case(question.correct_option.trim())
    })
}

/// Counts correct answers, the simple exam score.
///
/// Unanswered questions count as wrong.
///
/// # Examples
///
/// ```
/// use workforce_engine::calculation::score_simple;
/// use workforce_engine::models::Question;
///
/// let question = |order: u32, correct: &str| Question {
///     display_order: order,
///     content: String::new(),
///     option_a: String::new(),
///     option_b: String::new(),
///     option_c: String::new(),
///     option_d: String::new(),
///     correct_option: correct.to_string(),
///     critical: false,
/// };
/// let questions = vec![question(1, "A"), question(2, "B"), question(3, "D")];
///
/// assert_eq!(score_simple("1.a-2.B-3.C", &questions), 2);
/// assert_eq!(score_simple("", &questions), 0);
/// ```
pub fn score_simple(raw: &str, questions: &[Question]) -> u32 {
    let answers = parse_answers(raw);
    questions
        .iter()
        .filter(|q| is_correct(q, answers.get(&q.display_order)))
        .count() as u32
}

/// Scores a trial-run exam, separating critical failures.
///
/// A critical question that is wrong or unanswered counts as
/// `critical_fail`; any other wrong or unanswered question counts as
/// `incorrect`.
pub fn score_trial_run(raw: &str, questions: &[Question]) -> ScoreTally {
    tally(&parse_answers(raw), questions, true)
}

fn tally(answers: &HashMap<u32, String>, questions: &[Question], track_critical: bool) -> ScoreTally {
    let mut result = ScoreTally::default();
    for question in questions {
        if is_correct(question, answers.get(&question.display_order)) {
            result.correct += 1;
        } else if track_critical && question.critical {
            result.critical_fail += 1;
        } else {
            result.incorrect += 1;
        }
    }
    result
}

/// The graded result of an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamOutcome {
    /// Per-question tally.
    pub tally: ScoreTally,
    /// Points from the multiple-choice part.
    pub multiple_choice_points: Decimal,
    /// Points from the essay part, when graded.
    pub essay_points: Option<Decimal>,
    /// Sum of both parts.
    pub total_points: Decimal,
    /// Whether the attempt passed.
    pub passed: bool,
}

/// Grades an attempt against an exam.
///
/// The attempt passes when no critical question failed and the share of
/// correct answers reaches `pass_ratio`. An exam with no questions never
/// passes.
pub fn grade_attempt(
    exam: &Exam,
    raw: &str,
    essay_points: Option<Decimal>,
    config: &ExamConfig,
) -> ExamOutcome {
    let questions: Vec<Question> = exam.ordered_questions().into_iter().cloned().collect();
    let tally = tally(&parse_answers(raw), &questions, exam.kind.tracks_critical());

    let multiple_choice_points =
        Decimal::from(tally.correct).saturating_mul(config.points_per_question);
    let total_points = multiple_choice_points.saturating_add(essay_points.unwrap_or_default());

    let passed = if questions.is_empty() {
        false
    } else {
        let ratio = Decimal::from(tally.correct) / Decimal::from(questions.len() as u64);
        tally.critical_fail == 0 && ratio >= config.pass_ratio
    };

    debug!(
        exam_id = exam.id,
        correct = tally.correct,
        incorrect = tally.incorrect,
        critical_fail = tally.critical_fail,
        passed,
        "Graded exam attempt"
    );

    ExamOutcome {
        tally,
        multiple_choice_points,
        essay_points,
        total_points,
        passed,
    }
}
