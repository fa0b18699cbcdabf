//! Exam, question and answer models.
//!
//! Exams are used for periodic knowledge checks, machine trial runs and
//! training courses. Each kind shares the same question shape; trial runs
//! additionally track critical questions separately.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The kind of exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamKind {
    /// Periodic multiple-choice exam.
    Standard,
    /// Machine trial run; critical questions gate the result.
    TrialRun,
    /// End-of-training check.
    Training,
}

impl ExamKind {
    /// Whether critical questions are scored separately.
    pub fn tracks_critical(self) -> bool {
        self == ExamKind::TrialRun
    }
}

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Position in the exam, 1-indexed.
    pub display_order: u32,
    /// Question text.
    pub content: String,
    /// Option A.
    pub option_a: String,
    /// Option B.
    pub option_b: String,
    /// Option C.
    pub option_c: String,
    /// Option D.
    pub option_d: String,
    /// Letter of the correct option.
    pub correct_option: String,
    /// Whether failing this question fails the exam.
    #[serde(default)]
    pub critical: bool,
}

/// An exam with its questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exam {
    /// Surrogate identifier.
    pub id: u64,
    /// Exam title.
    pub title: String,
    /// The kind of exam.
    pub kind: ExamKind,
    /// Whether an essay (TL) component is graded by hand.
    #[serde(default)]
    pub has_essay: bool,
    /// Questions in any order; scoring sorts them by `display_order`.
    pub questions: Vec<Question>,
}

impl Exam {
    /// Questions sorted by display order.
    pub fn ordered_questions(&self) -> Vec<&Question> {
        let mut questions: Vec<&Question> = self.questions.iter().collect();
        questions.sort_by_key(|q| q.display_order);
        questions
    }
}

/// Per-question tally for an attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTally {
    /// Questions answered correctly.
    pub correct: u32,
    /// Non-critical questions answered wrongly or left unanswered.
    pub incorrect: u32,
    /// Critical questions answered wrongly or left unanswered.
    pub critical_fail: u32,
}

/// An employee's submitted attempt, one per (employee, exam).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamAnswer {
    /// Surrogate identifier.
    pub id: u64,
    /// The exam answered.
    pub exam_id: u64,
    /// The employee who answered.
    pub employee_code: String,
    /// Raw answer string, e.g. `"1.A-2.C-3.B"`.
    pub answers: String,
    /// The per-question tally.
    pub tally: ScoreTally,
    /// Points from the multiple-choice (TN) part.
    pub multiple_choice_points: Decimal,
    /// Points from the essay (TL) part, once graded.
    pub essay_points: Option<Decimal>,
    /// Sum of both parts.
    pub total_points: Decimal,
    /// Whether the attempt passed.
    pub passed: bool,
}
