//! Exam answers and question maintenance.
//!
//! An exam freezes as soon as it has one answer: scoring is only
//! meaningful while every attempt was graded against the same key.

use rust_decimal::Decimal;
use tracing::info;

use crate::calculation::grade_attempt;
use crate::config::ExamConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{Exam, ExamAnswer, Question};
use crate::store::Database;

/// Grades and stores an employee's attempt.
///
/// # Errors
///
/// * `RecordNotFound` when the exam does not exist
/// * `DuplicateRecord` when the employee already answered this exam
pub fn submit_answer(
    db: &Database,
    config: &ExamConfig,
    exam_id: u64,
    employee_code: &str,
    answers: &str,
    essay_points: Option<Decimal>,
) -> EngineResult<ExamAnswer> {
    if essay_points.is_some_and(|p| p < Decimal::ZERO) {
        return Err(EngineError::InvalidInput {
            field: "essay_points".to_string(),
            message: "must not be negative".to_string(),
        });
    }

    let answer = db.transaction(|t| {
        let exam = t.exams.get(&exam_id).ok_or_else(|| EngineError::RecordNotFound {
            entity: "exam",
            id: exam_id.to_string(),
        })?;
        if t
            .answers
            .iter()
            .any(|a| a.exam_id == exam_id && a.employee_code == employee_code)
        {
            return Err(EngineError::DuplicateRecord {
                entity: "exam answer",
                key: format!("{}/{}", exam_id, employee_code),
            });
        }

        let essay_points = if exam.has_essay { essay_points } else { None };
        let outcome = grade_attempt(exam, answers, essay_points, config);
        let answer = ExamAnswer {
            id: t.next_id(),
            exam_id,
            employee_code: employee_code.to_string(),
            answers: answers.to_string(),
            tally: outcome.tally,
            multiple_choice_points: outcome.multiple_choice_points,
            essay_points: outcome.essay_points,
            total_points: outcome.total_points,
            passed: outcome.passed,
        };
        t.push_answer(answer.clone());
        Ok(answer)
    })?;

    info!(
        exam_id,
        employee_code = %employee_code,
        correct = answer.tally.correct,
        passed = answer.passed,
        "Recorded exam answer"
    );
    Ok(answer)
}

/// Records the hand-graded essay score of an attempt.
///
/// The stored answer string is graded again with the new essay score, so
/// the total and the pass flag are stored exactly as a submission carrying
/// that score would have stored them.
///
/// # Errors
///
/// * `RecordNotFound` when the exam or the answer does not exist, or the
///   answer belongs to another exam
/// * `InvalidInput` when the exam has no essay part
pub fn grade_essay(
    db: &Database,
    config: &ExamConfig,
    exam_id: u64,
    answer_id: u64,
    points: Decimal,
) -> EngineResult<ExamAnswer> {
    if points < Decimal::ZERO {
        return Err(EngineError::InvalidInput {
            field: "essay_points".to_string(),
            message: "must not be negative".to_string(),
        });
    }

    let answer = db.transaction(|t| {
        let exam = t.exams.get(&exam_id).cloned().ok_or_else(|| EngineError::RecordNotFound {
            entity: "exam",
            id: exam_id.to_string(),
        })?;
        if !exam.has_essay {
            return Err(EngineError::InvalidInput {
                field: "essay_points".to_string(),
                message: format!("exam {} has no essay part", exam_id),
            });
        }

        let answer = t.answer_mut(answer_id)?;
        if answer.exam_id != exam_id {
            return Err(EngineError::RecordNotFound {
                entity: "exam answer",
                id: answer_id.to_string(),
            });
        }
        let outcome = grade_attempt(&exam, &answer.answers, Some(points), config);
        answer.tally = outcome.tally;
        answer.multiple_choice_points = outcome.multiple_choice_points;
        answer.essay_points = outcome.essay_points;
        answer.total_points = outcome.total_points;
        answer.passed = outcome.passed;
        Ok(answer.clone())
    })?;

    info!(
        exam_id,
        answer_id,
        total_points = %answer.total_points,
        passed = answer.passed,
        "Graded essay"
    );
    Ok(answer)
}

/// Replaces the questions of an exam that has no answers yet.
///
/// # Errors
///
/// Returns `ExamFrozen` once any answer exists, and `InvalidInput` when two
/// questions share a display order.
pub fn replace_questions(
    db: &Database,
    exam_id: u64,
    questions: Vec<Question>,
) -> EngineResult<Exam> {
    let mut orders: Vec<u32> = questions.iter().map(|q| q.display_order).collect();
    orders.sort_unstable();
    if orders.windows(2).any(|w| w[0] == w[1]) || orders.first() == Some(&0) {
        return Err(EngineError::InvalidInput {
            field: "questions".to_string(),
            message: "display orders must be unique and start at 1".to_string(),
        });
    }

    let exam = db.transaction(|t| {
        if t.exam_has_answers(exam_id) {
            return Err(EngineError::ExamFrozen { exam_id });
        }
        let exam = t.exam_mut(exam_id)?;
        exam.questions = questions;
        Ok(exam.clone())
    })?;

    info!(exam_id, questions = exam.questions.len(), "Replaced exam questions");
    Ok(exam)
}
