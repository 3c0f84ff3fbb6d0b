//! Answer evaluation.
//!
//! Deterministic, pure comparison of a submitted answer against the
//! canonical answer and, for recall questions, the acceptable alternates.

use crate::model::{AnswerValue, QuestionType};

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Judge a submitted answer.
///
/// All comparisons are case- and leading/trailing-whitespace-insensitive
/// over the canonical string form of both sides. Recall questions also
/// accept any listed alternate; every other type accepts only the
/// canonical answer.
pub fn is_correct(
    question_type: QuestionType,
    correct_answer: &AnswerValue,
    submitted: &AnswerValue,
    acceptable_answers: &[String],
) -> bool {
    let submitted = normalize(&submitted.canonical_text());
    if normalize(&correct_answer.canonical_text()) == submitted {
        return true;
    }
    if question_type == QuestionType::Recall {
        return acceptable_answers.iter().any(|a| normalize(a) == submitted);
    }
    false
}
