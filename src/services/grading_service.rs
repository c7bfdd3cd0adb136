use std::collections::HashMap;

use crate::dto::submission_dto::{AnswerStatus, QuestionOutcome};
use crate::models::question::Question;

/// Outcome of grading one category's full question bank against a
/// submission.
#[derive(Debug, Clone, Default)]
pub struct CategoryGrade {
    pub correct: usize,
    pub incorrect: usize,
    pub unanswered: usize,
    /// Bank questions counted once plus answered questions counted again.
    pub question_tally: usize,
    /// Questions of this category whose id appears in the answer map.
    pub answered_total: usize,
    pub score: i64,
    pub outcomes: Vec<QuestionOutcome>,
    /// `(question_id, selected_option)` for every answer key with a value.
    pub recorded: Vec<(i64, String)>,
}

pub struct GradingService;

impl GradingService {
    /// `round(100 * correct / total)`, or 0 for an empty total.
    pub fn category_score(correct: usize, total: usize) -> i64 {
        if total == 0 {
            return 0;
        }
        (100.0 * correct as f64 / total as f64).round() as i64
    }

    /// Weighted mean of `(score, weight)` pairs; 0 when the weights sum to 0.
    pub fn weighted_mean(entries: &[(i64, i32)]) -> f64 {
        let total_weight: i64 = entries.iter().map(|(_, w)| i64::from(*w)).sum();
        if total_weight == 0 {
            return 0.0;
        }
        let weighted: i64 = entries.iter().map(|(s, w)| s * i64::from(*w)).sum();
        weighted as f64 / total_weight as f64
    }

    pub fn round2(value: f64) -> f64 {
        (value * 100.0).round() / 100.0
    }

    pub fn grade_category(
        category_name: &str,
        bank: &[Question],
        answers: &HashMap<i64, Option<String>>,
    ) -> CategoryGrade {
        let mut grade = CategoryGrade::default();

        for question in bank {
            // Options are display-only; grading needs the canonical answer.
            if let Err(e) = question.parse_options() {
                tracing::warn!(
                    question_id = question.id,
                    error = %e,
                    "unparseable options; grading on the canonical answer"
                );
            }

            // Inherited arithmetic: every bank question is tallied here and an
            // answered one is tallied a second time below.
            grade.question_tally += 1;

            let Some(selection) = answers.get(&question.id) else {
                grade.unanswered += 1;
                grade.outcomes.push(outcome(
                    category_name,
                    question,
                    None,
                    AnswerStatus::Unanswered,
                ));
                continue;
            };

            grade.question_tally += 1;
            grade.answered_total += 1;

            if let Some(selected) = selection {
                grade.recorded.push((question.id, selected.clone()));
            }

            let status = match selection.as_deref() {
                None | Some("") => AnswerStatus::Unanswered,
                Some(selected) if selected == question.answer => AnswerStatus::Correct,
                Some(_) => AnswerStatus::Incorrect,
            };
            match status {
                AnswerStatus::Correct => grade.correct += 1,
                AnswerStatus::Incorrect => grade.incorrect += 1,
                AnswerStatus::Unanswered => grade.unanswered += 1,
            }
            grade
                .outcomes
                .push(outcome(category_name, question, selection.clone(), status));
        }

        grade.score = Self::category_score(grade.correct, grade.answered_total);
        grade
    }
}

fn outcome(
    category_name: &str,
    question: &Question,
    selected: Option<String>,
    status: AnswerStatus,
) -> QuestionOutcome {
    QuestionOutcome {
        question_id: question.id,
        category: category_name.to_string(),
        question: question.question.clone(),
        selected_option: selected,
        correct_answer: question.answer.clone(),
        status,
    }
}
