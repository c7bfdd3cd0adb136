use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `answers` maps question id to the selected option. A `null` selection is
/// treated as unanswered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitExamRequest {
    pub answers: Option<HashMap<i64, Option<String>>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerStatus {
    Correct,
    Incorrect,
    Unanswered,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOutcome {
    pub question_id: i64,
    pub category: String,
    pub question: String,
    pub selected_option: Option<String>,
    pub correct_answer: String,
    pub status: AnswerStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectScore {
    pub score: i64,
    pub weightage: i32,
    pub weighted_score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightageDetails {
    pub total_weightage: i64,
    pub weighted_score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub total_questions: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub unanswered: usize,
    pub details: Vec<QuestionOutcome>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    pub candidate_id: i64,
    pub manager_template_id: i64,
    pub submitted_at: DateTime<Utc>,
    /// Keyed by lower-cased category name.
    pub subjects: BTreeMap<String, SubjectScore>,
    pub total_score: f64,
    pub weightage_details: WeightageDetails,
    pub analysis: Analysis,
}
