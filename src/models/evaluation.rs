use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Last persisted score of a candidate for one category map. Re-submission
/// overwrites it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EvaluationSummary {
    pub id: i64,
    pub user_id: i64,
    pub manager_template_id: i64,
    pub manager_template_category_id: i64,
    pub score: i64,
}

#[derive(Debug, Clone)]
pub struct NewEvaluationSummary {
    pub user_id: i64,
    pub manager_template_id: i64,
    pub manager_template_category_id: i64,
    pub score: i64,
}

/// One answered question of one submission. Rows accumulate across retakes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnswerResult {
    pub id: i64,
    pub user_id: i64,
    pub manager_template_category_id: i64,
    pub question_id: i64,
    pub selected_option: String,
    pub created_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewAnswerResult {
    pub user_id: i64,
    pub manager_template_category_id: i64,
    pub question_id: i64,
    pub selected_option: String,
    pub created_date: DateTime<Utc>,
}
