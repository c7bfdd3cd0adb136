use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultsQuery {
    pub manager_template_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultQuestion {
    pub question_id: i64,
    pub question: String,
    pub options: JsonValue,
    pub correct_answer: String,
    pub selected_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_option_letter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultTemplate {
    pub id: i64,
    pub name: String,
    pub skill_level: Option<String>,
    pub questions: Vec<ResultQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub evaluation_id: i64,
    pub score: i64,
    pub manager_template: ResultTemplate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerDetail {
    pub answer_id: i64,
    pub question_id: i64,
    pub question: String,
    pub options: JsonValue,
    pub correct_answer: String,
    pub selected_answer: Option<String>,
    pub answered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultDetail {
    pub evaluation_id: i64,
    pub candidate_id: i64,
    pub manager_template_id: i64,
    pub category_map_id: i64,
    pub category_name: String,
    pub score: i64,
    pub answers: Vec<AnswerDetail>,
}
