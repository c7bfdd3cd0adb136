use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamQuestion {
    pub id: i64,
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamCategory {
    pub questions: Vec<ExamQuestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weightage: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamView {
    pub candidate_id: i64,
    pub manager_template_id: i64,
    pub template_name: String,
    pub skill_level: Option<String>,
    /// Keyed by category display name.
    pub categories: BTreeMap<String, ExamCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedExam {
    pub assignment_id: i64,
    pub category_map_id: i64,
    pub manager_template_id: i64,
    pub template_name: String,
    pub category_name: String,
    pub weightage: Option<i32>,
    pub skill_level: Option<String>,
    pub time_limit: i32,
    pub schedule_date: DateTime<Utc>,
    pub status: String,
}
