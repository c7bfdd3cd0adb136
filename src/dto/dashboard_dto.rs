use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetail {
    pub id: i64,
    pub name: String,
    pub sub_category: Option<String>,
    pub skill_level: Option<String>,
    pub review_status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentHistoryEntry {
    pub assignment_id: i64,
    pub template_name: String,
    pub difficulty_level: Option<String>,
    pub category: CategoryDetail,
    pub score: i64,
    pub status: String,
    pub retake: bool,
    pub assigned_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRollup {
    pub user_id: i64,
    pub name: String,
    pub employee_number: Option<String>,
    pub project: Option<String>,
    /// `"<completed>/<assigned>"`.
    pub passed: String,
    pub history: Vec<AssessmentHistoryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAssessment {
    pub assignment_id: i64,
    pub category_map_id: i64,
    pub manager_template_id: i64,
    pub template_name: String,
    pub category: CategoryDetail,
    /// Weighage rendered as `"N%"`.
    pub weightage: String,
    pub score: i64,
    pub status: String,
    pub retake: bool,
    pub time_limit: i32,
    pub schedule_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    #[serde(rename = "Scheduled")]
    pub scheduled: usize,
    #[serde(rename = "Pending")]
    pub pending: usize,
    #[serde(rename = "Overdue")]
    pub overdue: usize,
    #[serde(rename = "Completed")]
    pub completed: usize,
    #[serde(rename = "Fail")]
    pub fail: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCountReport {
    pub manager_id: i64,
    pub user_ids: Vec<i64>,
    pub counts: StatusCounts,
}
