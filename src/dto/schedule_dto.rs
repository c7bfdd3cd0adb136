use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Count fields arrive as strings and are parsed as positive integers by the
/// scheduler, so that a non-numeric value is reported against its field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ScheduleExamRequest {
    pub template_id: Option<i64>,
    pub manager_id: Option<i64>,
    #[validate(length(min = 1, max = 100))]
    pub skill_level: Option<String>,
    pub question_count: Option<String>,
    pub time_limit_minutes: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    #[validate(length(min = 1))]
    pub user_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledAssessment {
    pub template_id: i64,
    pub manager_template_id: i64,
    pub manager_id: i64,
    pub skill_level: String,
    pub question_count: String,
    pub time_limit_minutes: String,
    pub scheduled_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_ids: Option<Vec<i64>>,
    pub user_names: Vec<String>,
}
