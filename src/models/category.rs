use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
}

impl ReviewStatus {
    pub fn code(self) -> i32 {
        match self {
            ReviewStatus::Scheduled => 0,
            ReviewStatus::InProgress => 1,
            ReviewStatus::Completed => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReviewStatus::Scheduled => "Review Scheduled",
            ReviewStatus::InProgress => "Review In Progress",
            ReviewStatus::Completed => "Review Completed",
        }
    }
}

/// Unknown codes fall back to `Scheduled`.
impl From<i32> for ReviewStatus {
    fn from(code: i32) -> Self {
        match code {
            1 => ReviewStatus::InProgress,
            2 => ReviewStatus::Completed,
            _ => ReviewStatus::Scheduled,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub sub_category: Option<String>,
    pub application_area: Option<String>,
    pub skill_level: Option<String>,
    pub reference: Option<String>,
    pub description: Option<String>,
    #[sqlx(try_from = "i32")]
    pub review_status: ReviewStatus,
    pub created_user_id: Option<String>,
    pub created_date: Option<DateTime<Utc>>,
}

impl Category {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            sub_category: None,
            application_area: None,
            skill_level: None,
            reference: None,
            description: None,
            review_status: ReviewStatus::default(),
            created_user_id: None,
            created_date: None,
        }
    }

    /// Name used when the category row itself is missing.
    pub fn fallback_name(category_id: i64) -> String {
        format!("category-{}", category_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_status_defaults_on_unknown_code() {
        assert_eq!(ReviewStatus::from(1), ReviewStatus::InProgress);
        assert_eq!(ReviewStatus::from(2).label(), "Review Completed");
        assert_eq!(ReviewStatus::from(42), ReviewStatus::Scheduled);
        assert_eq!(ReviewStatus::from(-1).code(), 0);
    }
}
