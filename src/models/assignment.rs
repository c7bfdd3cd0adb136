use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentStatus {
    Scheduled,
    Pending,
    Overdue,
    Completed,
    /// Also read as "retake required".
    Fail,
}

impl AssignmentStatus {
    pub const ALL: [AssignmentStatus; 5] = [
        AssignmentStatus::Scheduled,
        AssignmentStatus::Pending,
        AssignmentStatus::Overdue,
        AssignmentStatus::Completed,
        AssignmentStatus::Fail,
    ];

    pub fn code(self) -> i32 {
        match self {
            AssignmentStatus::Scheduled => 0,
            AssignmentStatus::Pending => 1,
            AssignmentStatus::Overdue => 2,
            AssignmentStatus::Completed => 3,
            AssignmentStatus::Fail => 4,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    pub fn label(self) -> &'static str {
        match self {
            AssignmentStatus::Scheduled => "Scheduled",
            AssignmentStatus::Pending => "Pending",
            AssignmentStatus::Overdue => "Overdue",
            AssignmentStatus::Completed => "Completed",
            AssignmentStatus::Fail => "Fail",
        }
    }
}

/// Binds one candidate to one category map of a manager template.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Assignment {
    pub id: i64,
    pub user_id: i64,
    pub manager_template_category_id: i64,
    pub assigned_by: String,
    pub assigned_date: DateTime<Utc>,
    pub time_limit: i32,
    pub schedule_date: DateTime<Utc>,
    pub status: i32,
}

impl Assignment {
    pub fn status(&self) -> Option<AssignmentStatus> {
        AssignmentStatus::from_code(self.status)
    }

    pub fn status_label(&self) -> &'static str {
        self.status().map(AssignmentStatus::label).unwrap_or("Unknown")
    }

    pub fn is_completed(&self) -> bool {
        self.status() == Some(AssignmentStatus::Completed)
    }

    pub fn is_retake(&self) -> bool {
        self.status() == Some(AssignmentStatus::Fail)
    }
}

#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub user_id: i64,
    pub manager_template_category_id: i64,
    pub assigned_by: String,
    pub assigned_date: DateTime<Utc>,
    pub time_limit: i32,
    pub schedule_date: DateTime<Utc>,
    pub status: AssignmentStatus,
}
