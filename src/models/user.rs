use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub employee_number: Option<String>,
    pub employee_grade: Option<String>,
    pub project: Option<String>,
    pub reporting_manager_id: Option<i64>,
}

impl User {
    pub fn new(id: i64, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: None,
            employee_number: None,
            employee_grade: None,
            project: None,
            reporting_manager_id: None,
        }
    }

    pub fn reporting_to(mut self, manager_id: i64) -> Self {
        self.reporting_manager_id = Some(manager_id);
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
