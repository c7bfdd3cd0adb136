use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Weight applied when a category map carries no weighage.
pub const DEFAULT_WEIGHAGE: i32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AdminTemplate {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_user_id: Option<String>,
    pub created_date: Option<DateTime<Utc>>,
    pub modified_user_id: Option<String>,
    pub modified_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AdminTemplateCategoryMap {
    pub id: i64,
    pub admin_template_id: i64,
    pub category_id: i64,
    pub weighage: Option<i32>,
    pub difficulty_level: Option<String>,
    pub created_user_id: Option<String>,
    pub created_date: Option<DateTime<Utc>>,
    pub modified_user_id: Option<String>,
    pub modified_date: Option<DateTime<Utc>>,
}

/// A manager-owned copy of an admin template, created per scheduled exam.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ManagerTemplate {
    pub id: i64,
    pub name: String,
    pub manager_id: i64,
    pub description: Option<String>,
    pub skill_level: Option<String>,
    pub question_count: i32,
    pub created_user_id: Option<String>,
    pub created_date: Option<DateTime<Utc>>,
    pub modified_user_id: Option<String>,
    pub modified_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewManagerTemplate {
    pub name: String,
    pub manager_id: i64,
    pub description: Option<String>,
    pub skill_level: Option<String>,
    pub question_count: i32,
    pub created_user_id: String,
    pub created_date: DateTime<Utc>,
}

/// One (template, category, weighage, difficulty) slot; the unit an
/// assignment binds to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ManagerTemplateCategoryMap {
    pub id: i64,
    pub manager_template_id: i64,
    pub category_id: i64,
    pub weighage: Option<i32>,
    pub difficulty_level: Option<String>,
    pub created_user_id: Option<String>,
    pub created_date: Option<DateTime<Utc>>,
    pub modified_user_id: Option<String>,
    pub modified_date: Option<DateTime<Utc>>,
}

impl ManagerTemplateCategoryMap {
    pub fn effective_weighage(&self) -> i32 {
        self.weighage.unwrap_or(DEFAULT_WEIGHAGE)
    }
}

#[derive(Debug, Clone)]
pub struct NewCategoryMap {
    pub manager_template_id: i64,
    pub category_id: i64,
    pub weighage: Option<i32>,
    pub difficulty_level: Option<String>,
    pub created_user_id: String,
    pub created_date: DateTime<Utc>,
}

impl NewCategoryMap {
    /// Copies the category, weighage and difficulty of an admin slot.
    pub fn copied_from(
        source: &AdminTemplateCategoryMap,
        manager_template_id: i64,
        actor: &str,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            manager_template_id,
            category_id: source.category_id,
            weighage: source.weighage,
            difficulty_level: source.difficulty_level.clone(),
            created_user_id: actor.to_string(),
            created_date: at,
        }
    }
}
