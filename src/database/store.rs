use async_trait::async_trait;

use crate::error::Result;
use crate::models::assignment::{Assignment, NewAssignment};
use crate::models::category::Category;
use crate::models::evaluation::{
    AnswerResult, EvaluationSummary, NewAnswerResult, NewEvaluationSummary,
};
use crate::models::question::Question;
use crate::models::template::{
    AdminTemplate, AdminTemplateCategoryMap, ManagerTemplate, ManagerTemplateCategoryMap,
    NewCategoryMap, NewManagerTemplate,
};
use crate::models::user::User;

#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn get_admin_template(&self, id: i64) -> Result<Option<AdminTemplate>>;

    /// In creation order.
    async fn category_maps_by_admin_template(
        &self,
        admin_template_id: i64,
    ) -> Result<Vec<AdminTemplateCategoryMap>>;

    async fn get_manager_template(&self, id: i64) -> Result<Option<ManagerTemplate>>;

    /// In creation order.
    async fn category_maps_by_manager_template(
        &self,
        manager_template_id: i64,
    ) -> Result<Vec<ManagerTemplateCategoryMap>>;

    async fn get_category_map(&self, id: i64) -> Result<Option<ManagerTemplateCategoryMap>>;
}

#[async_trait]
pub trait QuestionBank: Send + Sync {
    async fn get_category(&self, id: i64) -> Result<Option<Category>>;

    async fn questions_by_category(&self, category_id: i64) -> Result<Vec<Question>>;

    async fn questions_by_ids(&self, ids: &[i64]) -> Result<Vec<Question>>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_user(&self, id: i64) -> Result<Option<User>>;

    async fn find_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>>;

    async fn find_users_by_manager(&self, manager_id: i64) -> Result<Vec<User>>;
}

#[async_trait]
pub trait AssessmentStore: Send + Sync {
    async fn assignments_by_user(&self, user_id: i64) -> Result<Vec<Assignment>>;

    async fn assignments_by_users(&self, user_ids: &[i64]) -> Result<Vec<Assignment>>;

    async fn find_evaluation_summary(
        &self,
        user_id: i64,
        category_map_id: i64,
    ) -> Result<Option<EvaluationSummary>>;

    async fn get_evaluation_summary(&self, id: i64) -> Result<Option<EvaluationSummary>>;

    async fn evaluation_summaries_by_user(&self, user_id: i64) -> Result<Vec<EvaluationSummary>>;

    /// Oldest first.
    async fn answer_results(&self, user_id: i64, category_map_id: i64)
        -> Result<Vec<AnswerResult>>;
}

/// Every storage collaborator the assessment engine reads from, plus the
/// unit of work it writes through.
#[async_trait]
pub trait Store: TemplateStore + QuestionBank + UserDirectory + AssessmentStore {
    fn backend_tag(&self) -> &'static str {
        "unknown"
    }

    async fn begin(&self) -> Result<Box<dyn StoreTx>>;
}

/// Writes staged through a `StoreTx` become visible only on `commit`.
/// Dropping the transaction without committing discards them.
#[async_trait]
pub trait StoreTx: Send {
    async fn insert_manager_template(
        &mut self,
        template: NewManagerTemplate,
    ) -> Result<ManagerTemplate>;

    async fn insert_category_map(
        &mut self,
        map: NewCategoryMap,
    ) -> Result<ManagerTemplateCategoryMap>;

    async fn insert_assignment(&mut self, assignment: NewAssignment) -> Result<Assignment>;

    /// Replaces any existing summary for the same (user, category map).
    async fn upsert_evaluation_summary(
        &mut self,
        summary: NewEvaluationSummary,
    ) -> Result<EvaluationSummary>;

    async fn insert_answer_result(&mut self, result: NewAnswerResult) -> Result<AnswerResult>;

    async fn commit(&mut self) -> Result<()>;
}
