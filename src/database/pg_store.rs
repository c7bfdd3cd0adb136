use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::database::store::{
    AssessmentStore, QuestionBank, Store, StoreTx, TemplateStore, UserDirectory,
};
use crate::error::{Error, Result};
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

const CATEGORY_COLUMNS: &str = "id, name, sub_category, application_area, skill_level, \
     reference, description, review_status, created_user_id, created_date";
const QUESTION_COLUMNS: &str =
    "id, category_id, question, options, answer, status_flag, created_date";
const ADMIN_MAP_COLUMNS: &str = "id, admin_template_id, category_id, weighage, difficulty_level, \
     created_user_id, created_date, modified_user_id, modified_date";
const MANAGER_TEMPLATE_COLUMNS: &str = "id, name, manager_id, description, skill_level, \
     question_count, created_user_id, created_date, modified_user_id, modified_date";
const MANAGER_MAP_COLUMNS: &str = "id, manager_template_id, category_id, weighage, \
     difficulty_level, created_user_id, created_date, modified_user_id, modified_date";
const USER_COLUMNS: &str = "id, first_name, last_name, email, employee_number, employee_grade, \
     project, reporting_manager_id";
const ASSIGNMENT_COLUMNS: &str = "id, user_id, manager_template_category_id, assigned_by, \
     assigned_date, time_limit, schedule_date, status";
const SUMMARY_COLUMNS: &str =
    "id, user_id, manager_template_id, manager_template_category_id, score";
const ANSWER_COLUMNS: &str =
    "id, user_id, manager_template_category_id, question_id, selected_option, created_date";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateStore for PgStore {
    async fn get_admin_template(&self, id: i64) -> Result<Option<AdminTemplate>> {
        let template = sqlx::query_as::<_, AdminTemplate>(
            r#"
            SELECT id, name, description, created_user_id, created_date,
                   modified_user_id, modified_date
            FROM admin_template
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(template)
    }

    async fn category_maps_by_admin_template(
        &self,
        admin_template_id: i64,
    ) -> Result<Vec<AdminTemplateCategoryMap>> {
        let sql = format!(
            "SELECT {} FROM admin_template_category_map WHERE admin_template_id = $1 ORDER BY id",
            ADMIN_MAP_COLUMNS
        );
        let maps = sqlx::query_as::<_, AdminTemplateCategoryMap>(&sql)
            .bind(admin_template_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(maps)
    }

    async fn get_manager_template(&self, id: i64) -> Result<Option<ManagerTemplate>> {
        let sql = format!(
            "SELECT {} FROM manager_template WHERE id = $1",
            MANAGER_TEMPLATE_COLUMNS
        );
        let template = sqlx::query_as::<_, ManagerTemplate>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(template)
    }

    async fn category_maps_by_manager_template(
        &self,
        manager_template_id: i64,
    ) -> Result<Vec<ManagerTemplateCategoryMap>> {
        let sql = format!(
            "SELECT {} FROM manager_template_category_map WHERE manager_template_id = $1 ORDER BY id",
            MANAGER_MAP_COLUMNS
        );
        let maps = sqlx::query_as::<_, ManagerTemplateCategoryMap>(&sql)
            .bind(manager_template_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(maps)
    }

    async fn get_category_map(&self, id: i64) -> Result<Option<ManagerTemplateCategoryMap>> {
        let sql = format!(
            "SELECT {} FROM manager_template_category_map WHERE id = $1",
            MANAGER_MAP_COLUMNS
        );
        let map = sqlx::query_as::<_, ManagerTemplateCategoryMap>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(map)
    }
}

#[async_trait]
impl QuestionBank for PgStore {
    async fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let sql = format!("SELECT {} FROM category WHERE id = $1", CATEGORY_COLUMNS);
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn questions_by_category(&self, category_id: i64) -> Result<Vec<Question>> {
        let sql = format!(
            "SELECT {} FROM question_answer WHERE category_id = $1 ORDER BY id",
            QUESTION_COLUMNS
        );
        let questions = sqlx::query_as::<_, Question>(&sql)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(questions)
    }

    async fn questions_by_ids(&self, ids: &[i64]) -> Result<Vec<Question>> {
        let sql = format!(
            "SELECT {} FROM question_answer WHERE id = ANY($1) ORDER BY id",
            QUESTION_COLUMNS
        );
        let questions = sqlx::query_as::<_, Question>(&sql)
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(questions)
    }
}

#[async_trait]
impl UserDirectory for PgStore {
    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM user_profile WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM user_profile WHERE id = ANY($1) ORDER BY id",
            USER_COLUMNS
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn find_users_by_manager(&self, manager_id: i64) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM user_profile WHERE reporting_manager_id = $1 ORDER BY id",
            USER_COLUMNS
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(manager_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }
}

#[async_trait]
impl AssessmentStore for PgStore {
    async fn assignments_by_user(&self, user_id: i64) -> Result<Vec<Assignment>> {
        let sql = format!(
            "SELECT {} FROM user_assessment_template_map WHERE user_id = $1 ORDER BY id",
            ASSIGNMENT_COLUMNS
        );
        let rows = sqlx::query_as::<_, Assignment>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn assignments_by_users(&self, user_ids: &[i64]) -> Result<Vec<Assignment>> {
        let sql = format!(
            "SELECT {} FROM user_assessment_template_map WHERE user_id = ANY($1) ORDER BY id",
            ASSIGNMENT_COLUMNS
        );
        let rows = sqlx::query_as::<_, Assignment>(&sql)
            .bind(user_ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_evaluation_summary(
        &self,
        user_id: i64,
        category_map_id: i64,
    ) -> Result<Option<EvaluationSummary>> {
        let sql = format!(
            "SELECT {} FROM user_evaluation_summary \
             WHERE user_id = $1 AND manager_template_category_id = $2",
            SUMMARY_COLUMNS
        );
        let summary = sqlx::query_as::<_, EvaluationSummary>(&sql)
            .bind(user_id)
            .bind(category_map_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(summary)
    }

    async fn get_evaluation_summary(&self, id: i64) -> Result<Option<EvaluationSummary>> {
        let sql = format!(
            "SELECT {} FROM user_evaluation_summary WHERE id = $1",
            SUMMARY_COLUMNS
        );
        let summary = sqlx::query_as::<_, EvaluationSummary>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(summary)
    }

    async fn evaluation_summaries_by_user(&self, user_id: i64) -> Result<Vec<EvaluationSummary>> {
        let sql = format!(
            "SELECT {} FROM user_evaluation_summary WHERE user_id = $1 ORDER BY id",
            SUMMARY_COLUMNS
        );
        let rows = sqlx::query_as::<_, EvaluationSummary>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn answer_results(
        &self,
        user_id: i64,
        category_map_id: i64,
    ) -> Result<Vec<AnswerResult>> {
        let sql = format!(
            "SELECT {} FROM user_question_answer_results \
             WHERE user_id = $1 AND manager_template_category_id = $2 ORDER BY id",
            ANSWER_COLUMNS
        );
        let rows = sqlx::query_as::<_, AnswerResult>(&sql)
            .bind(user_id)
            .bind(category_map_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend_tag(&self) -> &'static str {
        "postgres"
    }

    async fn begin(&self) -> Result<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx: Some(tx) }))
    }
}

/// Rolls back on drop unless `commit` ran.
pub struct PgTx {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgTx {
    fn open(&mut self) -> Result<&mut Transaction<'static, Postgres>> {
        self.tx
            .as_mut()
            .ok_or_else(|| Error::Internal("transaction already committed".to_string()))
    }
}

#[async_trait]
impl StoreTx for PgTx {
    async fn insert_manager_template(
        &mut self,
        template: NewManagerTemplate,
    ) -> Result<ManagerTemplate> {
        let tx = self.open()?;
        let sql = format!(
            "INSERT INTO manager_template \
             (name, manager_id, description, skill_level, question_count, created_user_id, created_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            MANAGER_TEMPLATE_COLUMNS
        );
        let row = sqlx::query_as::<_, ManagerTemplate>(&sql)
            .bind(template.name)
            .bind(template.manager_id)
            .bind(template.description)
            .bind(template.skill_level)
            .bind(template.question_count)
            .bind(template.created_user_id)
            .bind(template.created_date)
            .fetch_one(&mut **tx)
            .await?;
        Ok(row)
    }

    async fn insert_category_map(
        &mut self,
        map: NewCategoryMap,
    ) -> Result<ManagerTemplateCategoryMap> {
        let tx = self.open()?;
        let sql = format!(
            "INSERT INTO manager_template_category_map \
             (manager_template_id, category_id, weighage, difficulty_level, created_user_id, created_date) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            MANAGER_MAP_COLUMNS
        );
        let row = sqlx::query_as::<_, ManagerTemplateCategoryMap>(&sql)
            .bind(map.manager_template_id)
            .bind(map.category_id)
            .bind(map.weighage)
            .bind(map.difficulty_level)
            .bind(map.created_user_id)
            .bind(map.created_date)
            .fetch_one(&mut **tx)
            .await?;
        Ok(row)
    }

    async fn insert_assignment(&mut self, assignment: NewAssignment) -> Result<Assignment> {
        let tx = self.open()?;
        let sql = format!(
            "INSERT INTO user_assessment_template_map \
             (user_id, manager_template_category_id, assigned_by, assigned_date, time_limit, schedule_date, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            ASSIGNMENT_COLUMNS
        );
        let row = sqlx::query_as::<_, Assignment>(&sql)
            .bind(assignment.user_id)
            .bind(assignment.manager_template_category_id)
            .bind(assignment.assigned_by)
            .bind(assignment.assigned_date)
            .bind(assignment.time_limit)
            .bind(assignment.schedule_date)
            .bind(assignment.status.code())
            .fetch_one(&mut **tx)
            .await?;
        Ok(row)
    }

    async fn upsert_evaluation_summary(
        &mut self,
        summary: NewEvaluationSummary,
    ) -> Result<EvaluationSummary> {
        let tx = self.open()?;
        let sql = format!(
            "INSERT INTO user_evaluation_summary \
             (user_id, manager_template_id, manager_template_category_id, score) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id, manager_template_category_id) \
             DO UPDATE SET score = EXCLUDED.score, manager_template_id = EXCLUDED.manager_template_id \
             RETURNING {}",
            SUMMARY_COLUMNS
        );
        let row = sqlx::query_as::<_, EvaluationSummary>(&sql)
            .bind(summary.user_id)
            .bind(summary.manager_template_id)
            .bind(summary.manager_template_category_id)
            .bind(summary.score)
            .fetch_one(&mut **tx)
            .await?;
        Ok(row)
    }

    async fn insert_answer_result(&mut self, result: NewAnswerResult) -> Result<AnswerResult> {
        let tx = self.open()?;
        let sql = format!(
            "INSERT INTO user_question_answer_results \
             (user_id, manager_template_category_id, question_id, selected_option, created_date) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            ANSWER_COLUMNS
        );
        let row = sqlx::query_as::<_, AnswerResult>(&sql)
            .bind(result.user_id)
            .bind(result.manager_template_category_id)
            .bind(result.question_id)
            .bind(result.selected_option)
            .bind(result.created_date)
            .fetch_one(&mut **tx)
            .await?;
        Ok(row)
    }

    async fn commit(&mut self) -> Result<()> {
        match self.tx.take() {
            Some(tx) => {
                tx.commit().await?;
                Ok(())
            }
            None => Err(Error::Internal("transaction already committed".to_string())),
        }
    }
}
