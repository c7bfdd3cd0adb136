use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::database::store::{
    AssessmentStore, QuestionBank, Store, StoreTx, TemplateStore, UserDirectory,
};
use crate::error::{Error, Result};
use crate::models::assignment::{Assignment, AssignmentStatus, NewAssignment};
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

#[derive(Debug, Default, Clone)]
struct Tables {
    categories: BTreeMap<i64, Category>,
    questions: BTreeMap<i64, Question>,
    admin_templates: BTreeMap<i64, AdminTemplate>,
    admin_category_maps: BTreeMap<i64, AdminTemplateCategoryMap>,
    manager_templates: BTreeMap<i64, ManagerTemplate>,
    manager_category_maps: BTreeMap<i64, ManagerTemplateCategoryMap>,
    users: BTreeMap<i64, User>,
    assignments: BTreeMap<i64, Assignment>,
    evaluation_summaries: BTreeMap<i64, EvaluationSummary>,
    answer_results: BTreeMap<i64, AnswerResult>,
}

impl Tables {
    fn summary_for(&self, user_id: i64, category_map_id: i64) -> Option<&EvaluationSummary> {
        self.evaluation_summaries
            .values()
            .find(|s| s.user_id == user_id && s.manager_template_category_id == category_map_id)
    }
}

#[derive(Debug)]
enum StagedWrite {
    ManagerTemplate(ManagerTemplate),
    CategoryMap(ManagerTemplateCategoryMap),
    Assignment(Assignment),
    EvaluationSummary(EvaluationSummary),
    AnswerResult(AnswerResult),
}

/// Process-local store. Ids come from one shared sequence, so ids consumed by
/// a rolled-back transaction are skipped, as with a database sequence.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    sequence: Arc<AtomicI64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> i64 {
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub async fn add_category(&self, name: &str) -> Category {
        let category = Category::new(self.next_id(), name);
        self.tables
            .lock()
            .await
            .categories
            .insert(category.id, category.clone());
        category
    }

    pub async fn add_question(
        &self,
        category_id: i64,
        prompt: &str,
        options: &str,
        answer: &str,
    ) -> Question {
        let question = Question {
            id: self.next_id(),
            category_id,
            question: prompt.to_string(),
            options: options.to_string(),
            answer: answer.to_string(),
            status_flag: "A".to_string(),
            created_date: None,
        };
        self.tables
            .lock()
            .await
            .questions
            .insert(question.id, question.clone());
        question
    }

    /// Creates an admin template with one slot per `(category_id, weighage, difficulty)`.
    pub async fn add_admin_template(
        &self,
        name: &str,
        description: Option<&str>,
        slots: &[(i64, Option<i32>, Option<&str>)],
    ) -> AdminTemplate {
        let template = AdminTemplate {
            id: self.next_id(),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_user_id: Some("admin".to_string()),
            created_date: None,
            modified_user_id: None,
            modified_date: None,
        };
        let mut tables = self.tables.lock().await;
        tables.admin_templates.insert(template.id, template.clone());
        for (category_id, weighage, difficulty) in slots {
            let map = AdminTemplateCategoryMap {
                id: self.next_id(),
                admin_template_id: template.id,
                category_id: *category_id,
                weighage: *weighage,
                difficulty_level: difficulty.map(str::to_string),
                created_user_id: Some("admin".to_string()),
                created_date: None,
                modified_user_id: None,
                modified_date: None,
            };
            tables.admin_category_maps.insert(map.id, map);
        }
        template
    }

    pub async fn add_user(&self, user: User) -> User {
        self.tables.lock().await.users.insert(user.id, user.clone());
        user
    }

    pub async fn set_assignment_status(&self, assignment_id: i64, status: AssignmentStatus) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let assignment = tables
            .assignments
            .get_mut(&assignment_id)
            .ok_or_else(|| Error::not_found(format!("Assignment {} not found", assignment_id)))?;
        assignment.status = status.code();
        Ok(())
    }

    pub async fn manager_templates(&self) -> Vec<ManagerTemplate> {
        self.tables
            .lock()
            .await
            .manager_templates
            .values()
            .cloned()
            .collect()
    }

    pub async fn all_assignments(&self) -> Vec<Assignment> {
        self.tables
            .lock()
            .await
            .assignments
            .values()
            .cloned()
            .collect()
    }

    pub async fn manager_category_map_count(&self) -> usize {
        self.tables.lock().await.manager_category_maps.len()
    }

    pub async fn answer_result_count(&self) -> usize {
        self.tables.lock().await.answer_results.len()
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn get_admin_template(&self, id: i64) -> Result<Option<AdminTemplate>> {
        Ok(self.tables.lock().await.admin_templates.get(&id).cloned())
    }

    async fn category_maps_by_admin_template(
        &self,
        admin_template_id: i64,
    ) -> Result<Vec<AdminTemplateCategoryMap>> {
        Ok(self
            .tables
            .lock()
            .await
            .admin_category_maps
            .values()
            .filter(|m| m.admin_template_id == admin_template_id)
            .cloned()
            .collect())
    }

    async fn get_manager_template(&self, id: i64) -> Result<Option<ManagerTemplate>> {
        Ok(self.tables.lock().await.manager_templates.get(&id).cloned())
    }

    async fn category_maps_by_manager_template(
        &self,
        manager_template_id: i64,
    ) -> Result<Vec<ManagerTemplateCategoryMap>> {
        Ok(self
            .tables
            .lock()
            .await
            .manager_category_maps
            .values()
            .filter(|m| m.manager_template_id == manager_template_id)
            .cloned()
            .collect())
    }

    async fn get_category_map(&self, id: i64) -> Result<Option<ManagerTemplateCategoryMap>> {
        Ok(self.tables.lock().await.manager_category_maps.get(&id).cloned())
    }
}

#[async_trait]
impl QuestionBank for MemoryStore {
    async fn get_category(&self, id: i64) -> Result<Option<Category>> {
        Ok(self.tables.lock().await.categories.get(&id).cloned())
    }

    async fn questions_by_category(&self, category_id: i64) -> Result<Vec<Question>> {
        Ok(self
            .tables
            .lock()
            .await
            .questions
            .values()
            .filter(|q| q.category_id == category_id)
            .cloned()
            .collect())
    }

    async fn questions_by_ids(&self, ids: &[i64]) -> Result<Vec<Question>> {
        let tables = self.tables.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.questions.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn find_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        Ok(self
            .tables
            .lock()
            .await
            .users
            .values()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn find_users_by_manager(&self, manager_id: i64) -> Result<Vec<User>> {
        Ok(self
            .tables
            .lock()
            .await
            .users
            .values()
            .filter(|u| u.reporting_manager_id == Some(manager_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AssessmentStore for MemoryStore {
    async fn assignments_by_user(&self, user_id: i64) -> Result<Vec<Assignment>> {
        Ok(self
            .tables
            .lock()
            .await
            .assignments
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn assignments_by_users(&self, user_ids: &[i64]) -> Result<Vec<Assignment>> {
        Ok(self
            .tables
            .lock()
            .await
            .assignments
            .values()
            .filter(|a| user_ids.contains(&a.user_id))
            .cloned()
            .collect())
    }

    async fn find_evaluation_summary(
        &self,
        user_id: i64,
        category_map_id: i64,
    ) -> Result<Option<EvaluationSummary>> {
        Ok(self
            .tables
            .lock()
            .await
            .summary_for(user_id, category_map_id)
            .cloned())
    }

    async fn get_evaluation_summary(&self, id: i64) -> Result<Option<EvaluationSummary>> {
        Ok(self.tables.lock().await.evaluation_summaries.get(&id).cloned())
    }

    async fn evaluation_summaries_by_user(&self, user_id: i64) -> Result<Vec<EvaluationSummary>> {
        Ok(self
            .tables
            .lock()
            .await
            .evaluation_summaries
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn answer_results(
        &self,
        user_id: i64,
        category_map_id: i64,
    ) -> Result<Vec<AnswerResult>> {
        Ok(self
            .tables
            .lock()
            .await
            .answer_results
            .values()
            .filter(|r| r.user_id == user_id && r.manager_template_category_id == category_map_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn begin(&self) -> Result<Box<dyn StoreTx>> {
        Ok(Box::new(MemoryTx {
            store: self.clone(),
            staged: Vec::new(),
        }))
    }
}

pub struct MemoryTx {
    store: MemoryStore,
    staged: Vec<StagedWrite>,
}

impl MemoryTx {
    fn staged_summary_id(&self, user_id: i64, category_map_id: i64) -> Option<i64> {
        self.staged.iter().rev().find_map(|w| match w {
            StagedWrite::EvaluationSummary(s)
                if s.user_id == user_id && s.manager_template_category_id == category_map_id =>
            {
                Some(s.id)
            }
            _ => None,
        })
    }

    async fn manager_template_visible(&self, id: i64) -> bool {
        let staged = self
            .staged
            .iter()
            .any(|w| matches!(w, StagedWrite::ManagerTemplate(t) if t.id == id));
        staged || self.store.tables.lock().await.manager_templates.contains_key(&id)
    }

    async fn category_map_visible(&self, id: i64) -> bool {
        let staged = self
            .staged
            .iter()
            .any(|w| matches!(w, StagedWrite::CategoryMap(m) if m.id == id));
        staged
            || self
                .store
                .tables
                .lock()
                .await
                .manager_category_maps
                .contains_key(&id)
    }
}

fn stamp(at: DateTime<Utc>) -> Option<DateTime<Utc>> {
    Some(at)
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn insert_manager_template(
        &mut self,
        template: NewManagerTemplate,
    ) -> Result<ManagerTemplate> {
        let row = ManagerTemplate {
            id: self.store.next_id(),
            name: template.name,
            manager_id: template.manager_id,
            description: template.description,
            skill_level: template.skill_level,
            question_count: template.question_count,
            created_user_id: Some(template.created_user_id),
            created_date: stamp(template.created_date),
            modified_user_id: None,
            modified_date: None,
        };
        self.staged.push(StagedWrite::ManagerTemplate(row.clone()));
        Ok(row)
    }

    async fn insert_category_map(
        &mut self,
        map: NewCategoryMap,
    ) -> Result<ManagerTemplateCategoryMap> {
        if !self.manager_template_visible(map.manager_template_id).await {
            return Err(Error::Internal(format!(
                "manager template {} does not exist",
                map.manager_template_id
            )));
        }
        let row = ManagerTemplateCategoryMap {
            id: self.store.next_id(),
            manager_template_id: map.manager_template_id,
            category_id: map.category_id,
            weighage: map.weighage,
            difficulty_level: map.difficulty_level,
            created_user_id: Some(map.created_user_id),
            created_date: stamp(map.created_date),
            modified_user_id: None,
            modified_date: None,
        };
        self.staged.push(StagedWrite::CategoryMap(row.clone()));
        Ok(row)
    }

    async fn insert_assignment(&mut self, assignment: NewAssignment) -> Result<Assignment> {
        if !self
            .category_map_visible(assignment.manager_template_category_id)
            .await
        {
            return Err(Error::Internal(format!(
                "category map {} does not exist",
                assignment.manager_template_category_id
            )));
        }
        let row = Assignment {
            id: self.store.next_id(),
            user_id: assignment.user_id,
            manager_template_category_id: assignment.manager_template_category_id,
            assigned_by: assignment.assigned_by,
            assigned_date: assignment.assigned_date,
            time_limit: assignment.time_limit,
            schedule_date: assignment.schedule_date,
            status: assignment.status.code(),
        };
        self.staged.push(StagedWrite::Assignment(row.clone()));
        Ok(row)
    }

    async fn upsert_evaluation_summary(
        &mut self,
        summary: NewEvaluationSummary,
    ) -> Result<EvaluationSummary> {
        let existing = match self
            .staged_summary_id(summary.user_id, summary.manager_template_category_id)
        {
            Some(id) => Some(id),
            None => self
                .store
                .tables
                .lock()
                .await
                .summary_for(summary.user_id, summary.manager_template_category_id)
                .map(|s| s.id),
        };
        let row = EvaluationSummary {
            id: existing.unwrap_or_else(|| self.store.next_id()),
            user_id: summary.user_id,
            manager_template_id: summary.manager_template_id,
            manager_template_category_id: summary.manager_template_category_id,
            score: summary.score,
        };
        self.staged.push(StagedWrite::EvaluationSummary(row.clone()));
        Ok(row)
    }

    async fn insert_answer_result(&mut self, result: NewAnswerResult) -> Result<AnswerResult> {
        let row = AnswerResult {
            id: self.store.next_id(),
            user_id: result.user_id,
            manager_template_category_id: result.manager_template_category_id,
            question_id: result.question_id,
            selected_option: result.selected_option,
            created_date: stamp(result.created_date),
        };
        self.staged.push(StagedWrite::AnswerResult(row.clone()));
        Ok(row)
    }

    async fn commit(&mut self) -> Result<()> {
        let mut tables = self.store.tables.lock().await;
        for write in self.staged.drain(..) {
            match write {
                StagedWrite::ManagerTemplate(t) => {
                    tables.manager_templates.insert(t.id, t);
                }
                StagedWrite::CategoryMap(m) => {
                    tables.manager_category_maps.insert(m.id, m);
                }
                StagedWrite::Assignment(a) => {
                    tables.assignments.insert(a.id, a);
                }
                StagedWrite::EvaluationSummary(s) => {
                    // Keyed by (user, category map); a summary written by a
                    // concurrent commit is replaced, not duplicated.
                    if let Some(previous) = tables
                        .summary_for(s.user_id, s.manager_template_category_id)
                        .map(|p| p.id)
                    {
                        tables.evaluation_summaries.remove(&previous);
                    }
                    tables.evaluation_summaries.insert(s.id, s);
                }
                StagedWrite::AnswerResult(r) => {
                    tables.answer_results.insert(r.id, r);
                }
            }
        }
        Ok(())
    }
}
