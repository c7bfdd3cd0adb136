use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::database::store::{
    AssessmentStore, QuestionBank, Store, TemplateStore, UserDirectory,
};
use crate::dto::exam_dto::{AssignedExam, ExamCategory, ExamQuestion, ExamView};
use crate::error::{Error, Result};
use crate::models::category::Category;
use crate::models::question::Question;
use crate::services::assignment_lookup::AssignmentLookup;
use crate::utils::batch_sampler::BatchSampler;

/// Questions shown per category in one exam view.
pub const EXAM_BATCH_SIZE: usize = 5;

#[derive(Clone)]
pub struct ExamService {
    store: Arc<dyn Store>,
}

impl ExamService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Builds the exam a candidate sees for a manager template. Each category
    /// contributes one freshly sampled batch, so repeated calls may differ.
    pub async fn get_exam_details(
        &self,
        candidate_id: i64,
        manager_template_id: i64,
    ) -> Result<ExamView> {
        self.store
            .get_user(candidate_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Candidate {} not found", candidate_id)))?;
        let template = self
            .store
            .get_manager_template(manager_template_id)
            .await?
            .ok_or_else(|| {
                Error::not_found(format!("Manager template {} not found", manager_template_id))
            })?;

        let maps = self
            .store
            .category_maps_by_manager_template(template.id)
            .await?;

        let mut categories = BTreeMap::new();
        for map in &maps {
            let name = match self.store.get_category(map.category_id).await? {
                Some(category) => category.name,
                None => Category::fallback_name(map.category_id),
            };
            let bank = self.store.questions_by_category(map.category_id).await?;
            let mut sampler = BatchSampler::new(bank, EXAM_BATCH_SIZE);
            let questions = sampler.next_batch().into_iter().map(exam_question).collect();
            categories.insert(
                name,
                ExamCategory {
                    questions,
                    weightage: map.weighage,
                },
            );
        }

        let map_ids: HashSet<i64> = maps.iter().map(|m| m.id).collect();
        let assignment = match self.store.assignments_by_user(candidate_id).await {
            Ok(assignments) => assignments
                .into_iter()
                .find(|a| map_ids.contains(&a.manager_template_category_id)),
            Err(e) => {
                tracing::warn!(candidate_id, error = %e, "schedule lookup failed");
                None
            }
        };

        Ok(ExamView {
            candidate_id,
            manager_template_id: template.id,
            template_name: template.name,
            skill_level: template.skill_level,
            categories,
            schedule_date: assignment.as_ref().map(|a| a.assigned_date.date_naive()),
            time_limit: assignment.as_ref().map(|a| a.time_limit),
        })
    }

    pub async fn get_assigned_exams(&self, candidate_id: i64) -> Result<Vec<AssignedExam>> {
        self.store
            .get_user(candidate_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Candidate {} not found", candidate_id)))?;

        let assignments = self.store.assignments_by_user(candidate_id).await?;
        let mut lookup = AssignmentLookup::new(self.store.as_ref());
        let mut exams = Vec::with_capacity(assignments.len());
        for assignment in &assignments {
            let Some(resolved) = lookup.resolve(assignment).await? else {
                continue;
            };
            exams.push(AssignedExam {
                assignment_id: assignment.id,
                category_map_id: resolved.category_map.id,
                manager_template_id: resolved.category_map.manager_template_id,
                template_name: resolved.template_name(),
                category_name: resolved.category_name().unwrap_or_default().to_string(),
                weightage: resolved.category_map.weighage,
                skill_level: resolved.template.as_ref().and_then(|t| t.skill_level.clone()),
                time_limit: assignment.time_limit,
                schedule_date: assignment.schedule_date,
                status: assignment.status_label().to_string(),
            });
        }
        Ok(exams)
    }
}

fn exam_question(question: &Question) -> ExamQuestion {
    let options = question.option_values().unwrap_or_else(|e| {
        tracing::warn!(question_id = question.id, error = %e, "unparseable options");
        Vec::new()
    });
    ExamQuestion {
        id: question.id,
        question: question.question.clone(),
        options,
        answer: question.answer.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::dto::schedule_dto::ScheduleExamRequest;
    use crate::models::user::User;
    use crate::services::schedule_service::ScheduleService;
    use crate::utils::time::FixedClock;
    use chrono::{Duration, Utc};

    const OPTIONS: &str = r#"{"A": "1", "B": "2", "C": "3"}"#;

    struct Fixture {
        store: MemoryStore,
        manager_template_id: i64,
        bank_ids: HashSet<i64>,
    }

    async fn fixture(bank_size: usize) -> Fixture {
        let store = MemoryStore::new();
        let category = store.add_category("Rust").await;
        let mut bank_ids = HashSet::new();
        for i in 0..bank_size {
            let q = store
                .add_question(category.id, &format!("q{}", i), OPTIONS, "A")
                .await;
            bank_ids.insert(q.id);
        }
        let admin = store
            .add_admin_template("Backend", None, &[(category.id, Some(4), None)])
            .await;
        store.add_user(User::new(42, "Ada", "Lovelace")).await;

        let now = Utc::now();
        let scheduled = ScheduleService::new(Arc::new(store.clone()), Arc::new(FixedClock(now)))
            .schedule_exam(ScheduleExamRequest {
                template_id: Some(admin.id),
                manager_id: Some(7),
                skill_level: Some("junior".into()),
                question_count: Some("5".into()),
                time_limit_minutes: Some("20".into()),
                scheduled_at: Some(now + Duration::hours(2)),
                user_ids: Some(vec![42]),
            })
            .await
            .unwrap();

        Fixture {
            store,
            manager_template_id: scheduled.manager_template_id,
            bank_ids,
        }
    }

    #[tokio::test]
    async fn exam_shows_at_most_five_questions_from_the_bank() {
        let fx = fixture(12).await;
        let service = ExamService::new(Arc::new(fx.store.clone()));

        for _ in 0..3 {
            let view = service
                .get_exam_details(42, fx.manager_template_id)
                .await
                .unwrap();
            let rust = &view.categories["Rust"];
            assert_eq!(rust.questions.len(), EXAM_BATCH_SIZE);
            assert_eq!(rust.weightage, Some(4));
            let ids: HashSet<i64> = rust.questions.iter().map(|q| q.id).collect();
            assert_eq!(ids.len(), EXAM_BATCH_SIZE);
            assert!(ids.is_subset(&fx.bank_ids));
            assert_eq!(rust.questions[0].options.len(), 3);
            assert_eq!(view.time_limit, Some(20));
            assert_eq!(view.skill_level.as_deref(), Some("junior"));
            assert!(view.schedule_date.is_some());
        }
    }

    #[tokio::test]
    async fn small_bank_is_shown_whole() {
        let fx = fixture(3).await;
        let view = ExamService::new(Arc::new(fx.store.clone()))
            .get_exam_details(42, fx.manager_template_id)
            .await
            .unwrap();
        let ids: HashSet<i64> = view.categories["Rust"].questions.iter().map(|q| q.id).collect();
        assert_eq!(ids, fx.bank_ids);
    }

    #[tokio::test]
    async fn unknown_candidate_or_template_is_not_found() {
        let fx = fixture(1).await;
        let service = ExamService::new(Arc::new(fx.store.clone()));
        assert!(matches!(
            service.get_exam_details(1, fx.manager_template_id).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            service.get_exam_details(42, 123_456).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn schedule_date_is_omitted_without_assignment() {
        let fx = fixture(2).await;
        fx.store.add_user(User::new(50, "Grace", "Hopper")).await;
        let view = ExamService::new(Arc::new(fx.store.clone()))
            .get_exam_details(50, fx.manager_template_id)
            .await
            .unwrap();
        assert_eq!(view.schedule_date, None);
        assert_eq!(view.categories["Rust"].questions.len(), 2);
    }

    #[tokio::test]
    async fn assigned_exams_list_scheduled_work() {
        let fx = fixture(2).await;
        let exams = ExamService::new(Arc::new(fx.store.clone()))
            .get_assigned_exams(42)
            .await
            .unwrap();
        assert_eq!(exams.len(), 1);
        assert_eq!(exams[0].manager_template_id, fx.manager_template_id);
        assert_eq!(exams[0].category_name, "Rust");
        assert_eq!(exams[0].status, "Scheduled");
        assert_eq!(exams[0].skill_level.as_deref(), Some("junior"));
    }
}
