use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::database::store::{
    AssessmentStore, QuestionBank, Store, TemplateStore, UserDirectory,
};
use crate::dto::submission_dto::{
    Analysis, ScoreReport, SubjectScore, SubmitExamRequest, WeightageDetails,
};
use crate::error::{Error, Result};
use crate::models::category::Category;
use crate::models::evaluation::{NewAnswerResult, NewEvaluationSummary};
use crate::models::template::ManagerTemplateCategoryMap;
use crate::services::grading_service::GradingService;
use crate::utils::time::Clock;

#[derive(Clone)]
pub struct SubmissionService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl SubmissionService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Grades every category of the manager template against the full bank,
    /// records the answers and per-category summaries in one transaction, then
    /// recomputes the candidate's weighted score across every category ever
    /// assigned to them.
    pub async fn submit_exam(
        &self,
        candidate_id: i64,
        manager_template_id: i64,
        payload: SubmitExamRequest,
    ) -> Result<ScoreReport> {
        let answers = match payload.answers {
            Some(answers) if !answers.is_empty() => answers,
            _ => return Err(Error::invalid_field("answers", "answers cannot be empty")),
        };
        self.store
            .get_user(candidate_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Candidate {} not found", candidate_id)))?;
        let maps = self
            .store
            .category_maps_by_manager_template(manager_template_id)
            .await?;
        if maps.is_empty() {
            return Err(Error::not_found("Exam not found."));
        }

        let now = self.clock.now();

        // One entry per category; a later map for the same category wins but
        // keeps the position of the first.
        let mut order: Vec<i64> = Vec::new();
        let mut by_category: HashMap<i64, ManagerTemplateCategoryMap> = HashMap::new();
        for map in maps {
            if !by_category.contains_key(&map.category_id) {
                order.push(map.category_id);
            }
            by_category.insert(map.category_id, map);
        }

        let mut analysis = Analysis::default();
        let mut graded: HashMap<i64, (String, i64)> = HashMap::new();
        let mut tx = self.store.begin().await?;

        for category_id in &order {
            let Some(map) = by_category.get(category_id) else {
                continue;
            };
            let name = self.category_name(map.category_id).await?;
            let bank = self.store.questions_by_category(map.category_id).await?;
            let grade = GradingService::grade_category(&name, &bank, &answers);

            for (question_id, selected) in &grade.recorded {
                tx.insert_answer_result(NewAnswerResult {
                    user_id: candidate_id,
                    manager_template_category_id: map.id,
                    question_id: *question_id,
                    selected_option: selected.clone(),
                    created_date: now,
                })
                .await?;
            }
            tx.upsert_evaluation_summary(NewEvaluationSummary {
                user_id: candidate_id,
                manager_template_id,
                manager_template_category_id: map.id,
                score: grade.score,
            })
            .await?;

            analysis.total_questions += grade.question_tally;
            analysis.correct += grade.correct;
            analysis.incorrect += grade.incorrect;
            analysis.unanswered += grade.unanswered;
            analysis.details.extend(grade.outcomes);
            graded.insert(map.category_id, (name, grade.score));
        }

        tx.commit().await?;

        let assigned = self.assigned_subjects(candidate_id, &graded).await?;
        let weighted: Vec<(i64, i32)> = assigned
            .iter()
            .map(|(_, subject)| (subject.score, subject.weightage))
            .collect();
        let total_weightage: i64 = weighted.iter().map(|(_, w)| i64::from(*w)).sum();
        let weighted_sum: i64 = assigned.iter().map(|(_, s)| s.weighted_score).sum();
        let total_score = GradingService::round2(GradingService::weighted_mean(&weighted));
        let subjects: BTreeMap<String, SubjectScore> = assigned
            .into_iter()
            .map(|(name, subject)| (name.to_lowercase(), subject))
            .collect();

        tracing::info!(
            candidate_id,
            manager_template_id,
            graded = graded.len(),
            assigned = subjects.len(),
            total_score,
            "exam submitted"
        );

        Ok(ScoreReport {
            candidate_id,
            manager_template_id,
            submitted_at: now,
            subjects,
            total_score,
            weightage_details: WeightageDetails {
                total_weightage,
                weighted_score: GradingService::round2(weighted_sum as f64),
            },
            analysis,
        })
    }

    async fn category_name(&self, category_id: i64) -> Result<String> {
        Ok(match self.store.get_category(category_id).await? {
            Some(category) => category.name,
            None => Category::fallback_name(category_id),
        })
    }

    /// Newest persisted score across the maps, which are in assignment order.
    async fn latest_score(
        &self,
        candidate_id: i64,
        maps: &[ManagerTemplateCategoryMap],
    ) -> Result<i64> {
        for map in maps.iter().rev() {
            if let Some(summary) = self.store.find_evaluation_summary(candidate_id, map.id).await? {
                return Ok(summary.score);
            }
        }
        Ok(0)
    }

    /// One subject per category ever assigned to the candidate. A category
    /// graded by this submission uses the fresh score, any other its newest
    /// persisted score or 0. The weight comes from the category's most
    /// recently assigned map.
    async fn assigned_subjects(
        &self,
        candidate_id: i64,
        graded: &HashMap<i64, (String, i64)>,
    ) -> Result<Vec<(String, SubjectScore)>> {
        let mut order: Vec<i64> = Vec::new();
        let mut by_category: HashMap<i64, Vec<ManagerTemplateCategoryMap>> = HashMap::new();
        let mut seen_maps = HashSet::new();
        for assignment in self.store.assignments_by_user(candidate_id).await? {
            if !seen_maps.insert(assignment.manager_template_category_id) {
                continue;
            }
            match self
                .store
                .get_category_map(assignment.manager_template_category_id)
                .await?
            {
                Some(map) => {
                    let maps = by_category.entry(map.category_id).or_default();
                    if maps.is_empty() {
                        order.push(map.category_id);
                    }
                    maps.push(map);
                }
                None => tracing::warn!(
                    assignment_id = assignment.id,
                    "assigned category map is missing; left out of the weighted score"
                ),
            }
        }

        let mut subjects = Vec::with_capacity(order.len());
        for category_id in order {
            let Some(maps) = by_category.get(&category_id) else {
                continue;
            };
            let Some(latest) = maps.last() else {
                continue;
            };
            let (name, score) = match graded.get(&category_id) {
                Some((name, score)) => (name.clone(), *score),
                None => (
                    self.category_name(category_id).await?,
                    self.latest_score(candidate_id, maps).await?,
                ),
            };
            let weightage = latest.effective_weighage();
            subjects.push((
                name,
                SubjectScore {
                    score,
                    weightage,
                    weighted_score: score * i64::from(weightage),
                },
            ));
        }
        Ok(subjects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::dto::schedule_dto::ScheduleExamRequest;
    use crate::dto::submission_dto::AnswerStatus;
    use crate::models::user::User;
    use crate::services::schedule_service::ScheduleService;
    use crate::utils::time::FixedClock;
    use chrono::{Duration, Utc};
    use tokio_test::assert_ok;

    const OPTIONS: &str = r#"{"A": "alpha", "B": "beta", "C": "gamma"}"#;

    fn answers(pairs: &[(i64, &str)]) -> SubmitExamRequest {
        SubmitExamRequest {
            answers: Some(
                pairs
                    .iter()
                    .map(|(id, v)| (*id, Some(v.to_string())))
                    .collect(),
            ),
        }
    }

    async fn schedule(store: &MemoryStore, admin_template_id: i64, user_id: i64) -> i64 {
        let now = Utc::now();
        ScheduleService::new(Arc::new(store.clone()), Arc::new(FixedClock(now)))
            .schedule_exam(ScheduleExamRequest {
                template_id: Some(admin_template_id),
                manager_id: Some(7),
                skill_level: Some("mid".into()),
                question_count: Some("3".into()),
                time_limit_minutes: Some("30".into()),
                scheduled_at: Some(now + Duration::days(1)),
                user_ids: Some(vec![user_id]),
            })
            .await
            .unwrap()
            .manager_template_id
    }

    fn service(store: &MemoryStore) -> SubmissionService {
        SubmissionService::new(Arc::new(store.clone()), Arc::new(FixedClock(Utc::now())))
    }

    #[tokio::test]
    async fn single_category_scenario_scores_67() {
        let store = MemoryStore::new();
        let c1 = store.add_category("C1").await;
        let q1 = store.add_question(c1.id, "q1", OPTIONS, "A").await;
        let q2 = store.add_question(c1.id, "q2", OPTIONS, "B").await;
        let q3 = store.add_question(c1.id, "q3", OPTIONS, "C").await;
        let t1 = store
            .add_admin_template("T1", None, &[(c1.id, Some(2), None)])
            .await;
        store.add_user(User::new(42, "Ada", "Lovelace")).await;
        let manager_template_id = schedule(&store, t1.id, 42).await;

        let report = service(&store)
            .submit_exam(
                42,
                manager_template_id,
                answers(&[(q1.id, "A"), (q2.id, "B"), (q3.id, "wrong")]),
            )
            .await
            .unwrap();

        let subject = &report.subjects["c1"];
        assert_eq!(subject.score, 67);
        assert_eq!(subject.weightage, 2);
        assert_eq!(subject.weighted_score, 134);
        assert_eq!(report.total_score, 67.0);
        assert_eq!(report.weightage_details.total_weightage, 2);
        assert_eq!(report.weightage_details.weighted_score, 134.0);
        assert_eq!(report.analysis.correct, 2);
        assert_eq!(report.analysis.incorrect, 1);
        assert_eq!(report.analysis.unanswered, 0);
        // Answered questions are tallied twice in the analysis total.
        assert_eq!(report.analysis.total_questions, 6);
        assert_eq!(store.answer_result_count().await, 3);

        let summaries = store.evaluation_summaries_by_user(42).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].score, 67);
    }

    #[tokio::test]
    async fn resubmission_overwrites_summary_and_appends_answers() {
        let store = MemoryStore::new();
        let c1 = store.add_category("C1").await;
        let q1 = store.add_question(c1.id, "q1", OPTIONS, "A").await;
        let t1 = store.add_admin_template("T1", None, &[(c1.id, None, None)]).await;
        store.add_user(User::new(42, "Ada", "Lovelace")).await;
        let manager_template_id = schedule(&store, t1.id, 42).await;
        let svc = service(&store);

        assert_ok!(svc
            .submit_exam(42, manager_template_id, answers(&[(q1.id, "B")]))
            .await);
        let report = svc
            .submit_exam(42, manager_template_id, answers(&[(q1.id, "A")]))
            .await
            .unwrap();

        assert_eq!(report.total_score, 100.0);
        assert_eq!(store.answer_result_count().await, 2);
        let summaries = store.evaluation_summaries_by_user(42).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].score, 100);
    }

    #[tokio::test]
    async fn weighted_score_includes_categories_from_other_templates() {
        let store = MemoryStore::new();
        let rust = store.add_category("Rust").await;
        let sql = store.add_category("SQL").await;
        let r1 = store.add_question(rust.id, "r1", OPTIONS, "A").await;
        let s1 = store.add_question(sql.id, "s1", OPTIONS, "A").await;
        let s2 = store.add_question(sql.id, "s2", OPTIONS, "A").await;
        let rust_template = store
            .add_admin_template("Rust", None, &[(rust.id, Some(1), None)])
            .await;
        let sql_template = store
            .add_admin_template("SQL", None, &[(sql.id, Some(3), None)])
            .await;
        store.add_user(User::new(42, "Ada", "Lovelace")).await;
        let rust_exam = schedule(&store, rust_template.id, 42).await;
        let sql_exam = schedule(&store, sql_template.id, 42).await;
        let svc = service(&store);

        let first = svc
            .submit_exam(42, sql_exam, answers(&[(s1.id, "A"), (s2.id, "C")]))
            .await
            .unwrap();
        // SQL scored 50, Rust still unscored and counted as 0.
        assert_eq!(first.total_score, 37.5);

        let second = svc
            .submit_exam(42, rust_exam, answers(&[(r1.id, "A")]))
            .await
            .unwrap();
        assert_eq!(second.total_score, 62.5);
        assert_eq!(second.weightage_details.total_weightage, 4);
        assert_eq!(second.weightage_details.weighted_score, 250.0);
        assert_eq!(second.subjects.len(), 2);
        assert_eq!(second.subjects["rust"].score, 100);
        assert_eq!(second.subjects["sql"].score, 50);
        assert_eq!(second.subjects["sql"].weighted_score, 150);
    }

    #[tokio::test]
    async fn unassigned_categories_of_the_template_stay_out_of_the_total() {
        let store = MemoryStore::new();
        let a = store.add_category("A").await;
        let b = store.add_category("B").await;
        let a1 = store.add_question(a.id, "a1", OPTIONS, "A").await;
        let b1 = store.add_question(b.id, "b1", OPTIONS, "A").await;
        let b2 = store.add_question(b.id, "b2", OPTIONS, "A").await;
        let template = store
            .add_admin_template("AB", None, &[(a.id, Some(1), None), (b.id, Some(3), None)])
            .await;
        store.add_user(User::new(42, "Ada", "Lovelace")).await;
        // Scheduling binds the candidate to the first map only.
        let exam = schedule(&store, template.id, 42).await;

        let report = service(&store)
            .submit_exam(
                42,
                exam,
                answers(&[(a1.id, "A"), (b1.id, "A"), (b2.id, "C")]),
            )
            .await
            .unwrap();

        assert_eq!(report.total_score, 100.0);
        assert_eq!(report.weightage_details.total_weightage, 1);
        assert_eq!(report.subjects.len(), 1);
        assert_eq!(report.subjects["a"].score, 100);
        // B is still graded and recorded, it just does not count.
        assert_eq!(report.analysis.correct, 2);
        assert_eq!(store.evaluation_summaries_by_user(42).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn retaken_category_keeps_its_newest_score() {
        let store = MemoryStore::new();
        let rust = store.add_category("Rust").await;
        let sql = store.add_category("SQL").await;
        let r1 = store.add_question(rust.id, "r1", OPTIONS, "A").await;
        let s1 = store.add_question(sql.id, "s1", OPTIONS, "A").await;
        let rust_template = store
            .add_admin_template("Rust", None, &[(rust.id, Some(1), None)])
            .await;
        let sql_template = store
            .add_admin_template("SQL", None, &[(sql.id, Some(1), None)])
            .await;
        store.add_user(User::new(42, "Ada", "Lovelace")).await;
        let svc = service(&store);

        let first_rust = schedule(&store, rust_template.id, 42).await;
        assert_ok!(svc.submit_exam(42, first_rust, answers(&[(r1.id, "B")])).await);
        let retake = schedule(&store, rust_template.id, 42).await;
        assert_ok!(svc.submit_exam(42, retake, answers(&[(r1.id, "A")])).await);
        let sql_exam = schedule(&store, sql_template.id, 42).await;

        let report = svc
            .submit_exam(42, sql_exam, answers(&[(s1.id, "A")]))
            .await
            .unwrap();
        assert_eq!(report.subjects["rust"].score, 100);
        assert_eq!(report.total_score, 100.0);

        // A pending third attempt has no score yet; the retake still counts.
        assert_eq!(store.all_assignments().await.len(), 3);
        schedule(&store, rust_template.id, 42).await;
        let report = svc
            .submit_exam(42, sql_exam, answers(&[(s1.id, "A")]))
            .await
            .unwrap();
        assert_eq!(report.subjects["rust"].score, 100);
        assert_eq!(report.total_score, 100.0);
    }

    #[tokio::test]
    async fn unanswered_bank_is_reported() {
        let store = MemoryStore::new();
        let c1 = store.add_category("C1").await;
        for i in 0..4 {
            store.add_question(c1.id, &format!("q{}", i), OPTIONS, "A").await;
        }
        let t1 = store.add_admin_template("T1", None, &[(c1.id, None, None)]).await;
        store.add_user(User::new(42, "Ada", "Lovelace")).await;
        let manager_template_id = schedule(&store, t1.id, 42).await;

        let report = service(&store)
            .submit_exam(42, manager_template_id, answers(&[(9_999, "A")]))
            .await
            .unwrap();
        assert_eq!(report.subjects["c1"].score, 0);
        assert_eq!(report.analysis.unanswered, 4);
        assert_eq!(report.analysis.total_questions, 4);
        assert!(report
            .analysis
            .details
            .iter()
            .all(|d| d.status == AnswerStatus::Unanswered));
        assert_eq!(store.answer_result_count().await, 0);
    }

    #[tokio::test]
    async fn empty_answers_and_unknown_targets_are_rejected() {
        let store = MemoryStore::new();
        store.add_user(User::new(42, "Ada", "Lovelace")).await;
        let svc = service(&store);

        let err = svc
            .submit_exam(42, 1, SubmitExamRequest { answers: None })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidField { ref field, .. } if field == "answers"));

        let err = svc
            .submit_exam(42, 1, SubmitExamRequest { answers: Some(HashMap::new()) })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidField { .. }));

        let err = svc.submit_exam(1, 1, answers(&[(1, "A")])).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let err = svc.submit_exam(42, 1, answers(&[(1, "A")])).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(ref msg) if msg == "Exam not found."));
    }
}
