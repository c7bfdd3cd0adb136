use std::collections::HashMap;
use std::sync::Arc;

use crate::database::store::{AssessmentStore, Store, UserDirectory};
use crate::dto::dashboard_dto::{
    AssessmentHistoryEntry, CandidateRollup, StatusCountReport, StatusCounts, UserAssessment,
};
use crate::error::{Error, Result};
use crate::models::assignment::{Assignment, AssignmentStatus};
use crate::services::assignment_lookup::{AssignmentLookup, ResolvedAssignment};

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn Store>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn last_score(&self, assignment: &Assignment) -> Result<i64> {
        Ok(self
            .store
            .find_evaluation_summary(assignment.user_id, assignment.manager_template_category_id)
            .await?
            .map(|s| s.score)
            .unwrap_or(0))
    }

    async fn history_entry(&self, resolved: &ResolvedAssignment) -> Result<AssessmentHistoryEntry> {
        let assignment = &resolved.assignment;
        Ok(AssessmentHistoryEntry {
            assignment_id: assignment.id,
            template_name: resolved.template_name(),
            difficulty_level: resolved.category_map.difficulty_level.clone(),
            category: resolved.category_detail(),
            score: self.last_score(assignment).await?,
            status: assignment.status_label().to_string(),
            retake: assignment.is_retake(),
            assigned_date: assignment.assigned_date,
        })
    }

    /// One rollup per reporting candidate that has at least one assignment.
    pub async fn get_dashboard_by_manager(&self, manager_id: i64) -> Result<Vec<CandidateRollup>> {
        let users = self.store.find_users_by_manager(manager_id).await?;
        if users.is_empty() {
            return Ok(Vec::new());
        }
        let user_ids: Vec<i64> = users.iter().map(|u| u.id).collect();

        let mut by_user: HashMap<i64, Vec<Assignment>> = HashMap::new();
        for assignment in self.store.assignments_by_users(&user_ids).await? {
            by_user.entry(assignment.user_id).or_default().push(assignment);
        }

        let mut lookup = AssignmentLookup::new(self.store.as_ref());
        let mut rollups = Vec::new();
        for user in &users {
            let Some(assignments) = by_user.get(&user.id) else {
                continue;
            };
            let passed = assignments.iter().filter(|a| a.is_completed()).count();
            let mut history = Vec::with_capacity(assignments.len());
            for assignment in assignments {
                if let Some(resolved) = lookup.resolve(assignment).await? {
                    history.push(self.history_entry(&resolved).await?);
                }
            }
            rollups.push(CandidateRollup {
                user_id: user.id,
                name: user.full_name(),
                employee_number: user.employee_number.clone(),
                project: user.project.clone(),
                passed: format!("{}/{}", passed, assignments.len()),
                history,
            });
        }

        tracing::debug!(manager_id, candidates = rollups.len(), "dashboard assembled");
        Ok(rollups)
    }

    pub async fn get_assessments_for_user(&self, user_id: i64) -> Result<Vec<UserAssessment>> {
        let assignments = self.store.assignments_by_user(user_id).await?;
        if assignments.is_empty() {
            return Err(Error::not_found(format!(
                "No assessments found for user {}",
                user_id
            )));
        }

        let mut lookup = AssignmentLookup::new(self.store.as_ref());
        let mut out = Vec::with_capacity(assignments.len());
        for assignment in &assignments {
            let Some(resolved) = lookup.resolve(assignment).await? else {
                continue;
            };
            out.push(UserAssessment {
                assignment_id: assignment.id,
                category_map_id: resolved.category_map.id,
                manager_template_id: resolved.category_map.manager_template_id,
                template_name: resolved.template_name(),
                category: resolved.category_detail(),
                weightage: format!("{}%", resolved.category_map.effective_weighage()),
                score: self.last_score(assignment).await?,
                status: assignment.status_label().to_string(),
                retake: assignment.is_retake(),
                time_limit: assignment.time_limit,
                schedule_date: assignment.schedule_date,
            });
        }
        Ok(out)
    }

    pub async fn get_status_counts_by_manager(&self, manager_id: i64) -> Result<StatusCountReport> {
        let user_ids: Vec<i64> = self
            .store
            .find_users_by_manager(manager_id)
            .await?
            .into_iter()
            .map(|u| u.id)
            .collect();

        let mut counts = StatusCounts::default();
        if !user_ids.is_empty() {
            for assignment in self.store.assignments_by_users(&user_ids).await? {
                match assignment.status() {
                    Some(AssignmentStatus::Scheduled) => counts.scheduled += 1,
                    Some(AssignmentStatus::Pending) => counts.pending += 1,
                    Some(AssignmentStatus::Overdue) => counts.overdue += 1,
                    Some(AssignmentStatus::Completed) => counts.completed += 1,
                    Some(AssignmentStatus::Fail) => counts.fail += 1,
                    None => tracing::warn!(
                        assignment_id = assignment.id,
                        status = assignment.status,
                        "assignment has an unknown status code"
                    ),
                }
            }
        }

        Ok(StatusCountReport {
            manager_id,
            user_ids,
            counts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::dto::schedule_dto::ScheduleExamRequest;
    use crate::dto::submission_dto::SubmitExamRequest;
    use crate::models::user::User;
    use crate::services::schedule_service::ScheduleService;
    use crate::services::submission_service::SubmissionService;
    use crate::utils::time::FixedClock;
    use chrono::{Duration, Utc};

    const MANAGER: i64 = 7;

    async fn team() -> MemoryStore {
        let store = MemoryStore::new();
        let category = store.add_category("Rust").await;
        let q = store
            .add_question(category.id, "q", r#"{"A": "a"}"#, "A")
            .await;
        let admin = store
            .add_admin_template("Backend", None, &[(category.id, Some(25), Some("easy"))])
            .await;
        store.add_user(User::new(42, "Ada", "Lovelace").reporting_to(MANAGER)).await;
        store.add_user(User::new(43, "Alan", "Turing").reporting_to(MANAGER)).await;
        store.add_user(User::new(44, "Idle", "Report").reporting_to(MANAGER)).await;

        let clock = Arc::new(FixedClock(Utc::now()));
        let schedule = ScheduleService::new(Arc::new(store.clone()), clock.clone());
        let mut template_id = 0;
        for _ in 0..2 {
            template_id = schedule
                .schedule_exam(ScheduleExamRequest {
                    template_id: Some(admin.id),
                    manager_id: Some(MANAGER),
                    skill_level: Some("mid".into()),
                    question_count: Some("1".into()),
                    time_limit_minutes: Some("10".into()),
                    scheduled_at: Some(Utc::now() + Duration::days(1)),
                    user_ids: Some(vec![42, 43]),
                })
                .await
                .unwrap()
                .manager_template_id;
        }

        SubmissionService::new(Arc::new(store.clone()), clock)
            .submit_exam(
                42,
                template_id,
                SubmitExamRequest {
                    answers: Some([(q.id, Some("A".to_string()))].into_iter().collect()),
                },
            )
            .await
            .unwrap();

        let ada: Vec<_> = store
            .all_assignments()
            .await
            .into_iter()
            .filter(|a| a.user_id == 42)
            .collect();
        store
            .set_assignment_status(ada[0].id, AssignmentStatus::Completed)
            .await
            .unwrap();
        store
            .set_assignment_status(ada[1].id, AssignmentStatus::Fail)
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn dashboard_rolls_up_each_assigned_report() {
        let store = team().await;
        let rollups = DashboardService::new(Arc::new(store))
            .get_dashboard_by_manager(MANAGER)
            .await
            .unwrap();

        assert_eq!(rollups.len(), 2);
        let ada = rollups.iter().find(|r| r.user_id == 42).unwrap();
        assert_eq!(ada.passed, "1/2");
        assert_eq!(ada.history.len(), 2);
        assert!(ada.history.iter().any(|h| h.retake && h.status == "Fail"));
        assert!(ada.history.iter().any(|h| h.score == 100));
        assert_eq!(ada.history[0].category.name, "Rust");
        assert_eq!(ada.history[0].difficulty_level.as_deref(), Some("easy"));

        let alan = rollups.iter().find(|r| r.user_id == 43).unwrap();
        assert_eq!(alan.passed, "0/2");
        assert!(alan.history.iter().all(|h| h.score == 0 && !h.retake));
    }

    #[tokio::test]
    async fn manager_without_reports_gets_empty_views() {
        let store = team().await;
        let service = DashboardService::new(Arc::new(store));
        assert!(service.get_dashboard_by_manager(99).await.unwrap().is_empty());
        let report = service.get_status_counts_by_manager(99).await.unwrap();
        assert!(report.user_ids.is_empty());
        assert_eq!(report.counts, StatusCounts::default());
    }

    #[tokio::test]
    async fn status_counts_follow_code_table() {
        let store = team().await;
        let report = DashboardService::new(Arc::new(store))
            .get_status_counts_by_manager(MANAGER)
            .await
            .unwrap();
        assert_eq!(report.user_ids, vec![42, 43, 44]);
        assert_eq!(
            report.counts,
            StatusCounts {
                scheduled: 2,
                pending: 0,
                overdue: 0,
                completed: 1,
                fail: 1,
            }
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["counts"]["Completed"], 1);
    }

    #[tokio::test]
    async fn user_assessments_render_weightage_as_percent() {
        let store = team().await;
        let service = DashboardService::new(Arc::new(store));
        let items = service.get_assessments_for_user(43).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.weightage == "25%"));
        assert!(items.iter().all(|i| i.category.review_status == "Review Scheduled"));

        assert!(matches!(
            service.get_assessments_for_user(44).await,
            Err(Error::NotFound(_))
        ));
    }
}
