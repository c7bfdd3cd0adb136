use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use validator::Validate;

use crate::database::store::{Store, TemplateStore, UserDirectory};
use crate::dto::schedule_dto::{ScheduleExamRequest, ScheduledAssessment};
use crate::error::{Error, Result};
use crate::models::assignment::{AssignmentStatus, NewAssignment};
use crate::models::template::{NewCategoryMap, NewManagerTemplate};
use crate::utils::time::Clock;

struct ValidatedSchedule {
    template_id: i64,
    manager_id: i64,
    skill_level: String,
    question_count: i32,
    time_limit: i32,
    scheduled_at: DateTime<Utc>,
    user_ids: Vec<i64>,
}

fn required<T: Clone>(field: &str, value: &Option<T>) -> Result<T> {
    value
        .clone()
        .ok_or_else(|| Error::invalid_field(field, format!("{} is required", field)))
}

fn positive_int(field: &str, raw: &str) -> Result<i32> {
    match raw.trim().parse::<i32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::invalid_field(
            field,
            format!("{} must be a positive integer", field),
        )),
    }
}

fn validate_schedule(payload: &ScheduleExamRequest, now: DateTime<Utc>) -> Result<ValidatedSchedule> {
    let template_id = required("template_id", &payload.template_id)?;
    let manager_id = required("manager_id", &payload.manager_id)?;
    let skill_level = required("skill_level", &payload.skill_level)?;
    let question_count = required("question_count", &payload.question_count)?;
    let time_limit = required("time_limit_minutes", &payload.time_limit_minutes)?;
    let scheduled_at = required("scheduled_at", &payload.scheduled_at)?;
    let requested_users = required("user_ids", &payload.user_ids)?;
    payload.validate()?;

    let question_count = positive_int("question_count", &question_count)?;
    let time_limit = positive_int("time_limit_minutes", &time_limit)?;
    if scheduled_at < now {
        return Err(Error::invalid_field(
            "scheduled_at",
            "scheduled_at cannot be in the past",
        ));
    }

    let mut user_ids = Vec::with_capacity(requested_users.len());
    for id in requested_users {
        if !user_ids.contains(&id) {
            user_ids.push(id);
        }
    }

    Ok(ValidatedSchedule {
        template_id,
        manager_id,
        skill_level,
        question_count,
        time_limit,
        scheduled_at,
        user_ids,
    })
}

#[derive(Clone)]
pub struct ScheduleService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl ScheduleService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Copies an admin template into a new manager template and assigns it to
    /// every requested candidate, all in one transaction.
    pub async fn schedule_exam(&self, payload: ScheduleExamRequest) -> Result<ScheduledAssessment> {
        let now = self.clock.now();
        let request = validate_schedule(&payload, now)?;

        let admin_template = self
            .store
            .get_admin_template(request.template_id)
            .await?
            .ok_or_else(|| {
                Error::not_found(format!("Admin template {} not found", request.template_id))
            })?;
        let admin_maps = self
            .store
            .category_maps_by_admin_template(admin_template.id)
            .await?;
        if admin_maps.is_empty() {
            return Err(Error::not_found(format!(
                "Admin template {} has no categories",
                admin_template.id
            )));
        }

        let actor = request.manager_id.to_string();
        let mut tx = self.store.begin().await?;

        let manager_template = tx
            .insert_manager_template(NewManagerTemplate {
                name: admin_template.name.clone(),
                manager_id: request.manager_id,
                description: admin_template.description.clone(),
                skill_level: Some(request.skill_level.clone()),
                question_count: request.question_count,
                created_user_id: actor.clone(),
                created_date: now,
            })
            .await?;

        let mut copied = Vec::with_capacity(admin_maps.len());
        for source in &admin_maps {
            let map = tx
                .insert_category_map(NewCategoryMap::copied_from(
                    source,
                    manager_template.id,
                    &actor,
                    now,
                ))
                .await?;
            copied.push(map);
        }

        // Every candidate of one call is bound to the first copied map only.
        let target = copied.first().ok_or_else(|| {
            Error::Internal(format!(
                "manager template {} was created without category maps",
                manager_template.id
            ))
        })?;

        for user_id in &request.user_ids {
            tx.insert_assignment(NewAssignment {
                user_id: *user_id,
                manager_template_category_id: target.id,
                assigned_by: actor.clone(),
                assigned_date: now,
                time_limit: request.time_limit,
                schedule_date: request.scheduled_at,
                status: AssignmentStatus::Scheduled,
            })
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            admin_template_id = admin_template.id,
            manager_template_id = manager_template.id,
            manager_id = request.manager_id,
            category_maps = copied.len(),
            candidates = request.user_ids.len(),
            "exam scheduled"
        );

        let users: HashMap<i64, String> = self
            .store
            .find_users_by_ids(&request.user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.full_name()))
            .collect();
        let mut user_names = Vec::with_capacity(request.user_ids.len());
        for id in &request.user_ids {
            match users.get(id) {
                Some(name) => user_names.push(name.clone()),
                None => tracing::warn!(user_id = id, "scheduled candidate has no user record"),
            }
        }

        Ok(ScheduledAssessment {
            template_id: admin_template.id,
            manager_template_id: manager_template.id,
            manager_id: request.manager_id,
            skill_level: request.skill_level,
            question_count: request.question_count.to_string(),
            time_limit_minutes: request.time_limit.to_string(),
            scheduled_at: request.scheduled_at,
            user_ids: None,
            user_names,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::models::user::User;
    use crate::utils::time::MockClock;
    use chrono::{Duration, TimeZone};

    fn pinned_clock(now: DateTime<Utc>) -> Arc<dyn Clock> {
        let mut clock = MockClock::new();
        clock.expect_now().return_const(now);
        Arc::new(clock)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    fn request(template_id: i64, user_ids: Vec<i64>) -> ScheduleExamRequest {
        ScheduleExamRequest {
            template_id: Some(template_id),
            manager_id: Some(7),
            skill_level: Some("senior".into()),
            question_count: Some("3".into()),
            time_limit_minutes: Some("30".into()),
            scheduled_at: Some(now() + Duration::days(1)),
            user_ids: Some(user_ids),
        }
    }

    async fn seeded() -> (MemoryStore, i64) {
        let store = MemoryStore::new();
        let rust = store.add_category("Rust").await;
        let sql = store.add_category("SQL").await;
        let template = store
            .add_admin_template(
                "Backend",
                Some("backend screening"),
                &[(rust.id, Some(2), Some("hard")), (sql.id, None, None)],
            )
            .await;
        store.add_user(User::new(42, "Ada", "Lovelace")).await;
        store.add_user(User::new(43, "Alan", "Turing")).await;
        (store, template.id)
    }

    #[tokio::test]
    async fn copies_template_and_binds_candidates_to_first_map() {
        let (store, template_id) = seeded().await;
        let service = ScheduleService::new(Arc::new(store.clone()), pinned_clock(now()));

        let scheduled = service
            .schedule_exam(request(template_id, vec![42, 43]))
            .await
            .unwrap();

        assert_eq!(scheduled.user_ids, None);
        assert_eq!(scheduled.user_names, vec!["Ada Lovelace", "Alan Turing"]);

        let templates = store.manager_templates().await;
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name, "Backend");
        assert_eq!(templates[0].question_count, 3);
        assert_eq!(templates[0].created_user_id.as_deref(), Some("7"));

        let maps = store
            .category_maps_by_manager_template(scheduled.manager_template_id)
            .await
            .unwrap();
        assert_eq!(maps.len(), 2);
        assert_eq!(maps[0].weighage, Some(2));
        assert_eq!(maps[0].difficulty_level.as_deref(), Some("hard"));

        let assignments = store.all_assignments().await;
        assert_eq!(assignments.len(), 2);
        for a in &assignments {
            assert_eq!(a.manager_template_category_id, maps[0].id);
            assert_eq!(a.assigned_by, "7");
            assert_eq!(a.assigned_date, now());
            assert_eq!(a.time_limit, 30);
            assert_eq!(a.status(), Some(AssignmentStatus::Scheduled));
        }
    }

    #[tokio::test]
    async fn past_schedule_is_rejected_before_any_write() {
        let (store, template_id) = seeded().await;
        let service = ScheduleService::new(Arc::new(store.clone()), pinned_clock(now()));
        let mut payload = request(template_id, vec![42]);
        payload.scheduled_at = Some(now() - Duration::minutes(1));

        let err = service.schedule_exam(payload).await.unwrap_err();
        assert!(matches!(err, Error::InvalidField { ref field, .. } if field == "scheduled_at"));
        assert!(store.manager_templates().await.is_empty());
    }

    #[tokio::test]
    async fn non_numeric_counts_name_their_field() {
        let (store, template_id) = seeded().await;
        let service = ScheduleService::new(Arc::new(store), pinned_clock(now()));

        let mut payload = request(template_id, vec![42]);
        payload.question_count = Some("three".into());
        let err = service.schedule_exam(payload).await.unwrap_err();
        assert!(matches!(err, Error::InvalidField { ref field, .. } if field == "question_count"));

        let mut payload = request(template_id, vec![42]);
        payload.time_limit_minutes = Some("0".into());
        let err = service.schedule_exam(payload).await.unwrap_err();
        assert!(
            matches!(err, Error::InvalidField { ref field, .. } if field == "time_limit_minutes")
        );

        let mut payload = request(template_id, vec![42]);
        payload.manager_id = None;
        let err = service.schedule_exam(payload).await.unwrap_err();
        assert!(matches!(err, Error::InvalidField { ref field, .. } if field == "manager_id"));
    }

    #[tokio::test]
    async fn empty_candidate_list_fails_validation() {
        let (store, template_id) = seeded().await;
        let service = ScheduleService::new(Arc::new(store), pinned_clock(now()));
        let err = service
            .schedule_exam(request(template_id, vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_or_empty_admin_template_is_not_found() {
        let (store, _) = seeded().await;
        let empty = store.add_admin_template("Empty", None, &[]).await;
        let service = ScheduleService::new(Arc::new(store.clone()), pinned_clock(now()));

        let err = service
            .schedule_exam(request(9_999, vec![42]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let err = service
            .schedule_exam(request(empty.id, vec![42]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(store.manager_templates().await.is_empty());
        assert!(store.all_assignments().await.is_empty());
    }

    #[tokio::test]
    async fn repeated_candidate_ids_are_assigned_once() {
        let (store, template_id) = seeded().await;
        let service = ScheduleService::new(Arc::new(store.clone()), pinned_clock(now()));
        service
            .schedule_exam(request(template_id, vec![42, 42]))
            .await
            .unwrap();
        assert_eq!(store.all_assignments().await.len(), 1);
    }
}
