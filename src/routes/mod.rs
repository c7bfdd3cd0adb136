pub mod assessment_hub;
pub mod candidate_routes;
pub mod dashboard;
pub mod health;

use axum::{response::IntoResponse, routing::get, routing::post, Json, Router};
use utoipa::OpenApi;

use crate::middleware::rate_limit::{rps_middleware, RateLimiter};
use crate::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        assessment_hub::schedule_exam,
        candidate_routes::list_assigned_exams,
        candidate_routes::get_exam_details,
        candidate_routes::submit_exam,
        candidate_routes::list_results,
        candidate_routes::get_result,
        dashboard::get_dashboard,
        dashboard::get_user_assessments,
        dashboard::get_status_counts,
    ),
    tags((name = "assessment", description = "Skill assessment lifecycle"))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Candidate and manager routes each sit behind their own rate limiter.
pub fn create_router(state: AppState, candidate_rps: u32, manager_rps: u32) -> Router {
    let manager_api = Router::new()
        .route(
            "/api/assessment-hub/schedule-exam",
            post(assessment_hub::schedule_exam),
        )
        .route(
            "/api/assessment-dashboard/:manager_id",
            get(dashboard::get_dashboard),
        )
        .route(
            "/api/assessments/user/:user_id",
            get(dashboard::get_user_assessments),
        )
        .route(
            "/api/assessments/manager/:manager_id/status-count",
            get(dashboard::get_status_counts),
        )
        .layer(axum::middleware::from_fn_with_state(
            RateLimiter::new("manager", manager_rps),
            rps_middleware,
        ));

    let candidate_api = Router::new()
        .route(
            "/api/candidates/:candidate_id/exams",
            get(candidate_routes::list_assigned_exams),
        )
        .route(
            "/api/candidates/:candidate_id/assessment/:manager_template_id",
            get(candidate_routes::get_exam_details),
        )
        .route(
            "/api/candidates/:candidate_id/assessment/:manager_template_id/submit",
            post(candidate_routes::submit_exam),
        )
        .route(
            "/api/candidates/:candidate_id/results",
            get(candidate_routes::list_results),
        )
        .route(
            "/api/candidates/:candidate_id/results/:evaluation_id",
            get(candidate_routes::get_result),
        )
        .layer(axum::middleware::from_fn_with_state(
            RateLimiter::new("candidate", candidate_rps),
            rps_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(manager_api)
        .merge(candidate_api)
        .with_state(state)
}
