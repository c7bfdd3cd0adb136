use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};

use crate::{error::Result, AppState};

#[utoipa::path(
    get,
    path = "/api/assessment-dashboard/{manager_id}",
    params(
        ("manager_id" = i64, Path, description = "Reporting manager ID")
    ),
    responses(
        (status = 200, description = "Per-candidate pass counts and assessment history")
    )
)]
#[axum::debug_handler]
pub async fn get_dashboard(
    State(state): State<AppState>,
    Path(manager_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let rollups = state
        .dashboard_service
        .get_dashboard_by_manager(manager_id)
        .await?;
    Ok(Json(rollups))
}

#[utoipa::path(
    get,
    path = "/api/assessments/user/{user_id}",
    params(
        ("user_id" = i64, Path, description = "Candidate user ID")
    ),
    responses(
        (status = 200, description = "Assessments assigned to the user"),
        (status = 404, description = "User has no assessments")
    )
)]
#[axum::debug_handler]
pub async fn get_user_assessments(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let assessments = state
        .dashboard_service
        .get_assessments_for_user(user_id)
        .await?;
    Ok(Json(assessments))
}

#[utoipa::path(
    get,
    path = "/api/assessments/manager/{manager_id}/status-count",
    params(
        ("manager_id" = i64, Path, description = "Reporting manager ID")
    ),
    responses(
        (status = 200, description = "Assignment counts per status for the manager's reports")
    )
)]
#[axum::debug_handler]
pub async fn get_status_counts(
    State(state): State<AppState>,
    Path(manager_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let report = state
        .dashboard_service
        .get_status_counts_by_manager(manager_id)
        .await?;
    Ok(Json(report))
}
