use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};

use crate::{dto::schedule_dto::ScheduleExamRequest, error::Result, AppState};

#[utoipa::path(
    post,
    path = "/api/assessment-hub/schedule-exam",
    responses(
        (status = 201, description = "Exam scheduled for every requested candidate"),
        (status = 400, description = "A request field is missing or invalid"),
        (status = 404, description = "Admin template not found or has no categories")
    )
)]
#[axum::debug_handler]
pub async fn schedule_exam(
    State(state): State<AppState>,
    Json(payload): Json<ScheduleExamRequest>,
) -> Result<impl IntoResponse> {
    let scheduled = state.schedule_service.schedule_exam(payload).await?;
    Ok((StatusCode::CREATED, Json(scheduled)))
}
