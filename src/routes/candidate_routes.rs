use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};

use crate::{
    dto::{result_dto::ResultsQuery, submission_dto::SubmitExamRequest},
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/candidates/{candidate_id}/exams",
    params(
        ("candidate_id" = i64, Path, description = "Candidate user ID")
    ),
    responses(
        (status = 200, description = "Exams assigned to the candidate"),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn list_assigned_exams(
    State(state): State<AppState>,
    Path(candidate_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let exams = state.exam_service.get_assigned_exams(candidate_id).await?;
    Ok(Json(exams))
}

#[utoipa::path(
    get,
    path = "/api/candidates/{candidate_id}/assessment/{manager_template_id}",
    params(
        ("candidate_id" = i64, Path, description = "Candidate user ID"),
        ("manager_template_id" = i64, Path, description = "Manager template ID")
    ),
    responses(
        (status = 200, description = "Sampled exam questions grouped by category"),
        (status = 404, description = "Candidate or manager template not found")
    )
)]
#[axum::debug_handler]
pub async fn get_exam_details(
    State(state): State<AppState>,
    Path((candidate_id, manager_template_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse> {
    let view = state
        .exam_service
        .get_exam_details(candidate_id, manager_template_id)
        .await?;
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/api/candidates/{candidate_id}/assessment/{manager_template_id}/submit",
    params(
        ("candidate_id" = i64, Path, description = "Candidate user ID"),
        ("manager_template_id" = i64, Path, description = "Manager template ID")
    ),
    responses(
        (status = 201, description = "Submission graded and recorded"),
        (status = 400, description = "Answer map missing or empty"),
        (status = 404, description = "Candidate or exam not found")
    )
)]
#[axum::debug_handler]
pub async fn submit_exam(
    State(state): State<AppState>,
    Path((candidate_id, manager_template_id)): Path<(i64, i64)>,
    Json(payload): Json<SubmitExamRequest>,
) -> Result<impl IntoResponse> {
    let report = state
        .submission_service
        .submit_exam(candidate_id, manager_template_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(report)))
}

#[utoipa::path(
    get,
    path = "/api/candidates/{candidate_id}/results",
    params(
        ("candidate_id" = i64, Path, description = "Candidate user ID"),
        ("manager_template_id" = Option<i64>, Query, description = "Restrict to one manager template")
    ),
    responses(
        (status = 200, description = "Evaluation summaries with answered questions"),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn list_results(
    State(state): State<AppState>,
    Path(candidate_id): Path<i64>,
    Query(query): Query<ResultsQuery>,
) -> Result<impl IntoResponse> {
    let results = state
        .result_service
        .get_all_results(candidate_id, query.manager_template_id)
        .await?;
    Ok(Json(results))
}

#[utoipa::path(
    get,
    path = "/api/candidates/{candidate_id}/results/{evaluation_id}",
    params(
        ("candidate_id" = i64, Path, description = "Candidate user ID"),
        ("evaluation_id" = i64, Path, description = "Evaluation summary ID")
    ),
    responses(
        (status = 200, description = "One evaluation with every recorded answer"),
        (status = 404, description = "Candidate or evaluation not found")
    )
)]
#[axum::debug_handler]
pub async fn get_result(
    State(state): State<AppState>,
    Path((candidate_id, evaluation_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse> {
    let detail = state
        .result_service
        .get_result_by_id(candidate_id, evaluation_id)
        .await?;
    Ok(Json(detail))
}
