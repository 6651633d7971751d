use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::dto::candidate_dto::{
    CandidateListQuery, CandidateResponse, CreateCandidatePayload, EmploymentPayload,
    InternshipPayload, UpdateCandidatePayload,
};
use crate::models::candidate::{Attachment, AttachmentKind};
use crate::routes::extract::{ApiJson, ApiQuery};
use crate::{error::Result, AppState};

pub async fn create_candidate(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateCandidatePayload>,
) -> Result<impl IntoResponse> {
    let draft = payload.into_draft()?;
    let candidate = state.candidate_service.create_candidate(draft).await?;
    Ok((StatusCode::CREATED, Json(CandidateResponse::from(candidate))))
}

pub async fn list_candidates(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CandidateListQuery>,
) -> Result<impl IntoResponse> {
    let filter = query.into_filter()?;
    let candidates = state.candidate_service.list_candidates(filter).await?;
    let body: Vec<CandidateResponse> = candidates.into_iter().map(CandidateResponse::from).collect();
    Ok(Json(body))
}

pub async fn get_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let candidate = state.candidate_service.get_candidate(id).await?;
    Ok(Json(CandidateResponse::from(candidate)))
}

pub async fn update_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateCandidatePayload>,
) -> Result<impl IntoResponse> {
    let patch = payload.into_patch()?;
    let candidate = state.candidate_service.update_candidate(id, patch).await?;
    Ok(Json(CandidateResponse::from(candidate)))
}

pub async fn delete_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.candidate_service.delete_candidate(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn download_cv(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let attachment = state
        .candidate_service
        .get_attachment(id, AttachmentKind::Cv)
        .await?;
    Ok(pdf_response(attachment))
}

pub async fn download_cover_letter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let attachment = state
        .candidate_service
        .get_attachment(id, AttachmentKind::CoverLetter)
        .await?;
    Ok(pdf_response(attachment))
}

fn pdf_response(attachment: Attachment) -> impl IntoResponse {
    let file_name = attachment.file_name.replace(['"', '\\'], "");
    let disposition = HeaderValue::from_str(&format!("inline; filename=\"{}\"", file_name))
        .unwrap_or_else(|_| HeaderValue::from_static("inline"));
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        attachment.data,
    )
}

pub async fn set_internship(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<InternshipPayload>,
) -> Result<impl IntoResponse> {
    let details = payload.into_details()?;
    let candidate = state
        .status_service
        .transition_to_internship(id, details)
        .await?;
    Ok(Json(CandidateResponse::from(candidate)))
}

pub async fn set_employment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<EmploymentPayload>,
) -> Result<impl IntoResponse> {
    let details = payload.into_details()?;
    let candidate = state
        .status_service
        .transition_to_employment(id, details)
        .await?;
    Ok(Json(CandidateResponse::from(candidate)))
}

pub async fn set_available(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let candidate = state.status_service.transition_to_available(id).await?;
    Ok(Json(CandidateResponse::from(candidate)))
}
