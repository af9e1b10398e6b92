//! Axum route handlers for the resume session.

use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection,
        Multipart, State,
    },
    http::header,
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::extract::preview;
use crate::profile::Profile;
use crate::session::{SessionPhase, SessionState};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub phase: SessionPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
}

impl From<&SessionState> for SessionView {
    fn from(state: &SessionState) -> Self {
        Self {
            phase: state.phase(),
            text_preview: state.raw_text().map(preview),
            profile: state.profile().cloned(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub phase: SessionPhase,
    pub text_preview: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadTextRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct RetargetRequest {
    #[serde(default)]
    pub job_description: String,
}

/// `skills` may arrive as a comma-separated string from a single-line form field.
#[derive(Debug, Deserialize)]
pub struct SaveEditRequest {
    pub profile: Profile,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/session
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionView> {
    let session = state.session.lock().await;
    Json(session.state().into())
}

/// POST /api/v1/resume/upload
///
/// Multipart upload; the PDF goes in the `file` field.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart?;
    let mut document: Option<Bytes> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
            document = Some(data);
            break;
        }
    }
    let document =
        document.ok_or_else(|| AppError::Validation("Missing multipart field 'file'".to_string()))?;

    let mut session = state.session.lock().await;
    let text_preview = session.upload_document(document).await?;
    Ok(Json(UploadResponse {
        phase: session.state().phase(),
        text_preview,
    }))
}

/// POST /api/v1/resume/text
pub async fn handle_upload_text(
    State(state): State<AppState>,
    request: Result<Json<UploadTextRequest>, JsonRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let Json(request) = request?;
    let mut session = state.session.lock().await;
    let text_preview = session.upload_text(request.text)?;
    Ok(Json(UploadResponse {
        phase: session.state().phase(),
        text_preview,
    }))
}

/// POST /api/v1/resume/parse
pub async fn handle_parse(State(state): State<AppState>) -> Result<Json<SessionView>, AppError> {
    let mut session = state.session.lock().await;
    session.parse().await?;
    Ok(Json(session.state().into()))
}

/// POST /api/v1/resume/retarget
pub async fn handle_retarget(
    State(state): State<AppState>,
    request: Result<Json<RetargetRequest>, JsonRejection>,
) -> Result<Json<SessionView>, AppError> {
    let Json(request) = request?;
    let mut session = state.session.lock().await;
    session.retarget(&request.job_description).await?;
    Ok(Json(session.state().into()))
}

/// POST /api/v1/resume/edit
pub async fn handle_begin_edit(State(state): State<AppState>) -> Result<Json<SessionView>, AppError> {
    let mut session = state.session.lock().await;
    session.begin_edit()?;
    Ok(Json(session.state().into()))
}

/// PUT /api/v1/resume/edit
pub async fn handle_save_edit(
    State(state): State<AppState>,
    request: Result<Json<SaveEditRequest>, JsonRejection>,
) -> Result<Json<SessionView>, AppError> {
    let Json(request) = request?;
    let mut session = state.session.lock().await;
    session.save_edit(request.profile)?;
    Ok(Json(session.state().into()))
}

/// DELETE /api/v1/resume/edit
pub async fn handle_cancel_edit(
    State(state): State<AppState>,
) -> Result<Json<SessionView>, AppError> {
    let mut session = state.session.lock().await;
    session.cancel_edit()?;
    Ok(Json(session.state().into()))
}

/// GET /api/v1/resume/export
///
/// The profile as a downloadable `resume.json`.
pub async fn handle_export(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = state.session.lock().await.export()?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"resume.json\""),
        ],
        body,
    ))
}

/// GET /api/v1/resume/markdown
pub async fn handle_markdown(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = state.session.lock().await.markdown()?;
    Ok(([(header::CONTENT_TYPE, "text/markdown; charset=utf-8")], body))
}

/// POST /api/v1/session/reset
pub async fn handle_reset(State(state): State<AppState>) -> Result<Json<SessionView>, AppError> {
    let mut session = state.session.lock().await;
    session.reset()?;
    Ok(Json(session.state().into()))
}
