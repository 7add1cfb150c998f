//! Axum route handlers for sessions, onboarding, profile edits and the dashboard.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::CvDocument;
use crate::profile::update::{LearningStyleInput, ProfileUpdate, SkillInput};
use crate::session::{AppView, DashboardView, SessionView};
use crate::state::AppState;

/// Multipart field carrying the CV.
const CV_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
pub struct ViewRequest {
    pub view: AppView,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub selected: bool,
    pub session: SessionView,
}

#[derive(Debug, Serialize)]
pub struct RemoveSkillResponse {
    pub removed: usize,
    pub session: SessionView,
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionView>) {
    let session = state.sessions.create().await;
    (StatusCode::CREATED, Json(session.view().await))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    Ok(Json(session.view().await))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/onboarding/cv
///
/// Multipart upload (field `file`, PDF or image). Prefills the profile from the CV.
pub async fn handle_upload_cv(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let document = read_cv(&mut multipart).await?;
    let view = session.upload_cv(state.extractor.as_ref(), document).await?;
    Ok(Json(view))
}

async fn read_cv(multipart: &mut Multipart) -> Result<CvDocument, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(CV_FIELD) {
            continue;
        }
        // Browsers sometimes send octet-stream; fall back to the file extension.
        let mime_type = field
            .content_type()
            .filter(|ct| *ct != "application/octet-stream")
            .map(str::to_string)
            .or_else(|| field.file_name().and_then(mime_from_file_name))
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes: Bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read uploaded file: {e}")))?;
        return Ok(CvDocument::from_bytes(&bytes, &mime_type)?);
    }
    Err(AppError::Validation(format!(
        "Missing multipart field '{CV_FIELD}'"
    )))
}

fn mime_from_file_name(name: &str) -> Option<String> {
    let extension = name.rsplit_once('.')?.1.to_ascii_lowercase();
    let mime = match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => return None,
    };
    Some(mime.to_string())
}

/// POST /api/v1/sessions/:id/onboarding/skip
pub async fn handle_skip_upload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    Ok(Json(session.skip_upload().await?))
}

/// POST /api/v1/sessions/:id/onboarding/next
pub async fn handle_next(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    Ok(Json(session.next().await?))
}

/// POST /api/v1/sessions/:id/onboarding/back
pub async fn handle_back(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    Ok(Json(session.back().await?))
}

/// POST /api/v1/sessions/:id/onboarding/submit
///
/// Runs the career analysis. On failure the session stays on the last step so
/// the client can submit again.
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let view = session
        .submit(state.analyzer.as_ref(), state.chat.clone())
        .await?;
    Ok(Json(view))
}

/// PATCH /api/v1/sessions/:id/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let ((), view) = session.edit_profile(|p| update.apply(p)).await?;
    Ok(Json(view))
}

/// POST /api/v1/sessions/:id/profile/skills
pub async fn handle_add_skill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SkillInput>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let (added, view) = session.edit_profile(|p| p.add_skill(&input.skill)).await?;
    if !added {
        return Err(AppError::Validation("skill cannot be empty".into()));
    }
    Ok(Json(view))
}

/// DELETE /api/v1/sessions/:id/profile/skills/:skill
pub async fn handle_remove_skill(
    State(state): State<AppState>,
    Path((id, skill)): Path<(Uuid, String)>,
) -> Result<Json<RemoveSkillResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    let (removed, session) = session.edit_profile(|p| p.remove_skill(&skill)).await?;
    Ok(Json(RemoveSkillResponse { removed, session }))
}

/// POST /api/v1/sessions/:id/profile/learning-styles/toggle
pub async fn handle_toggle_learning_style(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<LearningStyleInput>,
) -> Result<Json<ToggleResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    let (selected, session) = session
        .edit_profile(|p| p.toggle_learning_style(input.style))
        .await?;
    Ok(Json(ToggleResponse { selected, session }))
}

/// PUT /api/v1/sessions/:id/view
pub async fn handle_set_view(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ViewRequest>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    Ok(Json(session.set_view(request.view).await?))
}

/// GET /api/v1/sessions/:id/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DashboardView>, AppError> {
    let session = state.sessions.get(id).await?;
    Ok(Json(session.dashboard().await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_from_file_name() {
        assert_eq!(mime_from_file_name("cv.PDF").as_deref(), Some("application/pdf"));
        assert_eq!(mime_from_file_name("me.jpeg").as_deref(), Some("image/jpeg"));
        assert_eq!(mime_from_file_name("notes.txt"), None);
        assert_eq!(mime_from_file_name("README"), None);
    }
}
