//! HTTP handlers for resume CRUD.
//!
//! Every successful create or update re-renders the PDF. A render failure never undoes the
//! record write: the response still reports success for the record, with `pdfUrl: null` and
//! a `renderError` message so the client can tell the two outcomes apart.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::errors::{ApiJson, AppError};
use crate::models::resume::{Resume, ResumeContent};
use crate::resume::store::{ListQuery, ResumePage, SortField, SortOrder};
use crate::resume::validation::validate_submission;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResumeResponse {
    pub success: bool,
    pub resume_id: i64,
    pub pdf_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResumeResponse {
    pub success: bool,
    pub resume: Resume,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResumeResponse {
    pub success: bool,
    pub resume: Resume,
    pub pdf_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResumeResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResumeListResponse {
    pub success: bool,
    #[serde(flatten)]
    pub page: ResumePage,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub sort_by: Option<SortField>,
    pub order: Option<SortOrder>,
}

impl From<ListParams> for ListQuery {
    fn from(params: ListParams) -> Self {
        let defaults = ListQuery::default();
        ListQuery {
            page: params.page.unwrap_or(defaults.page),
            page_size: params.page_size.unwrap_or(defaults.page_size),
            sort_field: params.sort_by.unwrap_or(defaults.sort_field),
            sort_order: params.order.unwrap_or(defaults.sort_order),
        }
    }
}

/// POST /api/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    ApiJson(raw): ApiJson<Value>,
) -> Result<(StatusCode, Json<CreateResumeResponse>), AppError> {
    let submission = validate_submission(&raw)?;
    let resume_id = state.resumes.create(&submission).await?;
    let (pdf_url, render_error) = render(&state, resume_id, submission.content).await;

    Ok((
        StatusCode::CREATED,
        Json(CreateResumeResponse {
            success: true,
            resume_id,
            pdf_url,
            render_error,
        }),
    ))
}

/// GET /api/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ResumeResponse>, AppError> {
    let resume = state.resumes.get(id).await?;
    Ok(Json(ResumeResponse {
        success: true,
        resume,
    }))
}

/// PUT /api/resumes/:id
///
/// Full replacement. The body's `userId` must name the existing owner. The artifact lock
/// is held from the record write through the re-render.
pub async fn handle_update_resume(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(raw): ApiJson<Value>,
) -> Result<Json<UpdateResumeResponse>, AppError> {
    let submission = validate_submission(&raw)?;
    let _guard = state.renderer.lock(id).await;

    let existing = state.resumes.get(id).await?;
    if existing.user_id != submission.user_id {
        return Err(AppError::Validation(
            "userId does not match the resume owner".to_string(),
        ));
    }

    let resume = state.resumes.update(id, &submission.content).await?;
    let (pdf_url, render_error) = render(&state, id, resume.content.clone()).await;

    Ok(Json(UpdateResumeResponse {
        success: true,
        resume,
        pdf_url,
        render_error,
    }))
}

/// DELETE /api/resumes/:id
///
/// The record goes first. A failure to remove the artifact is reported but does not fail
/// the request. Both steps run under the artifact lock, so an update in flight for the same
/// id either finishes its render before the removal or finds the record gone.
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResumeResponse>, AppError> {
    let guard = state.renderer.lock(id).await;
    state.resumes.delete(id).await?;

    let artifact_error = match state.renderer.remove(id) {
        Ok(_) => None,
        Err(e) => {
            error!("Resume {id} deleted but its PDF could not be removed: {e}");
            Some(e.to_string())
        }
    };
    state.renderer.forget(id);
    drop(guard);

    Ok(Json(DeleteResumeResponse {
        success: true,
        message: "Resume deleted successfully".to_string(),
        artifact_error,
    }))
}

/// GET /api/users/:userId/resumes
pub async fn handle_list_user_resumes(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(params): Query<ListParams>,
) -> Result<Json<ResumeListResponse>, AppError> {
    let page = state.resumes.get_by_user(user_id, params.into()).await?;
    info!(
        "Listed {} of {} resumes for user {user_id}",
        page.resumes.len(),
        page.total_count
    );
    Ok(Json(ResumeListResponse {
        success: true,
        page,
    }))
}

async fn render(
    state: &AppState,
    id: i64,
    content: ResumeContent,
) -> (Option<String>, Option<String>) {
    match state.renderer.render_blocking(id, content).await {
        Ok(url) => (Some(url), None),
        Err(e) => {
            error!("Resume {id} saved but rendering failed: {e}");
            (None, Some(e.to_string()))
        }
    }
}
