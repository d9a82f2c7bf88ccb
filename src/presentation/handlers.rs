// HTTP request handlers
use crate::application::clone_service::CloneOutcome;
use crate::application::clone_session::SessionView;
use crate::application::config_editor::EditableField;
use crate::domain::clone_spec::CloneSpecEntry;
use crate::domain::dashboard::DashboardSummary;
use crate::domain::dataset::DatasetCatalog;
use crate::domain::ids::DashboardId;
use crate::presentation::app_state::AppState;
use crate::presentation::error::{ApiError, ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct FieldUpdate {
    pub field: EditableField,
    pub value: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneSubmission {
    pub destination_title: String,
}

#[derive(Serialize)]
pub struct Discarded {
    pub discarded: bool,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn list_dashboards(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<DashboardSummary>>> {
    Ok(Json(state.dashboard_service.list_dashboards().await?))
}

pub async fn list_datasets(State(state): State<Arc<AppState>>) -> ApiResult<Json<DatasetCatalog>> {
    Ok(Json(state.dashboard_service.list_datasets().await?))
}

/// Export and extract the dashboard, replacing any open session for it
pub async fn open_session(
    Path(id): Path<DashboardId>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<(StatusCode, Json<SessionView>)> {
    let session = state.dashboard_service.open_session(id).await?;
    let view = state.sessions.insert(session).await;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_session(
    Path(id): Path<DashboardId>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SessionView>> {
    state
        .sessions
        .view(id)
        .await
        .map(Json)
        .ok_or(ApiError::SessionNotFound(id))
}

pub async fn begin_edit(
    Path((id, uuid)): Path<(DashboardId, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<CloneSpecEntry>> {
    let draft = state
        .sessions
        .edit(id, |editor| editor.begin_edit(&uuid).cloned())
        .await
        .ok_or(ApiError::SessionNotFound(id))??;
    Ok(Json(draft))
}

pub async fn apply_field(
    Path((id, uuid)): Path<(DashboardId, String)>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<FieldUpdate>,
) -> ApiResult<Json<CloneSpecEntry>> {
    let draft = state
        .sessions
        .edit(id, |editor| {
            editor
                .apply_field(&uuid, update.field, update.value)
                .cloned()
        })
        .await
        .ok_or(ApiError::SessionNotFound(id))??;
    Ok(Json(draft))
}

pub async fn commit_edit(
    Path((id, uuid)): Path<(DashboardId, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<CloneSpecEntry>> {
    let row = state
        .sessions
        .edit(id, |editor| editor.commit(&uuid).cloned())
        .await
        .ok_or(ApiError::SessionNotFound(id))??;
    Ok(Json(row))
}

pub async fn discard_edit(
    Path((id, uuid)): Path<(DashboardId, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Discarded>> {
    let discarded = state
        .sessions
        .edit(id, |editor| editor.discard(&uuid))
        .await
        .ok_or(ApiError::SessionNotFound(id))??;
    Ok(Json(Discarded { discarded }))
}

/// Run the clone with the session's committed rows. The session is consumed
/// once the destination dashboard exists. A failure before that puts it back.
pub async fn submit_clone(
    Path(id): Path<DashboardId>,
    State(state): State<Arc<AppState>>,
    Json(submission): Json<CloneSubmission>,
) -> ApiResult<Json<CloneOutcome>> {
    let title = submission.destination_title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("destinationTitle must not be empty".to_string()));
    }

    let session = state
        .sessions
        .take(id)
        .await
        .ok_or(ApiError::SessionNotFound(id))?;
    let retained = session.clone();

    match state
        .clone_service
        .clone_dashboard(session.into_request(title.to_string()))
        .await
    {
        Ok(outcome) => Ok(Json(outcome)),
        Err(failure) => {
            if failure.dashboard_id.is_none() {
                tracing::info!(dashboard_id = %id, "Nothing was created, session kept");
                state.sessions.insert(retained).await;
            }
            Err(failure.into())
        }
    }
}
