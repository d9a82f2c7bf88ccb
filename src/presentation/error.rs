// HTTP error mapping - JSON `{error, code}` bodies for every failure
use crate::application::clone_service::CloneFailure;
use crate::domain::error::{CloneError, EditorError};
use crate::domain::ids::DashboardId;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Clone(#[from] CloneError),

    /// A clone run that stopped part way
    #[error(transparent)]
    Failure(#[from] CloneFailure),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error("no clone session for dashboard {0}")]
    SessionNotFound(DashboardId),

    #[error("{0}")]
    BadRequest(String),

    #[error("platform request failed: {0:#}")]
    Platform(#[from] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, code) = match &self {
            ApiError::Clone(err) => classify(err),
            ApiError::Failure(failure) => classify(&failure.source),
            ApiError::Editor(EditorError::UnknownChart(_)) => (StatusCode::NOT_FOUND, "UNKNOWN_CHART"),
            ApiError::Editor(EditorError::NotEditing(_)) => (StatusCode::BAD_REQUEST, "NOT_EDITING"),
            ApiError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Platform(_) => (StatusCode::BAD_GATEWAY, "PLATFORM_ERROR"),
        };

        if status.is_server_error() {
            tracing::error!(error = %message, code, "Request failed");
        }

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let ApiError::Failure(failure) = &self {
            body["state"] = json!(failure.state);
            body["dashboardId"] = json!(failure.dashboard_id);
        }

        (status, Json(body)).into_response()
    }
}

fn classify(err: &CloneError) -> (StatusCode, &'static str) {
    match err {
        CloneError::SourceDashboardNotFound(_) => (StatusCode::NOT_FOUND, "SOURCE_DASHBOARD_NOT_FOUND"),
        CloneError::MissingManifest | CloneError::MalformedManifest { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_EXPORT")
        }
        CloneError::NoChartsFound(_) => (StatusCode::UNPROCESSABLE_ENTITY, "NO_CHARTS_FOUND"),
        CloneError::DatasetCatalogFetchFailed => (StatusCode::UNPROCESSABLE_ENTITY, "DATASET_CATALOG_EMPTY"),
        CloneError::DatasetNotFound { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "DATASET_NOT_FOUND"),
        CloneError::ChartNotInLayout { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "CHART_NOT_IN_LAYOUT"),
        CloneError::DashboardCreateFailed
        | CloneError::ChartCreateFailed { .. }
        | CloneError::DashboardLayoutMissing(_)
        | CloneError::DashboardUpdateFailed { .. }
        | CloneError::Platform(_) => (StatusCode::BAD_GATEWAY, "PLATFORM_ERROR"),
    }
}
