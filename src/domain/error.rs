// Domain errors for extraction, editing and cloning
use super::ids::DashboardId;

#[derive(Debug, thiserror::Error)]
pub enum CloneError {
    #[error("dashboard manifest not found in export archive")]
    MissingManifest,

    #[error("malformed manifest '{file}': {reason}")]
    MalformedManifest { file: String, reason: String },

    #[error("source dashboard '{0}' not found")]
    SourceDashboardNotFound(String),

    #[error("dashboard creation returned no id")]
    DashboardCreateFailed,

    #[error("no chart nodes found in the layout of '{0}'")]
    NoChartsFound(String),

    #[error("dataset catalog is empty or missing")]
    DatasetCatalogFetchFailed,

    #[error("cannot find dataset '{dataset}' for chart '{chart}'")]
    DatasetNotFound { chart: String, dataset: String },

    #[error("chart '{chart}' is not placed in the source dashboard layout")]
    ChartNotInLayout { chart: String },

    #[error("chart '{chart}' was not created: {reason}")]
    ChartCreateFailed { chart: String, reason: String },

    #[error("dashboard {0} has no position_json")]
    DashboardLayoutMissing(DashboardId),

    #[error("dashboard {dashboard_id} update failed: {reason}")]
    DashboardUpdateFailed {
        dashboard_id: DashboardId,
        reason: String,
    },

    #[error("platform request failed: {0:#}")]
    Platform(#[from] anyhow::Error),
}

impl CloneError {
    pub fn malformed(file: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedManifest {
            file: file.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("no chart with key '{0}' in this clone configuration")]
    UnknownChart(String),

    #[error("chart '{0}' is not being edited")]
    NotEditing(String),
}
