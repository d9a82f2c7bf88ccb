// Clone service - Orchestrates duplicating a dashboard onto new datasets
//
// Idle -> DashboardCreated -> ChartNameMapBuilt -> DatasetCatalogFetched
//      -> (ChartCreated)* -> PositionPatched -> Done
//
// Every remote call is awaited before the next step starts. The layout is
// patched once, after all chart creations, with the accumulated remap.
use crate::application::dataset_resolver::fetch_catalog;
use crate::application::paging::fetch_dashboards;
use crate::application::platform_api::PlatformApi;
use crate::domain::clone_spec::{ChartIdRemap, CloneSpecEntry};
use crate::domain::dashboard::DashboardManifest;
use crate::domain::dataset::{DatasetCatalog, DatasetRef};
use crate::domain::error::CloneError;
use crate::domain::ids::{ChartId, DashboardId};
use crate::infrastructure::config::CloneSettings;
use indexmap::IndexMap;
use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CloneState {
    Idle,
    DashboardCreated,
    ChartNameMapBuilt,
    DatasetCatalogFetched,
    ChartCreated,
    PositionPatched,
    Done,
}

impl fmt::Display for CloneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone)]
pub struct CloneRequest {
    pub source_title: String,
    pub destination_title: String,
    pub manifest: DashboardManifest,
    pub entries: Vec<CloneSpecEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedChart {
    pub name: String,
    pub source_chart_id: ChartId,
    pub new_chart_id: ChartId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedChart {
    pub name: String,
    pub source_chart_id: ChartId,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneOutcome {
    pub dashboard_id: DashboardId,
    pub dashboard_title: String,
    pub remap: ChartIdRemap,
    pub created: Vec<CreatedChart>,
    pub failed: Vec<FailedChart>,
    pub layout_nodes_patched: usize,
}

/// A run that stopped early. `dashboard_id` is set when the destination
/// dashboard had already been created; nothing is rolled back.
#[derive(Debug, thiserror::Error)]
#[error("clone failed after {state}: {source}")]
pub struct CloneFailure {
    pub state: CloneState,
    pub dashboard_id: Option<DashboardId>,
    #[source]
    pub source: CloneError,
}

/// A chart ready to be created: source id and destination binding resolved
#[derive(Debug, Clone, PartialEq)]
struct PlannedChart {
    source_name: String,
    destination_name: String,
    source_chart_id: ChartId,
    dataset: DatasetRef,
}

struct Progress {
    state: CloneState,
    dashboard_id: Option<DashboardId>,
}

impl Progress {
    fn advance(&mut self, state: CloneState) {
        tracing::info!(
            from = %self.state,
            to = %state,
            dashboard_id = ?self.dashboard_id,
            "Clone state transition"
        );
        self.state = state;
    }

    fn fail(&self, source: CloneError) -> CloneFailure {
        tracing::error!(state = %self.state, dashboard_id = ?self.dashboard_id, error = %source, "Clone aborted");
        CloneFailure {
            state: self.state,
            dashboard_id: self.dashboard_id,
            source,
        }
    }
}

type SuffixSource = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Clone)]
pub struct CloneService {
    api: Arc<dyn PlatformApi>,
    dataset_page_size: u32,
    dashboard_page_size: u32,
    suffix: SuffixSource,
}

impl CloneService {
    pub fn new(api: Arc<dyn PlatformApi>, settings: &CloneSettings) -> Self {
        let len = settings.title_suffix_len;
        Self {
            api,
            dataset_page_size: settings.dataset_page_size,
            dashboard_page_size: settings.dashboard_page_size,
            suffix: Arc::new(move || random_suffix(len)),
        }
    }

    /// Replace the random title suffix generator
    pub fn with_suffix_source(mut self, suffix: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.suffix = Arc::new(suffix);
        self
    }

    pub async fn clone_dashboard(&self, request: CloneRequest) -> Result<CloneOutcome, CloneFailure> {
        let mut progress = Progress {
            state: CloneState::Idle,
            dashboard_id: None,
        };

        let (dashboard_id, dashboard_title) = self
            .create_destination_dashboard(&request.source_title, &request.destination_title)
            .await
            .map_err(|e| progress.fail(e))?;
        progress.dashboard_id = Some(dashboard_id);
        progress.advance(CloneState::DashboardCreated);
        tracing::info!(%dashboard_id, title = %dashboard_title, "Created destination dashboard");

        let chart_names = chart_name_map(&request.manifest).map_err(|e| progress.fail(e))?;
        progress.advance(CloneState::ChartNameMapBuilt);

        let catalog = fetch_catalog(self.api.as_ref(), self.dataset_page_size)
            .await
            .map_err(|e| progress.fail(e))?;
        progress.advance(CloneState::DatasetCatalogFetched);
        tracing::info!(datasets = catalog.len(), charts = chart_names.len(), "Resolved clone inputs");

        let plan = plan_charts(&request.entries, &chart_names, &catalog).map_err(|e| progress.fail(e))?;

        let mut remap = ChartIdRemap::default();
        let mut created = Vec::new();
        let mut failed = Vec::new();

        for chart in &plan {
            match self.create_chart(dashboard_id, chart).await {
                Ok(new_chart_id) => {
                    tracing::info!(
                        chart = %chart.destination_name,
                        source_chart_id = %chart.source_chart_id,
                        %new_chart_id,
                        "Chart created"
                    );
                    remap.insert(chart.source_chart_id, new_chart_id);
                    created.push(CreatedChart {
                        name: chart.destination_name.clone(),
                        source_chart_id: chart.source_chart_id,
                        new_chart_id,
                    });
                    progress.advance(CloneState::ChartCreated);
                }
                Err(e) => {
                    tracing::warn!(
                        chart = %chart.source_name,
                        source_chart_id = %chart.source_chart_id,
                        error = %e,
                        "Chart creation failed, continuing with the next chart"
                    );
                    failed.push(FailedChart {
                        name: chart.source_name.clone(),
                        source_chart_id: chart.source_chart_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let layout_nodes_patched = if remap.is_empty() {
            tracing::warn!(%dashboard_id, "No charts were created, layout left untouched");
            0
        } else {
            let patched = self
                .patch_layout(dashboard_id, &remap)
                .await
                .map_err(|e| progress.fail(e))?;
            progress.advance(CloneState::PositionPatched);
            patched
        };

        progress.advance(CloneState::Done);
        tracing::info!(
            %dashboard_id,
            created = created.len(),
            failed = failed.len(),
            layout_nodes_patched,
            "Dashboard clone finished"
        );

        Ok(CloneOutcome {
            dashboard_id,
            dashboard_title,
            remap,
            created,
            failed,
            layout_nodes_patched,
        })
    }

    async fn create_destination_dashboard(
        &self,
        source_title: &str,
        destination_title: &str,
    ) -> Result<(DashboardId, String), CloneError> {
        let source = fetch_dashboards(self.api.as_ref(), self.dashboard_page_size)
            .await?
            .into_iter()
            .find(|record| record.has_title(source_title))
            .ok_or_else(|| CloneError::SourceDashboardNotFound(source_title.to_string()))?;

        let title = format!("{} {}", destination_title, (self.suffix)());
        let body = source.into_clone_body(&title);

        let id = self
            .api
            .create_dashboard(&body)
            .await?
            .ok_or(CloneError::DashboardCreateFailed)?;
        Ok((id, title))
    }

    async fn create_chart(&self, dashboard_id: DashboardId, chart: &PlannedChart) -> Result<ChartId, CloneError> {
        let create_failed = |reason: &str| CloneError::ChartCreateFailed {
            chart: chart.source_name.clone(),
            reason: reason.to_string(),
        };

        if chart.destination_name.is_empty() {
            tracing::warn!(chart = %chart.source_name, "Destination chart name is blank");
        }

        let mut record = self
            .api
            .get_chart(chart.source_chart_id)
            .await?
            .ok_or_else(|| create_failed("source chart record not found"))?;
        record.strip_server_fields();

        if let Some(current) = record.current_datasource()? {
            tracing::debug!(
                chart = %chart.source_name,
                from = %current.params_key(),
                to = %chart.dataset.params_key(),
                "Rebinding chart datasource"
            );
        }
        record.retarget(dashboard_id, &chart.dataset, &chart.destination_name)?;

        self.api
            .create_chart(&record.into_body())
            .await?
            .ok_or_else(|| create_failed("response carried no chart id"))
    }

    async fn patch_layout(&self, dashboard_id: DashboardId, remap: &ChartIdRemap) -> Result<usize, CloneError> {
        let record = self
            .api
            .get_dashboard(dashboard_id)
            .await?
            .ok_or_else(|| CloneError::DashboardUpdateFailed {
                dashboard_id,
                reason: "dashboard record not found".to_string(),
            })?;

        let mut layout = record.layout(dashboard_id)?;
        let patched = layout.remap_chart_ids(remap);
        let body = record.layout_update_body(&layout);

        self.api
            .update_dashboard(dashboard_id, &body)
            .await
            .map_err(|e| CloneError::DashboardUpdateFailed {
                dashboard_id,
                reason: format!("{:#}", e),
            })?;

        tracing::info!(%dashboard_id, patched, "Destination layout patched");
        Ok(patched)
    }
}

fn chart_name_map(manifest: &DashboardManifest) -> Result<IndexMap<String, ChartId>, CloneError> {
    let names = match &manifest.position {
        Some(layout) => layout.chart_name_to_id_map()?,
        None => IndexMap::new(),
    };
    if names.is_empty() {
        return Err(CloneError::NoChartsFound(manifest.dashboard_title.clone()));
    }
    Ok(names)
}

/// Join the operator rows with the layout's chart ids and the dataset
/// catalog. Rows are keyed by source chart name: a later row for the same
/// source chart replaces the earlier one in place.
fn plan_charts(
    entries: &[CloneSpecEntry],
    chart_names: &IndexMap<String, ChartId>,
    catalog: &DatasetCatalog,
) -> Result<Vec<PlannedChart>, CloneError> {
    let mut plan: IndexMap<&str, PlannedChart> = IndexMap::new();

    for entry in entries {
        let source_chart_id = *chart_names
            .get(&entry.source_chart)
            .ok_or_else(|| CloneError::ChartNotInLayout {
                chart: entry.source_chart.clone(),
            })?;
        let dataset = catalog.resolve(&entry.source_chart, &entry.dataset)?;

        plan.insert(
            entry.source_chart.as_str(),
            PlannedChart {
                source_name: entry.source_chart.clone(),
                destination_name: entry.destination_chart.clone(),
                source_chart_id,
                dataset,
            },
        );
    }

    Ok(plan.into_values().collect())
}

/// `len` random lower-case base-36 characters
pub fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}
