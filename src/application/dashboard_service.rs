// Dashboard service - Listings and opening a clone session for a source dashboard
use crate::application::bundle_extractor::extract_bundle;
use crate::application::clone_session::CloneSession;
use crate::application::dataset_resolver::fetch_catalog;
use crate::application::paging::fetch_dashboards;
use crate::application::platform_api::PlatformApi;
use crate::domain::dashboard::DashboardSummary;
use crate::domain::dataset::DatasetCatalog;
use crate::domain::error::CloneError;
use crate::domain::ids::DashboardId;
use crate::infrastructure::config::CloneSettings;
use std::sync::Arc;

#[derive(Clone)]
pub struct DashboardService {
    api: Arc<dyn PlatformApi>,
    dataset_page_size: u32,
    dashboard_page_size: u32,
}

impl DashboardService {
    pub fn new(api: Arc<dyn PlatformApi>, settings: &CloneSettings) -> Self {
        Self {
            api,
            dataset_page_size: settings.dataset_page_size,
            dashboard_page_size: settings.dashboard_page_size,
        }
    }

    pub async fn list_dashboards(&self) -> anyhow::Result<Vec<DashboardSummary>> {
        let records = fetch_dashboards(self.api.as_ref(), self.dashboard_page_size).await?;
        Ok(records.iter().filter_map(DashboardSummary::from_record).collect())
    }

    pub async fn list_datasets(&self) -> Result<DatasetCatalog, CloneError> {
        fetch_catalog(self.api.as_ref(), self.dataset_page_size).await
    }

    /// Export the dashboard and extract its clone configuration
    pub async fn open_session(&self, id: DashboardId) -> Result<CloneSession, CloneError> {
        // Extraction tolerates unresolved dataset names, so an empty catalog
        // only leaves the dataset column blank
        let catalog = match self.list_datasets().await {
            Ok(catalog) => catalog,
            Err(CloneError::DatasetCatalogFetchFailed) => {
                tracing::warn!(dashboard_id = %id, "Dataset catalog is empty");
                DatasetCatalog::default()
            }
            Err(e) => return Err(e),
        };

        let archive = self.api.export_dashboard(id).await?;
        let bundle = extract_bundle(&archive, &catalog)?;

        tracing::info!(
            dashboard_id = %id,
            title = %bundle.source_title,
            charts = bundle.entries.len(),
            "Opened clone session"
        );

        Ok(CloneSession::new(id, bundle))
    }
}
