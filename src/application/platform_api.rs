// Platform API trait - Authenticated access to the BI server
use crate::domain::chart::ChartRecord;
use crate::domain::dashboard::DashboardRecord;
use crate::domain::dataset::DatasetDescriptor;
use crate::domain::ids::{ChartId, DashboardId};
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

/// One page of a paged listing
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Total number of rows on the server, when reported
    pub count: Option<usize>,
    pub result: Option<Vec<T>>,
}

pub type DashboardPage = Page<DashboardRecord>;
pub type DatasetPage = Page<DatasetDescriptor>;

#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Fetch one page of the dashboards visible to the session. The server
    /// may cap `page_size` below the requested value.
    async fn fetch_dashboard_page(&self, page: u32, page_size: u32) -> anyhow::Result<DashboardPage>;

    /// Download the ZIP export of one dashboard
    async fn export_dashboard(&self, id: DashboardId) -> anyhow::Result<Bytes>;

    /// Create a dashboard; `None` when the response carries no id
    async fn create_dashboard(&self, body: &Value) -> anyhow::Result<Option<DashboardId>>;

    /// Fetch one dashboard's full record including `position_json`
    async fn get_dashboard(&self, id: DashboardId) -> anyhow::Result<Option<DashboardRecord>>;

    /// Replace the submitted fields of a dashboard
    async fn update_dashboard(&self, id: DashboardId, body: &Value) -> anyhow::Result<()>;

    /// Fetch one page of `{id, table_name, datasource_type}` dataset rows
    async fn fetch_dataset_page(&self, page: u32, page_size: u32) -> anyhow::Result<DatasetPage>;

    /// Fetch one chart's full record including `query_context`
    async fn get_chart(&self, id: ChartId) -> anyhow::Result<Option<ChartRecord>>;

    /// Create a chart; `None` when the response carries no id
    async fn create_chart(&self, body: &Value) -> anyhow::Result<Option<ChartId>>;
}
