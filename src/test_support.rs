// Test support - In-memory platform and a sample "Sales" export
use crate::application::platform_api::{DashboardPage, DatasetPage, Page, PlatformApi};
use crate::domain::chart::ChartRecord;
use crate::domain::dashboard::DashboardRecord;
use crate::domain::dataset::{DatasetCatalog, DatasetDescriptor};
use crate::domain::ids::{ChartId, DashboardId};
use anyhow::{anyhow, bail};
use async_trait::async_trait;
use bytes::Bytes;
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Write};
use std::sync::Mutex;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const FIRST_DASHBOARD_ID: i64 = 500;
const FIRST_CHART_ID: i64 = 900;
const FIRST_FILLER_ID: i64 = 1000;

#[derive(Default)]
struct FakeState {
    dashboards: IndexMap<DashboardId, Map<String, Value>>,
    exports: HashMap<DashboardId, Vec<u8>>,
    charts: HashMap<ChartId, Map<String, Value>>,
    datasets: Vec<DatasetDescriptor>,
    failing_charts: HashSet<String>,
    dashboard_create_without_id: bool,
    created_dashboards: Vec<Value>,
    created_dashboard_ids: Vec<DashboardId>,
    created_charts: Vec<Value>,
    dashboard_updates: Vec<(DashboardId, Value)>,
    dataset_pages: Vec<(u32, u32)>,
    dashboard_pages: Vec<(u32, u32)>,
    max_page_size: Option<u32>,
}

impl FakeState {
    /// Slice one page the way the server does, honouring its page size cap
    fn page_of<T: Clone>(&self, rows: &[T], page: u32, page_size: u32) -> Page<T> {
        let size = self.max_page_size.map_or(page_size, |cap| page_size.min(cap)) as usize;
        let start = (page as usize * size).min(rows.len());
        let end = (start + size).min(rows.len());
        Page {
            count: Some(rows.len()),
            result: Some(rows[start..end].to_vec()),
        }
    }
}

/// Records every write; reads are served from the seeded records
#[derive(Default)]
pub struct FakePlatform {
    state: Mutex<FakeState>,
}

impl FakePlatform {
    /// Source dashboard 1 "Sales" with charts 101 (Revenue) and 102 (Churn)
    pub fn sales() -> Self {
        let mut state = FakeState::default();
        state.dashboards.insert(DashboardId(1), object(sales_dashboard_record()));
        state.exports.insert(DashboardId(1), sales_archive());
        state
            .charts
            .insert(ChartId(101), object(chart_record(101, "Revenue", 10)));
        state
            .charts
            .insert(ChartId(102), object(chart_record(102, "Churn", 11)));
        state.datasets = sales_datasets();

        Self {
            state: Mutex::new(state),
        }
    }

    pub fn with_datasets(mut self, datasets: Vec<DatasetDescriptor>) -> Self {
        self.state_mut().datasets = datasets;
        self
    }

    /// Reject chart creation for bodies whose `slice_name` is `name`
    pub fn failing_chart(mut self, name: &str) -> Self {
        self.state_mut().failing_charts.insert(name.to_string());
        self
    }

    /// Serve at most `cap` rows per page whatever page size is requested
    pub fn with_max_page_size(mut self, cap: u32) -> Self {
        self.state_mut().max_page_size = Some(cap);
        self
    }

    /// Unrelated dashboards listed ahead of the seeded ones
    pub fn with_leading_dashboards(mut self, count: i64) -> Self {
        let state = self.state_mut();
        let mut dashboards: IndexMap<DashboardId, Map<String, Value>> = (0..count)
            .map(|n| {
                let id = DashboardId(FIRST_FILLER_ID + n);
                let record = json!({
                    "id": id.get(),
                    "dashboard_title": format!("Filler {}", n),
                    "status": "draft",
                });
                (id, object(record))
            })
            .collect();
        dashboards.extend(std::mem::take(&mut state.dashboards));
        state.dashboards = dashboards;
        self
    }

    pub fn dashboard_create_returns_no_id(mut self) -> Self {
        self.state_mut().dashboard_create_without_id = true;
        self
    }

    pub fn dataset_pages_requested(&self) -> Vec<(u32, u32)> {
        self.state().dataset_pages.clone()
    }

    pub fn dashboard_pages_requested(&self) -> Vec<(u32, u32)> {
        self.state().dashboard_pages.clone()
    }

    /// Create bodies exactly as submitted
    pub fn created_dashboards(&self) -> Vec<Value> {
        self.state().created_dashboards.clone()
    }

    pub fn created_dashboard_ids(&self) -> Vec<DashboardId> {
        self.state().created_dashboard_ids.clone()
    }

    /// Accepted chart create bodies
    pub fn created_charts(&self) -> Vec<Value> {
        self.state().created_charts.clone()
    }

    pub fn dashboard_updates(&self) -> Vec<(DashboardId, Value)> {
        self.state().dashboard_updates.clone()
    }

    /// Current stored record, after any updates
    pub fn dashboard(&self, id: DashboardId) -> Option<DashboardRecord> {
        self.state()
            .dashboards
            .get(&id)
            .cloned()
            .map(DashboardRecord::new)
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    fn state_mut(&mut self) -> &mut FakeState {
        self.state.get_mut().unwrap()
    }
}

#[async_trait]
impl PlatformApi for FakePlatform {
    async fn fetch_dashboard_page(&self, page: u32, page_size: u32) -> anyhow::Result<DashboardPage> {
        let mut state = self.state();
        state.dashboard_pages.push((page, page_size));

        let records: Vec<DashboardRecord> = state
            .dashboards
            .values()
            .cloned()
            .map(DashboardRecord::new)
            .collect();
        Ok(state.page_of(&records, page, page_size))
    }

    async fn export_dashboard(&self, id: DashboardId) -> anyhow::Result<Bytes> {
        self.state()
            .exports
            .get(&id)
            .map(|bytes| Bytes::from(bytes.clone()))
            .ok_or_else(|| anyhow!("Export request failed with status 404 Not Found: dashboard {}", id))
    }

    async fn create_dashboard(&self, body: &Value) -> anyhow::Result<Option<DashboardId>> {
        let mut state = self.state();
        state.created_dashboards.push(body.clone());
        if state.dashboard_create_without_id {
            return Ok(None);
        }

        let id = DashboardId(FIRST_DASHBOARD_ID + state.created_dashboard_ids.len() as i64);
        let mut record = object(body.clone());
        record.insert("id".to_string(), id.into());
        state.dashboards.insert(id, record);
        state.created_dashboard_ids.push(id);
        Ok(Some(id))
    }

    async fn get_dashboard(&self, id: DashboardId) -> anyhow::Result<Option<DashboardRecord>> {
        Ok(self.dashboard(id))
    }

    async fn update_dashboard(&self, id: DashboardId, body: &Value) -> anyhow::Result<()> {
        let mut state = self.state();
        let Some(record) = state.dashboards.get_mut(&id) else {
            bail!("Update request failed with status 404 Not Found: dashboard {}", id);
        };
        for (field, value) in object(body.clone()) {
            record.insert(field, value);
        }
        state.dashboard_updates.push((id, body.clone()));
        Ok(())
    }

    async fn fetch_dataset_page(&self, page: u32, page_size: u32) -> anyhow::Result<DatasetPage> {
        let mut state = self.state();
        state.dataset_pages.push((page, page_size));
        Ok(state.page_of(&state.datasets, page, page_size))
    }

    async fn get_chart(&self, id: ChartId) -> anyhow::Result<Option<ChartRecord>> {
        Ok(self.state().charts.get(&id).cloned().map(ChartRecord::new))
    }

    async fn create_chart(&self, body: &Value) -> anyhow::Result<Option<ChartId>> {
        let mut state = self.state();
        let name = body.get("slice_name").and_then(Value::as_str).unwrap_or("");
        if state.failing_charts.contains(name) {
            bail!("Chart request failed with status 422 Unprocessable Entity: {}", name);
        }

        let id = ChartId(FIRST_CHART_ID + state.created_charts.len() as i64);
        state.created_charts.push(body.clone());
        Ok(Some(id))
    }
}

/// Datasets 10 orders, 11 accounts, 20 orders_eu
pub fn sales_catalog() -> DatasetCatalog {
    DatasetCatalog::new(sales_datasets())
}

fn sales_datasets() -> Vec<DatasetDescriptor> {
    vec![
        DatasetDescriptor::new(10, "orders", "table"),
        DatasetDescriptor::new(11, "accounts", "table"),
        DatasetDescriptor::new(20, "orders_eu", "table"),
    ]
}

/// Export archive of the "Sales" dashboard
pub fn sales_archive() -> Vec<u8> {
    let dashboard = serde_yaml::to_string(&json!({
        "dashboard_title": "Sales",
        "description": null,
        "css": "",
        "slug": "sales",
        "uuid": "dash-uuid-sales",
        "position": sales_layout(),
        "metadata": {"color_scheme": "", "refresh_frequency": 0},
        "version": "1.0.0",
    }))
    .unwrap();

    build_archive(&[
        (
            "dashboard_export_20261018T000000/metadata.yaml",
            "version: 1.0.0\ntype: Dashboard\ntimestamp: '2026-10-18T00:00:00+00:00'\n",
        ),
        ("dashboard_export_20261018T000000/dashboards/Sales_1.yaml", &dashboard),
        (
            "dashboard_export_20261018T000000/charts/Revenue_101.yaml",
            "slice_name: Revenue\nviz_type: big_number_total\nparams:\n  datasource: '10__table'\n  metric: count\nuuid: uuid-revenue\ndataset_uuid: ds-orders\nversion: 1.0.0\n",
        ),
        (
            "dashboard_export_20261018T000000/charts/Churn_102.yaml",
            "slice_name: Churn\nviz_type: line\nparams:\n  datasource: '11__table'\n  metric: churned\nuuid: uuid-churn\ndataset_uuid: ds-accounts\nversion: 1.0.0\n",
        ),
        (
            "dashboard_export_20261018T000000/datasets/warehouse/orders.yaml",
            "table_name: orders\nschema: public\nuuid: ds-orders\nversion: 1.0.0\n",
        ),
    ])
}

/// In-memory ZIP with the given `(path, contents)` entries, in order
pub fn build_archive(files: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, contents) in files {
        writer.start_file(*name, options).unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn sales_layout() -> Value {
    json!({
        "DASHBOARD_VERSION_KEY": "v2",
        "ROOT_ID": {"children": ["GRID_ID"], "id": "ROOT_ID", "type": "ROOT"},
        "GRID_ID": {"children": ["ROW-1"], "id": "GRID_ID", "parents": ["ROOT_ID"], "type": "GRID"},
        "ROW-1": {
            "children": ["CHART-rev", "CHART-churn", "MARKDOWN-notes"],
            "id": "ROW-1",
            "meta": {"background": "BACKGROUND_TRANSPARENT"},
            "parents": ["ROOT_ID", "GRID_ID"],
            "type": "ROW"
        },
        "CHART-rev": {
            "children": [],
            "id": "CHART-rev",
            "meta": {"chartId": 101, "height": 50, "sliceName": "Revenue", "uuid": "uuid-revenue", "width": 4},
            "parents": ["ROOT_ID", "GRID_ID", "ROW-1"],
            "type": "CHART"
        },
        "CHART-churn": {
            "children": [],
            "id": "CHART-churn",
            "meta": {"chartId": 102, "height": 50, "sliceName": "Churn", "uuid": "uuid-churn", "width": 4},
            "parents": ["ROOT_ID", "GRID_ID", "ROW-1"],
            "type": "CHART"
        },
        "MARKDOWN-notes": {
            "children": [],
            "id": "MARKDOWN-notes",
            "meta": {"code": "# Notes", "height": 50, "width": 4},
            "parents": ["ROOT_ID", "GRID_ID", "ROW-1"],
            "type": "MARKDOWN"
        }
    })
}

fn sales_dashboard_record() -> Value {
    json!({
        "id": 1,
        "dashboard_title": "Sales",
        "slug": "sales",
        "css": "",
        "status": "published",
        "published": true,
        "changed_on_delta_humanized": "2 days ago",
        "changed_by": {"first_name": "Ada", "last_name": "Lovelace"},
        "changed_by_name": "Ada Lovelace",
        "url": "/superset/dashboard/sales/",
        "thumbnail_url": "/api/v1/dashboard/1/thumbnail/abc/",
        "certified_by": null,
        "certification_details": null,
        "json_metadata": "{\"color_scheme\": \"\"}",
        "owners": [{"id": 1, "first_name": "Ada", "last_name": "Lovelace"}],
        "roles": [],
        "tags": [],
        "position_json": sales_layout().to_string(),
    })
}

fn chart_record(id: i64, name: &str, dataset: i64) -> Value {
    let params_key = format!("{}__table", dataset);
    json!({
        "id": id,
        "slice_name": name,
        "viz_type": "big_number_total",
        "datasource_id": dataset,
        "datasource_type": "table",
        "dashboards": [1],
        "description": null,
        "cache_timeout": null,
        "params": json!({"datasource": params_key, "metric": "count"}).to_string(),
        "query_context": json!({
            "datasource": {"id": dataset, "type": "table"},
            "form_data": {"datasource": params_key, "metric": "count"},
            "queries": [{"metrics": ["count"]}]
        })
        .to_string(),
        "owners": [{"id": 1}],
        "tags": [],
        "thumbnail_url": format!("/api/v1/chart/{}/thumbnail/abc/", id),
        "url": format!("/explore/?slice_id={}", id),
        "changed_on_delta_humanized": "2 days ago",
    })
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(fields) => fields,
        _ => Map::new(),
    }
}
