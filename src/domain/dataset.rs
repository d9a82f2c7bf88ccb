// Dataset catalog and name/id resolution
use super::error::CloneError;
use super::ids::DatasetId;
use serde::{Deserialize, Serialize};

fn default_datasource_type() -> String {
    "table".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    pub id: DatasetId,
    pub table_name: String,
    #[serde(default = "default_datasource_type")]
    pub datasource_type: String,
}

impl DatasetDescriptor {
    #[cfg(test)]
    pub fn new(id: i64, table_name: &str, datasource_type: &str) -> Self {
        Self {
            id: DatasetId(id),
            table_name: table_name.to_string(),
            datasource_type: datasource_type.to_string(),
        }
    }

    pub fn to_ref(&self) -> DatasetRef {
        DatasetRef {
            id: self.id,
            datasource_type: self.datasource_type.clone(),
        }
    }
}

/// The `{id, type}` pair a chart binds to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRef {
    pub id: DatasetId,
    #[serde(rename = "type")]
    pub datasource_type: String,
}

impl DatasetRef {
    /// Form used by `params.datasource`, e.g. `10__table`
    pub fn params_key(&self) -> String {
        format!("{}__{}", self.id, self.datasource_type)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetCatalog {
    datasets: Vec<DatasetDescriptor>,
}

impl DatasetCatalog {
    pub fn new(datasets: Vec<DatasetDescriptor>) -> Self {
        Self { datasets }
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    /// Name of the dataset with `id`, or an empty string when the catalog
    /// has no such entry. Stale references must not break extraction.
    pub fn name_for_id(&self, id: DatasetId) -> &str {
        self.datasets
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.table_name.as_str())
            .unwrap_or("")
    }

    /// Resolve a dataset name chosen for `chart`. Names are assumed unique;
    /// when they are not, the first catalog entry wins.
    pub fn resolve(&self, chart: &str, dataset: &str) -> Result<DatasetRef, CloneError> {
        self.datasets
            .iter()
            .find(|d| d.table_name == dataset)
            .map(DatasetDescriptor::to_ref)
            .ok_or_else(|| CloneError::DatasetNotFound {
                chart: chart.to_string(),
                dataset: dataset.to_string(),
            })
    }
}
