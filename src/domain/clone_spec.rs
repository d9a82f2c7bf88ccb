// Clone configuration rows and the source-to-clone chart id remap
use super::ids::ChartId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One operator-editable row: which source chart becomes which destination
/// chart, bound to which dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneSpecEntry {
    pub uuid: String,
    pub source_chart: String,
    pub destination_chart: String,
    pub dataset: String,
}

impl CloneSpecEntry {
    /// Row as produced by extraction: no destination name yet, dataset
    /// defaulted to the source chart's dataset name.
    pub fn from_source(uuid: String, source_chart: String, dataset: String) -> Self {
        Self {
            uuid,
            source_chart,
            destination_chart: String::new(),
            dataset,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChartIdRemap(IndexMap<ChartId, ChartId>);

impl ChartIdRemap {
    pub fn insert(&mut self, source: ChartId, created: ChartId) {
        self.0.insert(source, created);
    }

    pub fn get(&self, source: ChartId) -> Option<ChartId> {
        self.0.get(&source).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn sources(&self) -> impl Iterator<Item = ChartId> + '_ {
        self.0.keys().copied()
    }

    pub fn created(&self) -> impl Iterator<Item = ChartId> + '_ {
        self.0.values().copied()
    }
}
