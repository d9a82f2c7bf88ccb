// Dashboard layout - Position map of rows, columns, charts and markdown nodes
use super::clone_spec::ChartIdRemap;
use super::error::CloneError;
use super::ids::ChartId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Node ids of chart nodes carry this prefix; every other node is opaque.
pub const CHART_NODE_PREFIX: &str = "CHART-";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutPositionMap(Map<String, Value>);

impl LayoutPositionMap {
    #[cfg(test)]
    pub fn new(nodes: Map<String, Value>) -> Self {
        Self(nodes)
    }

    /// Parse a serialized `position_json` blob
    pub fn parse(source: &str, text: &str) -> Result<Self, CloneError> {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(nodes)) => Ok(Self(nodes)),
            Ok(other) => Err(CloneError::malformed(
                source,
                format!("position_json must be an object, found {}", json_kind(&other)),
            )),
            Err(e) => Err(CloneError::malformed(source, e)),
        }
    }

    pub fn to_json_string(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn node(&self, node_id: &str) -> Option<&Value> {
        self.0.get(node_id)
    }

    pub fn chart_nodes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0
            .iter()
            .filter(|(key, _)| key.starts_with(CHART_NODE_PREFIX))
            .map(|(key, node)| (key.as_str(), node))
    }

    /// Map each chart node's `sliceName` to its `chartId`. A later node with
    /// the same name replaces an earlier one.
    pub fn chart_name_to_id_map(&self) -> Result<IndexMap<String, ChartId>, CloneError> {
        let mut names = IndexMap::new();

        for (node_id, node) in self.chart_nodes() {
            let meta = node.get("meta").ok_or_else(|| {
                CloneError::malformed("position", format!("chart node '{}' has no meta", node_id))
            })?;
            let chart_id = meta
                .get("chartId")
                .and_then(ChartId::from_value)
                .ok_or_else(|| {
                    CloneError::malformed(
                        "position",
                        format!("chart node '{}' has no integer meta.chartId", node_id),
                    )
                })?;
            let slice_name = meta
                .get("sliceName")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    CloneError::malformed(
                        "position",
                        format!("chart node '{}' has no meta.sliceName", node_id),
                    )
                })?;

            names.insert(slice_name.to_string(), chart_id);
        }

        Ok(names)
    }

    /// Chart ids referenced by chart nodes, in node order
    pub fn chart_ids(&self) -> Vec<ChartId> {
        self.chart_nodes()
            .filter_map(|(_, node)| node.pointer("/meta/chartId").and_then(ChartId::from_value))
            .collect()
    }

    /// Point every chart node whose chart id is a remap key at the new chart.
    /// Returns the number of nodes rewritten.
    pub fn remap_chart_ids(&mut self, remap: &ChartIdRemap) -> usize {
        let mut rewritten = 0;

        for (node_id, node) in self.0.iter_mut() {
            if !node_id.starts_with(CHART_NODE_PREFIX) {
                continue;
            }
            let Some(meta) = node.get_mut("meta").and_then(Value::as_object_mut) else {
                continue;
            };
            let Some(source_id) = meta.get("chartId").and_then(ChartId::from_value) else {
                continue;
            };
            if let Some(new_id) = remap.get(source_id) {
                meta.insert("chartId".to_string(), new_id.into());
                rewritten += 1;
            }
        }

        rewritten
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
