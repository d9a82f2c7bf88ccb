// Chart models - Archive manifest and live chart record
use super::dataset::DatasetRef;
use super::error::CloneError;
use super::ids::{DashboardId, DatasetId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields the platform manages itself and rejects on create
const CHART_SERVER_FIELDS: [&str; 6] = [
    "thumbnail_url",
    "url",
    "id",
    "changed_on_delta_humanized",
    "owners",
    "tags",
];

/// A chart file from an export archive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartManifest {
    pub uuid: String,
    pub slice_name: String,
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChartManifest {
    pub fn from_yaml(file: &str, text: &str) -> Result<Self, CloneError> {
        serde_yaml::from_str(text).map_err(|e| CloneError::malformed(file, e))
    }

    /// Dataset id the chart was built on, read from `params.datasource`
    pub fn datasource_id(&self, file: &str) -> Result<DatasetId, CloneError> {
        let raw = self
            .params
            .as_ref()
            .and_then(|params| params.get("datasource"))
            .ok_or_else(|| CloneError::malformed(file, "chart has no params.datasource"))?;

        parse_datasource_id(raw).ok_or_else(|| {
            CloneError::malformed(file, format!("unrecognised datasource reference {}", raw))
        })
    }
}

/// Accepts a bare integer or the `<id>__<type>` form, e.g. `10__table`
pub fn parse_datasource_id(value: &Value) -> Option<DatasetId> {
    match value {
        Value::Number(_) => DatasetId::from_value(value),
        Value::String(s) => s.split("__").next()?.trim().parse().ok().map(DatasetId),
        _ => None,
    }
}

/// A chart as returned by `GET chart/<id>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartRecord(Map<String, Value>);

impl ChartRecord {
    #[cfg(test)]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn strip_server_fields(&mut self) {
        for field in CHART_SERVER_FIELDS {
            self.0.remove(field);
        }
    }

    /// Datasource the chart currently queries, from its `query_context`.
    /// Charts saved before query contexts existed carry none.
    pub fn current_datasource(&self) -> Result<Option<DatasetRef>, CloneError> {
        let Some(text) = self.0.get("query_context").and_then(Value::as_str) else {
            return Ok(None);
        };
        let context: Value =
            serde_json::from_str(text).map_err(|e| CloneError::malformed("query_context", e))?;

        match context.get("datasource") {
            Some(datasource) => serde_json::from_value(datasource.clone())
                .map(Some)
                .map_err(|e| CloneError::malformed("query_context", e)),
            None => Ok(None),
        }
    }

    /// Rebind the chart to `dataset`, link it to `dashboard` only and rename it
    pub fn retarget(
        &mut self,
        dashboard: DashboardId,
        dataset: &DatasetRef,
        slice_name: &str,
    ) -> Result<(), CloneError> {
        self.0
            .insert("dashboards".to_string(), Value::Array(vec![dashboard.into()]));
        self.0.insert("datasource_id".to_string(), dataset.id.into());
        self.0.insert(
            "datasource_type".to_string(),
            Value::String(dataset.datasource_type.clone()),
        );
        self.0
            .insert("slice_name".to_string(), Value::String(slice_name.to_string()));

        let datasource = serde_json::json!({"id": dataset.id, "type": dataset.datasource_type});
        let params_key = Value::String(dataset.params_key());

        self.rewrite_embedded_json("query_context", |context| {
            context.insert("datasource".to_string(), datasource);
            if let Some(form_data) = context.get_mut("form_data").and_then(Value::as_object_mut) {
                if form_data.contains_key("datasource") {
                    form_data.insert("datasource".to_string(), params_key.clone());
                }
            }
        })?;
        self.rewrite_embedded_json("params", |params| {
            if params.contains_key("datasource") {
                params.insert("datasource".to_string(), params_key.clone());
            }
        })
    }

    pub fn into_body(self) -> Value {
        Value::Object(self.0)
    }

    /// Edit a field holding a JSON object serialized as a string. Absent
    /// and null fields are left untouched.
    fn rewrite_embedded_json(
        &mut self,
        field: &str,
        edit: impl FnOnce(&mut Map<String, Value>),
    ) -> Result<(), CloneError> {
        let Some(text) = self.0.get(field).and_then(Value::as_str) else {
            return Ok(());
        };
        let mut object = match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(object)) => object,
            Ok(_) => return Err(CloneError::malformed(field, "expected a JSON object")),
            Err(e) => return Err(CloneError::malformed(field, e)),
        };

        edit(&mut object);
        self.0
            .insert(field.to_string(), Value::String(Value::Object(object).to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> ChartRecord {
        match json!({
            "id": 101,
            "slice_name": "Revenue",
            "viz_type": "big_number_total",
            "params": "{\"datasource\":\"10__table\",\"metric\":\"count\"}",
            "query_context": "{\"datasource\":{\"id\":10,\"type\":\"table\"},\"form_data\":{\"datasource\":\"10__table\"},\"queries\":[]}",
            "dashboards": [{"id": 1, "dashboard_title": "Sales"}],
            "owners": [{"id": 1}],
            "tags": [],
            "thumbnail_url": "/api/v1/chart/101/thumbnail/abc/",
            "url": "/explore/?slice_id=101",
            "changed_on_delta_humanized": "2 days ago",
            "cache_timeout": null
        }) {
            Value::Object(map) => ChartRecord::new(map),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_manifest_datasource_id_forms() {
        let yaml = "uuid: u-1\nslice_name: Revenue\nparams:\n  datasource: 10__table\nviz_type: table\n";
        let manifest = ChartManifest::from_yaml("charts/Revenue.yaml", yaml).unwrap();
        assert_eq!(manifest.datasource_id("charts/Revenue.yaml").unwrap(), DatasetId(10));
        assert_eq!(manifest.extra["viz_type"], json!("table"));

        assert_eq!(parse_datasource_id(&json!(11)), Some(DatasetId(11)));
        assert_eq!(parse_datasource_id(&json!("abc__table")), None);
    }

    #[test]
    fn test_manifest_missing_field_is_malformed() {
        let err = ChartManifest::from_yaml("charts/x.yaml", "uuid: u-1\n").unwrap_err();
        assert!(matches!(err, CloneError::MalformedManifest { .. }));

        let manifest = ChartManifest::from_yaml("charts/x.yaml", "uuid: u\nslice_name: X\n").unwrap();
        assert!(manifest.datasource_id("charts/x.yaml").is_err());
    }

    #[test]
    fn test_strip_server_fields() {
        let mut record = record();
        record.strip_server_fields();
        for field in CHART_SERVER_FIELDS {
            assert!(record.get(field).is_none(), "{} should be stripped", field);
        }
        assert!(record.get("cache_timeout").is_some());
    }

    #[test]
    fn test_current_datasource_reads_query_context() {
        let current = record().current_datasource().unwrap().unwrap();
        assert_eq!(current.id, DatasetId(10));
        assert_eq!(current.datasource_type, "table");

        let mut legacy = record();
        legacy.0.insert("query_context".to_string(), Value::Null);
        assert_eq!(legacy.current_datasource().unwrap(), None);
    }

    #[test]
    fn test_retarget_rewrites_every_datasource_reference() {
        let mut record = record();
        let dataset = DatasetRef {
            id: DatasetId(20),
            datasource_type: "table".to_string(),
        };
        record.retarget(DashboardId(500), &dataset, "Revenue EU").unwrap();

        assert_eq!(record.get("dashboards"), Some(&json!([500])));
        assert_eq!(record.get("datasource_id"), Some(&json!(20)));
        assert_eq!(record.get("datasource_type"), Some(&json!("table")));
        assert_eq!(record.get("slice_name"), Some(&json!("Revenue EU")));
        assert_eq!(record.current_datasource().unwrap(), Some(dataset));

        let context: Value =
            serde_json::from_str(record.get("query_context").unwrap().as_str().unwrap()).unwrap();
        assert_eq!(context["form_data"]["datasource"], json!("20__table"));
        let params: Value =
            serde_json::from_str(record.get("params").unwrap().as_str().unwrap()).unwrap();
        assert_eq!(params["datasource"], json!("20__table"));
        assert_eq!(params["metric"], json!("count"));
    }

    #[test]
    fn test_retarget_rejects_broken_query_context() {
        let mut record = record();
        record
            .0
            .insert("query_context".to_string(), json!("{not json"));
        let dataset = DatasetRef {
            id: DatasetId(20),
            datasource_type: "table".to_string(),
        };
        assert!(record.retarget(DashboardId(1), &dataset, "X").is_err());
    }
}
