// Dashboard domain models - Archive manifest, live record and listing summary
use super::error::CloneError;
use super::ids::DashboardId;
use super::layout::LayoutPositionMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields the platform manages itself and rejects on create
const DASHBOARD_SERVER_FIELDS: [&str; 13] = [
    "changed_by",
    "changed_by_name",
    "changed_by_url",
    "changed_on_delta_humanized",
    "created_on_delta_humanized",
    "changed_on_utc",
    "created_by",
    "id",
    "status",
    "thumbnail_url",
    "url",
    "roles",
    "tags",
];

/// The dashboard file from an export archive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardManifest {
    #[serde(default)]
    pub dashboard_title: String,
    #[serde(default)]
    pub position: Option<LayoutPositionMap>,
    /// Everything else (owners, css, slug, certification, metadata, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DashboardManifest {
    pub fn from_yaml(file: &str, text: &str) -> Result<Self, CloneError> {
        let mut manifest: Self =
            serde_yaml::from_str(text).map_err(|e| CloneError::malformed(file, e))?;

        if manifest.dashboard_title.trim().is_empty() {
            return Err(CloneError::MissingManifest);
        }

        // Older exports embed the layout as a serialized string
        if manifest.position.is_none() {
            if let Some(text) = manifest.extra.get("position_json").and_then(Value::as_str) {
                manifest.position = Some(LayoutPositionMap::parse(file, text)?);
            }
        }

        Ok(manifest)
    }
}

/// A dashboard as returned by `GET dashboard/` and `GET dashboard/<id>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DashboardRecord(Map<String, Value>);

impl DashboardRecord {
    #[cfg(test)]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn id(&self) -> Option<DashboardId> {
        self.0.get("id").and_then(DashboardId::from_value)
    }

    pub fn title(&self) -> &str {
        self.0
            .get("dashboard_title")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub fn has_title(&self, title: &str) -> bool {
        self.title().to_lowercase() == title.to_lowercase()
    }

    /// Turn a fetched record into a create body for a copy named `title`
    pub fn into_clone_body(mut self, title: &str) -> Value {
        for field in DASHBOARD_SERVER_FIELDS {
            self.0.remove(field);
        }

        self.0
            .insert("dashboard_title".to_string(), Value::String(title.to_string()));
        self.0.insert("slug".to_string(), Value::String(slugify(title)));
        if !self.0.get("css").is_some_and(|css| css.is_string()) {
            self.0.insert("css".to_string(), Value::String(String::new()));
        }
        let owners = flatten_ids(self.0.get("owners"));
        self.0.insert("owners".to_string(), owners);

        Value::Object(self.0)
    }

    /// The live layout, parsed from `position_json`
    pub fn layout(&self, dashboard_id: DashboardId) -> Result<LayoutPositionMap, CloneError> {
        match self.0.get("position_json").and_then(Value::as_str) {
            Some(text) if !text.is_empty() => LayoutPositionMap::parse("position_json", text),
            _ => Err(CloneError::DashboardLayoutMissing(dashboard_id)),
        }
    }

    /// Full update body carrying this record's mutable fields and `layout`
    pub fn layout_update_body(&self, layout: &LayoutPositionMap) -> Value {
        let field = |name: &str| self.0.get(name).cloned().unwrap_or(Value::Null);

        serde_json::json!({
            "certification_details": field("certification_details"),
            "certified_by": field("certified_by"),
            "css": field("css"),
            "dashboard_title": field("dashboard_title"),
            "json_metadata": field("json_metadata"),
            "owners": flatten_ids(self.0.get("owners")),
            "published": field("published"),
            "roles": flatten_ids(self.0.get("roles")),
            "slug": field("slug"),
            "position_json": layout.to_json_string(),
        })
    }
}

/// Listing entry shown to the operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub id: DashboardId,
    pub dashboard_title: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub changed_on_delta_humanized: Option<String>,
}

impl DashboardSummary {
    pub fn from_record(record: &DashboardRecord) -> Option<Self> {
        Some(Self {
            id: record.id()?,
            dashboard_title: record.title().to_string(),
            status: record.get("status").and_then(Value::as_str).map(str::to_string),
            changed_on_delta_humanized: record
                .get("changed_on_delta_humanized")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

/// Lower-cased title with spaces replaced by hyphens
pub fn slugify(title: &str) -> String {
    title.to_lowercase().replace(' ', "-")
}

/// `[{id: 1, ...}, 2]` becomes `[1, 2]`; a missing list becomes `[]`
fn flatten_ids(list: Option<&Value>) -> Value {
    let ids = list
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(fields) => fields.get("id").cloned(),
                    Value::Number(_) => Some(item.clone()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();
    Value::Array(ids)
}
