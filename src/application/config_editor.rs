// Config editor - Operator edits to the clone configuration rows
use crate::domain::clone_spec::CloneSpecEntry;
use crate::domain::error::EditorError;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditableField {
    DestinationChart,
    Dataset,
}

/// Rows are addressed by chart key (the chart uuid). Each row can have its
/// own scratch copy, so several rows may be under edit at once.
#[derive(Debug, Clone, Default)]
pub struct ConfigEditor {
    entries: Vec<CloneSpecEntry>,
    scratch: HashMap<String, CloneSpecEntry>,
}

impl ConfigEditor {
    pub fn new(entries: Vec<CloneSpecEntry>) -> Self {
        Self {
            entries,
            scratch: HashMap::new(),
        }
    }

    pub fn entries(&self) -> &[CloneSpecEntry] {
        &self.entries
    }

    /// Committed rows; uncommitted scratch edits are dropped
    pub fn into_entries(self) -> Vec<CloneSpecEntry> {
        self.entries
    }

    pub fn is_editing(&self, key: &str) -> bool {
        self.scratch.contains_key(key)
    }

    /// Snapshot the row into a scratch buffer, replacing any earlier draft
    pub fn begin_edit(&mut self, key: &str) -> Result<&CloneSpecEntry, EditorError> {
        let row = self.row(key)?.clone();
        self.scratch.insert(key.to_string(), row);
        Ok(&self.scratch[key])
    }

    pub fn apply_field(
        &mut self,
        key: &str,
        field: EditableField,
        value: String,
    ) -> Result<&CloneSpecEntry, EditorError> {
        let draft = self
            .scratch
            .get_mut(key)
            .ok_or_else(|| EditorError::NotEditing(key.to_string()))?;
        match field {
            EditableField::DestinationChart => draft.destination_chart = value,
            EditableField::Dataset => draft.dataset = value,
        }
        Ok(draft)
    }

    /// Merge the draft into the row and clear it
    pub fn commit(&mut self, key: &str) -> Result<&CloneSpecEntry, EditorError> {
        let draft = self
            .scratch
            .remove(key)
            .ok_or_else(|| EditorError::NotEditing(key.to_string()))?;
        let position = self
            .entries
            .iter()
            .position(|entry| entry.uuid == key)
            .ok_or_else(|| EditorError::UnknownChart(key.to_string()))?;

        let row = &mut self.entries[position];
        row.destination_chart = draft.destination_chart;
        row.dataset = draft.dataset;
        Ok(row)
    }

    /// Drop the draft, if any. Returns whether one existed.
    pub fn discard(&mut self, key: &str) -> Result<bool, EditorError> {
        self.row(key)?;
        Ok(self.scratch.remove(key).is_some())
    }

    fn row(&self, key: &str) -> Result<&CloneSpecEntry, EditorError> {
        self.entries
            .iter()
            .find(|entry| entry.uuid == key)
            .ok_or_else(|| EditorError::UnknownChart(key.to_string()))
    }
}
