// Bundle extractor - Reads the dashboard and chart manifests out of an export archive
use crate::domain::chart::ChartManifest;
use crate::domain::clone_spec::CloneSpecEntry;
use crate::domain::dashboard::DashboardManifest;
use crate::domain::dataset::DatasetCatalog;
use crate::domain::error::CloneError;
use std::io::{Cursor, Read};
use zip::ZipArchive;

const DASHBOARD_DIR: &str = "dashboards";
const CHART_DIR: &str = "charts";
const ARCHIVE: &str = "<export archive>";

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedBundle {
    pub source_title: String,
    /// One row per chart file, in archive order
    pub entries: Vec<CloneSpecEntry>,
    pub manifest: DashboardManifest,
}

/// Parse an export archive. Pure function of `bytes` and `catalog`.
pub fn extract_bundle(bytes: &[u8], catalog: &DatasetCatalog) -> Result<ExtractedBundle, CloneError> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| CloneError::malformed(ARCHIVE, e))?;

    let mut files = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive
            .by_index(index)
            .map_err(|e| CloneError::malformed(ARCHIVE, e))?;
        if !entry.is_dir() {
            files.push((index, entry.name().to_string()));
        }
    }

    let (dashboard_index, dashboard_file) = files
        .iter()
        .find(|(_, name)| in_directory(name, DASHBOARD_DIR))
        .ok_or(CloneError::MissingManifest)?;
    let text = read_entry(&mut archive, *dashboard_index, dashboard_file)?;
    let manifest = DashboardManifest::from_yaml(dashboard_file, &text)?;

    tracing::debug!(file = %dashboard_file, title = %manifest.dashboard_title, "Parsed dashboard manifest");

    let mut entries = Vec::new();
    for (index, file) in files.iter().filter(|(_, name)| in_directory(name, CHART_DIR)) {
        let text = read_entry(&mut archive, *index, file)?;
        let chart = ChartManifest::from_yaml(file, &text)?;
        let dataset_id = chart.datasource_id(file)?;
        let dataset = catalog.name_for_id(dataset_id);

        if dataset.is_empty() {
            tracing::warn!(chart = %chart.slice_name, %dataset_id, "Dataset not in catalog");
        }

        entries.push(CloneSpecEntry::from_source(
            chart.uuid,
            chart.slice_name,
            dataset.to_string(),
        ));
    }

    Ok(ExtractedBundle {
        source_title: manifest.dashboard_title.clone(),
        entries,
        manifest,
    })
}

/// True when some directory on `path` is named `dir`. File names are
/// exported titles and may contain either directory name.
fn in_directory(path: &str, dir: &str) -> bool {
    path.rsplit('/').skip(1).any(|segment| segment == dir)
}

fn read_entry(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    index: usize,
    name: &str,
) -> Result<String, CloneError> {
    let mut entry = archive
        .by_index(index)
        .map_err(|e| CloneError::malformed(name, e))?;
    let mut text = String::new();
    entry
        .read_to_string(&mut text)
        .map_err(|e| CloneError::malformed(name, e))?;
    Ok(text)
}
