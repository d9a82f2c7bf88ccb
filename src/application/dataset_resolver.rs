// Dataset resolver - Assembles the dataset catalog from paged queries
use crate::application::paging::collect_pages;
use crate::application::platform_api::PlatformApi;
use crate::domain::dataset::DatasetCatalog;
use crate::domain::error::CloneError;

/// Fetch every dataset page until the reported count is reached. A short
/// page ends the fetch only when the server reports no count. An empty
/// catalog fails the fetch.
pub async fn fetch_catalog(
    api: &dyn PlatformApi,
    page_size: u32,
) -> Result<DatasetCatalog, CloneError> {
    let datasets = collect_pages(page_size, |page, size| api.fetch_dataset_page(page, size)).await?;

    if datasets.is_empty() {
        return Err(CloneError::DatasetCatalogFetchFailed);
    }

    Ok(DatasetCatalog::new(datasets))
}
