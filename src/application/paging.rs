// Paged listings - Collects every page of a paged platform query
use crate::application::platform_api::{Page, PlatformApi};
use crate::domain::dashboard::DashboardRecord;
use std::future::Future;

/// Request pages until the reported `count` is reached. The server may hand
/// back fewer rows than asked for, so a short page only ends the listing
/// when no count is reported. An empty page always ends it.
pub async fn collect_pages<T, F, Fut>(page_size: u32, mut fetch: F) -> anyhow::Result<Vec<T>>
where
    F: FnMut(u32, u32) -> Fut,
    Fut: Future<Output = anyhow::Result<Page<T>>>,
{
    let page_size = page_size.max(1);
    let mut rows = Vec::new();
    let mut page = 0;

    loop {
        let batch = fetch(page, page_size).await?;
        let received = match batch.result {
            Some(batch_rows) if !batch_rows.is_empty() => {
                let received = batch_rows.len();
                rows.extend(batch_rows);
                received
            }
            _ => break,
        };

        tracing::debug!(page, received, total = ?batch.count, "Fetched page");

        let done = match batch.count {
            Some(total) => rows.len() >= total,
            None => received < page_size as usize,
        };
        if done {
            break;
        }
        page += 1;
    }

    Ok(rows)
}

/// Every dashboard visible to the session
pub async fn fetch_dashboards(api: &dyn PlatformApi, page_size: u32) -> anyhow::Result<Vec<DashboardRecord>> {
    collect_pages(page_size, |page, size| api.fetch_dashboard_page(page, size)).await
}
