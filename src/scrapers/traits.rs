use crate::scrapers::types::FetchError;
use async_trait::async_trait;

/// Counts the result cards on one area's search page.
///
/// Implementations own any browser state for the duration of a single call
/// and release it before returning, so calls never share cookies or tabs.
#[async_trait]
pub trait CountFetcher: Send + Sync {
    async fn fetch_count(&self, area_label: &str, search_url: &str) -> Result<usize, FetchError>;

    /// Get the name of the fetcher backend
    fn backend_name(&self) -> &'static str;
}
