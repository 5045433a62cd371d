use crate::utils::error::Result;
use async_trait::async_trait;

/// Submits a search value to the upstream lookup form and returns the raw HTML body.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, search_value: &str) -> Result<String>;
}
