use crate::config::ServiceConfig;
use crate::domain::ports::Fetcher;
use crate::utils::error::{LookupError, Result};
use crate::utils::validation::normalize_search_value;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, COOKIE, REFERER, USER_AGENT};
use reqwest::Client;
use std::sync::Arc;

/// Posts search values to the upstream lookup form over HTTP.
pub struct HttpFetcher {
    client: Client,
    config: Arc<ServiceConfig>,
    referer: String,
}

impl HttpFetcher {
    pub fn new(config: Arc<ServiceConfig>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| LookupError::ConfigError {
                message: format!("failed to build HTTP client: {}", e),
            })?;
        let referer = config.effective_referer()?;

        Ok(Self {
            client,
            config,
            referer,
        })
    }

    fn map_error(&self, error: reqwest::Error) -> LookupError {
        let status = error.status().map(|s| s.as_u16());
        let message = if error.is_timeout() {
            format!("timeout of {}s exceeded", self.config.timeout_secs)
        } else {
            error.without_url().to_string()
        };
        LookupError::upstream(message, status)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, search_value: &str) -> Result<String> {
        let value = normalize_search_value(search_value)?;
        let form = [
            (self.config.search_field.as_str(), value),
            (self.config.mode_field.as_str(), self.config.mode_value.as_str()),
        ];

        let mut request = self
            .client
            .post(&self.config.upstream_url)
            .header(USER_AGENT, &self.config.user_agent)
            .header(ACCEPT, &self.config.accept)
            .header(REFERER, &self.referer)
            .form(&form);

        if let Some(cookie) = self.config.cookie_header() {
            request = request.header(COOKIE, cookie);
        }

        tracing::debug!("Submitting lookup form to: {}", self.config.upstream_url);
        let response = request.send().await.map_err(|e| self.map_error(e))?;
        tracing::debug!("Upstream response status: {}", response.status());

        let response = response.error_for_status().map_err(|e| self.map_error(e))?;
        let body = response.text().await.map_err(|e| self.map_error(e))?;

        tracing::debug!("Received {} bytes of HTML", body.len());
        Ok(body)
    }
}
