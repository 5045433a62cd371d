#[cfg(feature = "cli")]
pub mod cli;

use crate::utils::error::{LookupError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const COOKIE_ENV: &str = "LOOKUP_COOKIES";
/// Older cookie variable name, read when `LOOKUP_COOKIES` is unset.
pub const LEGACY_COOKIE_ENV: &str = "FRESHSIM_COOKIES";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 14; K) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139 Mobile Safari/537.36";
const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// What to do when the secondary (ID number) pass fails after the primary pass succeeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecondaryFailurePolicy {
    /// Fail the whole request.
    #[default]
    Fail,
    /// Return the primary records with a warning.
    Degrade,
}

impl FromStr for SecondaryFailurePolicy {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "degrade" => Ok(Self::Degrade),
            other => Err(LookupError::InvalidConfigValueError {
                field: "secondary_failure".to_string(),
                value: other.to_string(),
                reason: "expected 'fail' or 'degrade'".to_string(),
            }),
        }
    }
}

/// Process-wide lookup settings. Built once at startup and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub upstream_url: String,
    #[serde(default)]
    pub referer: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept")]
    pub accept: String,
    #[serde(default = "default_search_field")]
    pub search_field: String,
    #[serde(default = "default_mode_field")]
    pub mode_field: String,
    #[serde(default = "default_mode_value")]
    pub mode_value: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_header_keywords")]
    pub header_keywords: Vec<String>,
    #[serde(default)]
    pub secondary_failure: SecondaryFailurePolicy,
    /// Static cookie header. Only ever read from the environment.
    #[serde(skip)]
    pub cookie: Option<String>,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_accept() -> String {
    DEFAULT_ACCEPT.to_string()
}
fn default_search_field() -> String {
    "numberCnic".to_string()
}
fn default_mode_field() -> String {
    "searchNumber".to_string()
}
fn default_mode_value() -> String {
    "search".to_string()
}
fn default_timeout_secs() -> u64 {
    20
}
fn default_country() -> String {
    "Pakistan".to_string()
}
fn default_header_keywords() -> Vec<String> {
    vec!["Mobile".to_string(), "Name".to_string(), "CNIC".to_string()]
}

impl ServiceConfig {
    pub fn new(upstream_url: impl Into<String>) -> Self {
        Self {
            upstream_url: upstream_url.into(),
            referer: None,
            user_agent: default_user_agent(),
            accept: default_accept(),
            search_field: default_search_field(),
            mode_field: default_mode_field(),
            mode_value: default_mode_value(),
            timeout_secs: default_timeout_secs(),
            country: default_country(),
            header_keywords: default_header_keywords(),
            secondary_failure: SecondaryFailurePolicy::default(),
            cookie: None,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let upstream_url = var("LOOKUP_UPSTREAM_URL");
        let upstream_url = validation::validate_required_field("LOOKUP_UPSTREAM_URL", &upstream_url)?;
        let mut config = Self::new(upstream_url.clone());

        if let Some(referer) = var("LOOKUP_REFERER") {
            config.referer = Some(referer);
        }
        if let Some(user_agent) = var("LOOKUP_USER_AGENT") {
            config.user_agent = user_agent;
        }
        if let Some(accept) = var("LOOKUP_ACCEPT") {
            config.accept = accept;
        }
        if let Some(field) = var("LOOKUP_SEARCH_FIELD") {
            config.search_field = field;
        }
        if let Some(field) = var("LOOKUP_MODE_FIELD") {
            config.mode_field = field;
        }
        if let Some(value) = var("LOOKUP_MODE_VALUE") {
            config.mode_value = value;
        }
        if let Some(timeout) = var("LOOKUP_TIMEOUT_SECS") {
            config.timeout_secs =
                timeout
                    .trim()
                    .parse()
                    .map_err(|_| LookupError::InvalidConfigValueError {
                        field: "LOOKUP_TIMEOUT_SECS".to_string(),
                        value: timeout.clone(),
                        reason: "expected a whole number of seconds".to_string(),
                    })?;
        }
        if let Some(country) = var("LOOKUP_COUNTRY") {
            config.country = country;
        }
        if let Some(policy) = var("LOOKUP_SECONDARY_FAILURE") {
            config.secondary_failure = policy.parse()?;
        }
        config.cookie = var(COOKIE_ENV).or_else(|| var(LEGACY_COOKIE_ENV));

        Ok(config)
    }

    /// 從 TOML 檔案載入配置，cookie 仍只從環境變數讀取
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        tracing::debug!("Loading configuration from {}", path.as_ref().display());
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config = Self::from_toml_str(&content)?;
        config.cookie = std::env::var(COOKIE_ENV)
            .or_else(|_| std::env::var(LEGACY_COOKIE_ENV))
            .ok();
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Cookie header value, `None` when unset or blank.
    pub fn cookie_header(&self) -> Option<&str> {
        self.cookie
            .as_deref()
            .map(str::trim)
            .filter(|cookie| !cookie.is_empty())
    }

    /// Explicit referer, or the upstream origin when none was configured.
    pub fn effective_referer(&self) -> Result<String> {
        if let Some(referer) = &self.referer {
            return Ok(referer.clone());
        }
        let url = url::Url::parse(&self.upstream_url).map_err(|e| {
            LookupError::InvalidConfigValueError {
                field: "upstream_url".to_string(),
                value: self.upstream_url.clone(),
                reason: format!("Invalid URL format: {}", e),
            }
        })?;
        Ok(format!("{}/", url.origin().ascii_serialization()))
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("upstream_url", &self.upstream_url)?;
        if let Some(referer) = &self.referer {
            validation::validate_url("referer", referer)?;
        }
        validation::validate_non_empty_string("user_agent", &self.user_agent)?;
        validation::validate_non_empty_string("search_field", &self.search_field)?;
        validation::validate_non_empty_string("mode_field", &self.mode_field)?;
        validation::validate_non_empty_string("country", &self.country)?;
        validation::validate_range("timeout_secs", self.timeout_secs, 1, 300)?;

        if self.header_keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(LookupError::InvalidConfigValueError {
                field: "header_keywords".to_string(),
                value: format!("{:?}", self.header_keywords),
                reason: "at least one non-empty keyword is required".to_string(),
            });
        }

        tracing::debug!("✅ Service configuration validation passed");
        Ok(())
    }
}
