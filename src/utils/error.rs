use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Upstream request failed: {message}")]
    UpstreamError {
        message: String,
        status: Option<u16>,
    },

    #[error("HTML parsing error: {message}")]
    ParseError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Upstream,
    Processing,
    System,
}

impl LookupError {
    pub fn upstream(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::UpstreamError {
            message: message.into(),
            status,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::TomlError(_) => ErrorCategory::Configuration,
            Self::ValidationError { .. } => ErrorCategory::Input,
            Self::UpstreamError { .. } => ErrorCategory::Upstream,
            Self::ParseError { .. } | Self::SerializationError(_) | Self::CsvError(_) => {
                ErrorCategory::Processing
            }
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    /// HTTP status returned by the upstream site, when the failure carried one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::UpstreamError { status, .. } => *status,
            _ => None,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("配置錯誤: {}", self),
            ErrorCategory::Input => format!("輸入無效: {}", self),
            ErrorCategory::Upstream => match self.upstream_status() {
                Some(status) => format!("查詢服務回應錯誤 (HTTP {}): {}", status, self),
                None => format!("無法連線至查詢服務: {}", self),
            },
            ErrorCategory::Processing => format!("資料處理失敗: {}", self),
            ErrorCategory::System => format!("系統錯誤: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;
