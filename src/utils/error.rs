use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing required field: {field}")]
    MissingFieldError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Not found: {resource}")]
    NotFoundError { resource: String },

    #[error("Upstream {provider} returned status {status}")]
    UpstreamStatusError { provider: String, status: u16 },

    #[error("Upstream {provider} response could not be used: {message}")]
    UpstreamResponseError { provider: String, message: String },

    #[error("API key for {provider} is not configured")]
    MissingApiKeyError { provider: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Request,
    Upstream,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScoutError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScoutError::ConfigError { .. }
            | ScoutError::InvalidConfigValueError { .. }
            | ScoutError::MissingConfigError { .. }
            | ScoutError::ConfigValidationError { .. }
            | ScoutError::MissingApiKeyError { .. } => ErrorCategory::Configuration,
            ScoutError::MissingFieldError { .. }
            | ScoutError::ValidationError { .. }
            | ScoutError::NotFoundError { .. } => ErrorCategory::Request,
            ScoutError::ApiError(_)
            | ScoutError::UpstreamStatusError { .. }
            | ScoutError::UpstreamResponseError { .. }
            | ScoutError::SerializationError(_) => ErrorCategory::Upstream,
            ScoutError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Request => ErrorSeverity::Low,
            ErrorCategory::Upstream => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 對應的 HTTP 狀態碼 (400 / 404 / 500)
    pub fn status_code(&self) -> u16 {
        match self {
            ScoutError::MissingFieldError { .. } | ScoutError::ValidationError { .. } => 400,
            ScoutError::NotFoundError { .. } => 404,
            _ => 500,
        }
    }

    /// 給呼叫端看的訊息，不包含上游細節
    pub fn user_friendly_message(&self) -> String {
        match self {
            ScoutError::MissingFieldError { .. } => "Missing required fields".to_string(),
            ScoutError::ValidationError { message } => message.clone(),
            ScoutError::NotFoundError { resource } => format!("{} not found", resource),
            ScoutError::MissingApiKeyError { provider } => {
                format!("Missing {} API key", provider)
            }
            ScoutError::ApiError(_)
            | ScoutError::UpstreamStatusError { .. }
            | ScoutError::UpstreamResponseError { .. }
            | ScoutError::SerializationError(_) => "Upstream service error".to_string(),
            ScoutError::ConfigError { .. }
            | ScoutError::InvalidConfigValueError { .. }
            | ScoutError::MissingConfigError { .. }
            | ScoutError::ConfigValidationError { .. } => {
                "Service is misconfigured".to_string()
            }
            ScoutError::IoError(_) => "Internal error".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the configuration file and the environment variables it references"
            }
            ErrorCategory::Request => "Check the request parameters and try again",
            ErrorCategory::Upstream => {
                "The provider may be rate limiting or unavailable; try again later"
            }
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;
