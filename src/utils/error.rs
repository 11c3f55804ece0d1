use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Telegram method {method} failed ({code}): {description}")]
    Telegram {
        method: String,
        code: i64,
        description: String,
    },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Remote,
    Storage,
    Configuration,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScanError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScanError::ApiError(_) => ErrorCategory::Network,
            ScanError::Telegram { .. } => ErrorCategory::Remote,
            ScanError::CsvError(_) | ScanError::IoError(_) | ScanError::SerializationError(_) => {
                ErrorCategory::Storage
            }
            ScanError::ConfigError { .. }
            | ScanError::InvalidConfigValueError { .. }
            | ScanError::MissingConfigError { .. }
            | ScanError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            ScanError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 單一查詢失敗只影響一個帳號
            ScanError::Telegram { .. } => ErrorSeverity::Low,
            ScanError::ApiError(_) => ErrorSeverity::Medium,
            ScanError::ProcessingError { .. }
            | ScanError::CsvError(_)
            | ScanError::SerializationError(_) => ErrorSeverity::High,
            ScanError::IoError(_)
            | ScanError::ConfigError { .. }
            | ScanError::InvalidConfigValueError { .. }
            | ScanError::MissingConfigError { .. }
            | ScanError::ConfigValidationError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ScanError::ApiError(_) => {
                "Check network connectivity and the --api-base-url value".to_string()
            }
            ScanError::Telegram { code: 401, .. } => {
                "The bot token was rejected; check --bot-token or TELEGRAM_BOT_TOKEN".to_string()
            }
            ScanError::Telegram { .. } => {
                "The account may be private or unknown to the API; it will be skipped".to_string()
            }
            ScanError::IoError(_) => {
                "Check that the input file exists and the output directory is writable".to_string()
            }
            ScanError::CsvError(_) | ScanError::SerializationError(_) => {
                "Check the report path and available disk space".to_string()
            }
            ScanError::MissingConfigError { field } => {
                format!("Provide a value for '{}'", field)
            }
            ScanError::InvalidConfigValueError { field, .. }
            | ScanError::ConfigValidationError { field, .. } => {
                format!("Fix the value of '{}' and run again", field)
            }
            ScanError::ConfigError { .. } => "Review the configuration file".to_string(),
            ScanError::ProcessingError { .. } => {
                "Re-run with --verbose to see which lookup failed".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the Telegram API: {}", self),
            ErrorCategory::Remote => format!("Telegram refused the request: {}", self),
            ErrorCategory::Storage => format!("Could not read or write files: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Processing => format!("Scan failed: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
