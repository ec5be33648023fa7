use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned status {status} for {url}")]
    HttpStatusError { status: u16, url: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Excel export error: {0}")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ScraperError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScraperError::ApiError(_) | ScraperError::HttpStatusError { .. } => {
                ErrorCategory::Network
            }
            ScraperError::ConfigValidationError { .. }
            | ScraperError::InvalidConfigValueError { .. }
            | ScraperError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ScraperError::CsvError(_)
            | ScraperError::XlsxError(_)
            | ScraperError::SerializationError(_) => ErrorCategory::Data,
            ScraperError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路錯誤通常重試即可
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ScraperError::ApiError(_) => {
                "Check your network connection and try again with fewer pages".to_string()
            }
            ScraperError::HttpStatusError { status, .. } if *status == 403 => {
                "The marketplace rejected the request; wait a while or try another domain"
                    .to_string()
            }
            ScraperError::HttpStatusError { .. } => {
                "The marketplace API is unavailable right now; try again later".to_string()
            }
            ScraperError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' and run again", field)
            }
            ScraperError::MissingConfigError { field } => {
                format!("Provide '{}' on the command line or in the config file", field)
            }
            ScraperError::ConfigValidationError { field, .. } => {
                format!("Check the '{}' setting", field)
            }
            ScraperError::CsvError(_) | ScraperError::XlsxError(_) => {
                "Make sure the output file is not open in another program".to_string()
            }
            ScraperError::IoError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
            ScraperError::SerializationError(_) => {
                "Run again with --verbose to see the raw response".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the marketplace: {}", self),
            ErrorCategory::Configuration => format!("Invalid settings: {}", self),
            ErrorCategory::Data => format!("Could not process results: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    /// 依嚴重程度決定程式結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScraperError>;
