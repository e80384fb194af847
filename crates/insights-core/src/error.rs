use crate::api::models::ErrorDetails;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("CliError: {0}")]
    Cli(#[from] CliError),
    #[error("ApiError: {0}")]
    Api(#[from] ApiError),
    #[error("ConfigError: {0}")]
    Config(#[from] ConfigError),
    #[error("StorageError: {0}")]
    Storage(#[from] StorageError),
    #[error("DisplayError: {0}")]
    Display(#[from] DisplayError),
    #[error("IngestionError: {0}")]
    Ingestion(#[from] IngestionError),
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Authentication required")]
    AuthRequired { message: String, hint: String },
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("{message}")]
    RequestFailed { message: String },
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error at {endpoint}: {message}")]
    Network { endpoint: String, message: String },
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64, endpoint: String },
    #[error("HTTP error: {status} {message}")]
    Http {
        status: u16,
        endpoint: String,
        message: String,
    },
    #[error("Authentication failed")]
    Unauthorized {
        status: u16,
        endpoint: String,
        server_message: String,
    },
    #[error("Validation error: {message}")]
    Validation {
        endpoint: String,
        message: String,
        details: Option<ErrorDetails>,
    },
    #[error("Unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

impl ApiError {
    /// HTTP status carried by the error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } | ApiError::Unauthorized { status, .. } => Some(*status),
            ApiError::Validation { .. } => Some(422),
            ApiError::Network { .. } | ApiError::Timeout { .. } | ApiError::Decode { .. } => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File I/O error at {path}: {source}")]
    FileIo {
        path: String,
        source: std::io::Error,
    },
    #[error("Configuration parse error: {message}")]
    ConfigParseError { message: String },
    #[error("Configuration directory not found")]
    ConfigDirNotFound,
}

#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("Terminal output error: {0}")]
    TerminalOutput(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration field '{field}' is missing")]
    MissingField { field: String, hint: String },
    #[error("Invalid configuration value for '{field}': {value}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Unsupported file type '{path}': only .csv uploads are accepted")]
    UnsupportedFileType { path: String },
    #[error("File '{path}' is empty")]
    EmptyFile { path: String },
    #[error("File '{path}' is too large ({size} bytes, limit {limit})")]
    FileTooLarge { path: String, size: u64, limit: u64 },
    #[error("CSV has no header row: {path}")]
    MissingHeader { path: String },
    #[error("CSV could not be read: {message}")]
    Malformed { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorSeverity {
    High,
    Medium,
    Low,
}

impl ErrorSeverity {
    pub fn emoji(&self) -> &'static str {
        match self {
            ErrorSeverity::High => "❌",
            ErrorSeverity::Medium => "⚠️",
            ErrorSeverity::Low => "ℹ️",
        }
    }
}

impl AppError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Cli(_) => ErrorSeverity::Medium,
            AppError::Api(api_error) => match api_error {
                ApiError::Unauthorized { .. } => ErrorSeverity::High,
                ApiError::Network { .. } | ApiError::Timeout { .. } => ErrorSeverity::Medium,
                ApiError::Http { status, .. } if *status >= 500 => ErrorSeverity::High,
                _ => ErrorSeverity::Medium,
            },
            AppError::Config(_) => ErrorSeverity::High,
            AppError::Storage(_) => ErrorSeverity::Medium,
            AppError::Display(_) => ErrorSeverity::Low,
            AppError::Ingestion(_) => ErrorSeverity::Medium,
        }
    }

    pub fn display_friendly(&self) -> String {
        match self {
            AppError::Api(ApiError::Unauthorized { .. }) => {
                "Session expired. Please log in again.".to_string()
            }
            AppError::Cli(CliError::AuthRequired { message, .. }) => message.clone(),
            AppError::Cli(CliError::RequestFailed { message }) => message.clone(),
            AppError::Api(ApiError::Validation {
                message,
                details: Some(details),
                ..
            }) => format!("{}: {}", message, details.summary()),
            AppError::Api(ApiError::Network { .. } | ApiError::Timeout { .. }) => {
                "Could not reach the insights server. Please try again.".to_string()
            }
            _ => format!("{}", self),
        }
    }

    pub fn troubleshooting_hint(&self) -> Option<String> {
        match self {
            AppError::Cli(CliError::AuthRequired { .. })
            | AppError::Api(ApiError::Unauthorized { .. }) => Some(
                "'insights login --email <email>' and export INSIGHTS_TOKEN".to_string(),
            ),
            AppError::Config(ConfigError::MissingField { hint, .. }) => Some(hint.clone()),
            AppError::Api(ApiError::Network { .. } | ApiError::Timeout { .. }) => {
                Some("Check your connection and the configured server URL".to_string())
            }
            AppError::Ingestion(IngestionError::UnsupportedFileType { .. }) => {
                Some("Export the sheet as CSV and upload the .csv file".to_string())
            }
            _ => None,
        }
    }
}
