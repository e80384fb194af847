use crate::api::models::ApiErrorEnvelope;
use crate::error::{ApiError, DisplayError};
use std::io;

/// Helpers that standardize error conversions across the codebase.
/// Convert reqwest transport errors to ApiError with endpoint context
pub fn convert_request_error(error: reqwest::Error, endpoint: &str, timeout_secs: u64) -> ApiError {
    if error.is_timeout() {
        return convert_timeout_error(endpoint, timeout_secs);
    }

    match error.status() {
        Some(status) => ApiError::Http {
            status: status.as_u16(),
            endpoint: endpoint.to_string(),
            message: error.to_string(),
        },
        None => ApiError::Network {
            endpoint: endpoint.to_string(),
            message: error.to_string(),
        },
    }
}

/// Convert timeout errors to ApiError with endpoint context
pub fn convert_timeout_error(endpoint: &str, timeout_secs: u64) -> ApiError {
    ApiError::Timeout {
        timeout_secs,
        endpoint: endpoint.to_string(),
    }
}

/// Convert JSON deserialization errors to ApiError with endpoint context
pub fn convert_json_error(error: impl std::fmt::Display, endpoint: &str) -> ApiError {
    ApiError::Decode {
        endpoint: endpoint.to_string(),
        message: format!("JSON parse error: {}", error),
    }
}

/// Map a non-success status and its raw body onto the ApiError taxonomy.
///
/// The body is read as the canonical `error.message` / `error.details` envelope,
/// falling back to a top-level `detail` and finally to the raw text.
pub fn convert_status_error(status: u16, body: &str, endpoint: &str, timeout_secs: u64) -> ApiError {
    let envelope: ApiErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
    let (message, details) = match (envelope.error, envelope.detail) {
        (Some(error), _) => (error.message, error.details),
        (None, Some(detail)) => (detail.summary(), Some(detail)),
        (None, None) if body.trim().is_empty() => ("Unknown error".to_string(), None),
        (None, None) => (body.trim().to_string(), None),
    };

    match status {
        401 | 403 => ApiError::Unauthorized {
            status,
            endpoint: endpoint.to_string(),
            server_message: message,
        },
        408 | 504 => convert_timeout_error(endpoint, timeout_secs),
        422 => ApiError::Validation {
            endpoint: endpoint.to_string(),
            message,
            details,
        },
        _ => ApiError::Http {
            status,
            endpoint: endpoint.to_string(),
            message,
        },
    }
}

/// Convert IO errors to DisplayError for terminal operations
pub fn convert_io_to_display_error(error: io::Error, operation: &str) -> DisplayError {
    DisplayError::TerminalOutput(format!("{}: {}", operation, error))
}
