//! Input validation for configuration values and credentials.

use crate::error::CliError;

/// Validate that a URL is properly formatted
pub fn validate_url(url: &str) -> crate::Result<()> {
    if url.is_empty() {
        return Err(CliError::InvalidArguments("URL cannot be empty".to_string()).into());
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(CliError::InvalidArguments(format!(
            "Invalid URL '{}': URL must start with http:// or https://",
            url
        ))
        .into());
    }

    Ok(())
}

/// Validate email format (the server requires at least three characters)
pub fn validate_email(email: &str) -> crate::Result<()> {
    if email.len() < 3 {
        return Err(CliError::InvalidArguments(
            "Email must be at least 3 characters".to_string(),
        )
        .into());
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(CliError::InvalidArguments(format!(
            "Invalid email '{}': Email must have username and domain parts",
            email
        ))
        .into());
    }

    Ok(())
}

/// Validate the top-workflows chart limit accepted by the server (1..=100)
pub fn validate_top_limit(limit: u32) -> crate::Result<()> {
    if !(1..=100).contains(&limit) {
        return Err(CliError::InvalidArguments(format!(
            "Invalid limit {}: must be between 1 and 100",
            limit
        ))
        .into());
    }
    Ok(())
}
