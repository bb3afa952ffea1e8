//! Retry policy and HTTP error classification.

use reqwest::StatusCode;

/// Attempts per request unless configured otherwise: one try, no retry.
pub const DEFAULT_ATTEMPTS: usize = 1;

/// Delay between retry attempts in milliseconds.
pub const RETRY_DELAY_MS: u64 = 1000;

/// Errors that should not be retried.
#[derive(Debug)]
pub enum NonRetryableError {
    /// Artifact is not published at the computed coordinate (HTTP 404)
    NotFound(String),
    /// Repository requires credentials (HTTP 401)
    AuthenticationFailed(String),
    /// Repository refused the request (HTTP 403)
    Forbidden(String),
    /// Other 4xx responses
    ClientError(String),
}

impl std::fmt::Display for NonRetryableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NonRetryableError::NotFound(url) => {
                write!(
                    f,
                    "Artifact not found: {}. Check the groupId, artifactId and version in pom.xml.",
                    url
                )
            }
            NonRetryableError::AuthenticationFailed(url) => {
                write!(f, "Authentication required: {}", url)
            }
            NonRetryableError::Forbidden(url) => {
                write!(f, "Access forbidden: {}", url)
            }
            NonRetryableError::ClientError(msg) => {
                write!(f, "Request error: {}", msg)
            }
        }
    }
}

impl std::error::Error for NonRetryableError {}

/// Classifies an HTTP status for `url`.
/// Returns Ok(()) for success and retryable (5xx) statuses.
pub fn classify_status(status: StatusCode, url: &str) -> Result<(), NonRetryableError> {
    match status {
        StatusCode::NOT_FOUND => Err(NonRetryableError::NotFound(url.to_string())),
        StatusCode::UNAUTHORIZED => Err(NonRetryableError::AuthenticationFailed(url.to_string())),
        StatusCode::FORBIDDEN => Err(NonRetryableError::Forbidden(url.to_string())),
        s if s.is_client_error() => Err(NonRetryableError::ClientError(format!(
            "HTTP {} from {}",
            s.as_u16(),
            url
        ))),
        _ => Ok(()),
    }
}

/// Converts an error from `error_for_status()` into an `anyhow::Error`,
/// replacing it with a [`NonRetryableError`] when retrying cannot help.
pub fn check_retryable(error: reqwest::Error) -> anyhow::Error {
    let url = error
        .url()
        .map(|u| u.to_string())
        .unwrap_or_else(|| "<unknown url>".to_string());

    match error.status().map(|status| classify_status(status, &url)) {
        Some(Err(non_retryable)) => anyhow::Error::from(non_retryable),
        _ => anyhow::Error::from(error),
    }
}
