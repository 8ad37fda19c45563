//! Retry policy for network operations.

use reqwest::StatusCode;

/// Maximum number of attempts for a network operation.
pub const MAX_RETRIES: usize = 3;

/// Delay between retry attempts in milliseconds.
pub const RETRY_DELAY_MS: u64 = 1000;

/// HTTP failures that will not succeed on retry. Each carries the URL.
#[derive(Debug)]
pub enum NonRetryableError {
    /// HTTP 429, or 403 carrying GitHub's rate-limit headers
    RateLimitExceeded(String),
    /// HTTP 401
    AuthenticationFailed(String),
    /// HTTP 404
    NotFound(String),
    /// HTTP 403
    Forbidden(String),
    /// Any other 4xx
    ClientError { url: String, status: u16 },
}

impl std::fmt::Display for NonRetryableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NonRetryableError::RateLimitExceeded(url) => write!(
                f,
                "Rate limit exceeded for {}. Try again later or set GITHUB_TOKEN.",
                url
            ),
            NonRetryableError::AuthenticationFailed(url) => {
                write!(f, "Authentication failed for {}. Check your GITHUB_TOKEN.", url)
            }
            NonRetryableError::NotFound(url) => write!(f, "Not found: {}", url),
            NonRetryableError::Forbidden(url) => write!(f, "Access forbidden: {}", url),
            NonRetryableError::ClientError { url, status } => {
                write!(f, "Request to {} failed with HTTP {}", url, status)
            }
        }
    }
}

impl std::error::Error for NonRetryableError {}

/// Classifies an error as retryable (`Ok`) or not (`Err`).
pub fn classify_error(error: &reqwest::Error) -> Result<(), NonRetryableError> {
    let Some(status) = error.status() else {
        // Connection errors, timeouts, body decode errors
        return Ok(());
    };

    let url = error
        .url()
        .map(|u| u.to_string())
        .unwrap_or_else(|| "<unknown url>".to_string());

    match status {
        StatusCode::UNAUTHORIZED => Err(NonRetryableError::AuthenticationFailed(url)),
        StatusCode::FORBIDDEN => Err(NonRetryableError::Forbidden(url)),
        StatusCode::TOO_MANY_REQUESTS => Err(NonRetryableError::RateLimitExceeded(url)),
        StatusCode::NOT_FOUND => Err(NonRetryableError::NotFound(url)),
        s if s.is_client_error() => Err(NonRetryableError::ClientError {
            url,
            status: s.as_u16(),
        }),
        _ => Ok(()),
    }
}

/// Passes a successful response through. Failures are mapped like
/// [`check_retryable`], except that a 403/429 with an exhausted
/// `x-ratelimit-remaining` or a `retry-after` header becomes
/// [`NonRetryableError::RateLimitExceeded`]. The status line alone does not
/// distinguish GitHub's rate limit from other 403s.
pub fn check_status(response: reqwest::Response) -> anyhow::Result<reqwest::Response> {
    if is_rate_limited(&response) {
        return Err(NonRetryableError::RateLimitExceeded(response.url().to_string()).into());
    }
    response.error_for_status().map_err(check_retryable)
}

fn is_rate_limited(response: &reqwest::Response) -> bool {
    let status = response.status();
    if status != StatusCode::FORBIDDEN && status != StatusCode::TOO_MANY_REQUESTS {
        return false;
    }
    let headers = response.headers();
    headers
        .get("x-ratelimit-remaining")
        .is_some_and(|v| v.as_bytes() == b"0")
        || headers.contains_key(reqwest::header::RETRY_AFTER)
}

/// Maps an `error_for_status()` failure to `anyhow::Error`, converting
/// non-retryable statuses to [`NonRetryableError`].
pub fn check_retryable(error: reqwest::Error) -> anyhow::Error {
    match classify_error(&error) {
        Ok(()) => anyhow::Error::from(error),
        Err(non_retryable) => anyhow::Error::from(non_retryable),
    }
}
