/**
 * Platform Service Errors
 *
 * Every call to the authentication service, the profile store or the content
 * store fails with a `ServiceError`. The variants follow the failure taxonomy
 * the boundary components act on:
 *
 * - `Unreachable` / `Timeout` - soft failures (pass through, or a retry notice)
 * - `InvalidCredentials` - user-visible message, no state change
 * - `InvalidSession` - the session must be dropped
 * - `InvalidOneTimeToken` - confirmation links that are unknown, used or expired
 *
 * These errors are never shown to end users verbatim. Boundary components turn
 * them into redirects or notices.
 */

use std::time::Duration;

use thiserror::Error;

/// Upper bound for any single HTTP exchange with the platform
pub(crate) const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Network failure or a 5xx from the platform
    #[error("service unreachable: {0}")]
    Unreachable(String),

    /// The call did not finish within its bound
    #[error("service call timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid login credentials")]
    InvalidCredentials,

    /// Access or refresh token rejected
    #[error("session is invalid or expired")]
    InvalidSession,

    /// Token hash unknown, already used or expired
    #[error("one-time token is invalid or expired")]
    InvalidOneTimeToken,

    #[error("not found: {0}")]
    NotFound(String),

    /// Any other refusal from the platform
    #[error("service rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The platform answered with a body we could not read
    #[error("malformed service response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Soft failures: the platform could not give an answer either way
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::Timeout(_))
    }

    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if err.is_timeout() {
            Self::Timeout(HTTP_TIMEOUT)
        } else {
            Self::Unreachable(err.to_string())
        }
    }
}

/// Bound `future` by `limit`, mapping an elapsed timer to `ServiceError::Timeout`
pub async fn with_timeout<T, F>(limit: Duration, future: F) -> Result<T, ServiceError>
where
    F: std::future::Future<Output = Result<T, ServiceError>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(ServiceError::Timeout(limit)),
    }
}
