//! HTTP Platform Clients
//!
//! reqwest-backed implementations of the service traits, speaking the hosted
//! platform's REST dialect:
//!
//! - **`auth`** - `/auth/v1/*` (token, signup, logout, user, verify, recover)
//! - **`profiles`** - `/rest/v1/profiles` with merge-duplicates upserts
//! - **`storage`** - `/storage/v1/object/*`
//!
//! Every request carries the public `apikey` header; user-scoped requests add
//! the session's access token as a bearer token.
//!
//! # Status Mapping
//!
//! - connection failures and 5xx → `ServiceError::Unreachable`
//! - client-side timeouts → `ServiceError::Timeout`
//! - 408 and 429 → `ServiceError::Unreachable`; the platform is busy, not refusing
//! - 404 → `ServiceError::NotFound`
//! - other 4xx → an operation-specific variant, or `ServiceError::Rejected`

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};

use crate::services::error::{ServiceError, HTTP_TIMEOUT};
use crate::shared::config::PlatformConfig;

/// Authentication client
pub mod auth;

/// Profile table client
pub mod profiles;

/// Object storage client
pub mod storage;

pub use auth::HttpAuthService;
pub use profiles::HttpProfileStore;
pub use storage::HttpContentStore;

/// Configured reqwest client shared by the three service clients
#[derive(Clone)]
pub struct PlatformClient {
    http: Client,
    config: Arc<PlatformConfig>,
}

impl PlatformClient {
    pub fn new(config: Arc<PlatformConfig>) -> Result<Self, ServiceError> {
        let http = Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    /// Request with the public API key only
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.config.api_endpoint(path))
            .header("apikey", &self.config.anon_key)
    }

    /// Request scoped to the session behind `access_token`
    pub fn authorized(&self, method: Method, path: &str, access_token: &str) -> RequestBuilder {
        self.request(method, path).bearer_auth(access_token)
    }
}

/// Best-effort human message from a platform error body
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

/// Turn a non-success response into a `ServiceError`.
///
/// `client_error` maps 4xx statuses (other than 404, 408 and 429) to an operation-specific
/// variant; returning `None` falls back to `ServiceError::Rejected`.
pub(crate) async fn error_from_response<F>(response: Response, client_error: F) -> ServiceError
where
    F: FnOnce(StatusCode) -> Option<ServiceError>,
{
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);

    if status.is_server_error() || matches!(status, StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS) {
        return ServiceError::Unreachable(format!("{}: {}", status, message));
    }
    if status == StatusCode::NOT_FOUND {
        return ServiceError::NotFound(message);
    }
    client_error(status).unwrap_or_else(|| ServiceError::rejected(status.as_u16(), message))
}
