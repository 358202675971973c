/**
 * Application State Management
 *
 * `AppState` is the only state shared between requests: the immutable
 * platform configuration and handles to the platform services. There is no
 * per-user cache here; every request revalidates its own session.
 *
 * # State Extraction
 *
 * The `FromRef` implementations let handlers extract just the part they need:
 *
 * ```rust,ignore
 * async fn handler(State(auth): State<Arc<dyn AuthService>>) { /* ... */ }
 * ```
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::services::{
    AuthService, HttpAuthService, HttpProfileStore, MemoryPlatform, PlatformClient, ProfileStore, ServiceError,
};
use crate::shared::config::PlatformConfig;

/// Shared state handed to every handler and to the session middleware
#[derive(Clone)]
pub struct AppState {
    /// Platform endpoints, cookie settings and timeouts
    pub config: Arc<PlatformConfig>,

    /// Authentication service used for revalidation, refresh and sign-in
    pub auth: Arc<dyn AuthService>,

    /// Profile rows keyed by principal id
    pub profiles: Arc<dyn ProfileStore>,
}

impl AppState {
    pub fn new(config: PlatformConfig, auth: Arc<dyn AuthService>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self {
            config: Arc::new(config),
            auth,
            profiles,
        }
    }

    /// State backed by the hosted platform's REST API
    pub fn with_http_platform(config: PlatformConfig) -> Result<Self, ServiceError> {
        let config = Arc::new(config);
        let client = PlatformClient::new(config.clone())?;
        Ok(Self {
            auth: Arc::new(HttpAuthService::from_client(client.clone())),
            profiles: Arc::new(HttpProfileStore::from_client(client)),
            config,
        })
    }

    /// State backed by an in-process platform
    pub fn with_memory_platform(config: PlatformConfig, platform: Arc<MemoryPlatform>) -> Self {
        Self {
            config: Arc::new(config),
            auth: platform.clone(),
            profiles: platform,
        }
    }
}

impl FromRef<AppState> for Arc<PlatformConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for Arc<dyn AuthService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth.clone()
    }
}

impl FromRef<AppState> for Arc<dyn ProfileStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.profiles.clone()
    }
}
