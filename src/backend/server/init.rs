/**
 * Server Initialization
 *
 * Builds `AppState` from the loaded configuration and hands it to the router.
 *
 * # Platform Selection
 *
 * - platform URL configured → reqwest clients against the hosted platform
 * - no URL → `MemoryPlatform` with auto-confirm on, since its emails are never
 *   delivered
 */

use std::sync::Arc;

use axum::Router;

use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_platform_config, local_platform_config};
use crate::backend::server::state::AppState;
use crate::services::MemoryPlatform;

/// Create and configure the Axum application
///
/// # Errors
///
/// Fails when the configuration is invalid or the HTTP client cannot be built.
pub async fn create_app() -> Result<Router<()>, Box<dyn std::error::Error + Send + Sync>> {
    tracing::info!("Initializing account portal server");

    let app_state = match load_platform_config()? {
        Some(config) => {
            tracing::info!("Using platform at {}", config.api_url);
            AppState::with_http_platform(config)?
        }
        None => {
            let config = local_platform_config()?;
            let platform = Arc::new(MemoryPlatform::new(config.site_url.as_str()));
            platform.set_auto_confirm(true).await;
            AppState::with_memory_platform(config, platform)
        }
    };

    tracing::info!(
        "Session cookie '{}', revalidation timeout {:?}",
        app_state.config.session_cookie,
        app_state.config.revalidate_timeout
    );

    Ok(create_router(app_state))
}
