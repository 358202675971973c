/**
 * Server Configuration
 *
 * Loads the platform configuration for the server binary.
 *
 * # Configuration Sources
 *
 * 1. `PLATFORM_CONFIG` - path to a TOML file, when set
 * 2. `PLATFORM_*` environment variables otherwise
 *
 * # Error Handling
 *
 * A missing `PLATFORM_URL` is not fatal. The loader returns `None` and the
 * server falls back to the in-memory platform for local development. Any other
 * configuration error (bad URL, bad number, unreadable file) is returned.
 */

use crate::shared::config::{ConfigError, PlatformConfig, DEFAULT_SITE_URL};

/// Placeholder endpoint recorded in the config when running in-memory
const LOCAL_API_URL: &str = "http://127.0.0.1:54321";
const LOCAL_ANON_KEY: &str = "local-anon-key";

/// Load the platform configuration
///
/// # Returns
///
/// - `Ok(Some(config))` when a platform URL is configured
/// - `Ok(None)` when `PLATFORM_URL` is not set and no TOML file is given
///
/// # Errors
///
/// Returns `ConfigError` when a configured value is invalid.
pub fn load_platform_config() -> Result<Option<PlatformConfig>, ConfigError> {
    load_from(|key| std::env::var(key).ok())
}

/// Same as [`load_platform_config`] over any key lookup
pub fn load_from<F>(lookup: F) -> Result<Option<PlatformConfig>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup("PLATFORM_CONFIG") {
        tracing::info!("Loading platform configuration from {}", path);
        return PlatformConfig::from_toml_file(&path).map(Some);
    }

    if lookup("PLATFORM_URL").is_none() {
        tracing::warn!("PLATFORM_URL not set. Using the in-memory platform.");
        return Ok(None);
    }

    PlatformConfig::from_lookup(lookup).map(Some)
}

/// Configuration for the in-memory platform, honouring `PLATFORM_SITE_URL`
pub fn local_platform_config() -> Result<PlatformConfig, ConfigError> {
    let site_url = std::env::var("PLATFORM_SITE_URL").unwrap_or_else(|_| DEFAULT_SITE_URL.to_string());
    PlatformConfig::builder()
        .api_url(LOCAL_API_URL)
        .anon_key(LOCAL_ANON_KEY)
        .site_url(site_url)
        .build()
}
