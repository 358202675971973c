//! Platform configuration module
//!
//! Provides the configuration shared by the server and the browser agent: where
//! the hosted platform lives, how the session cookie is written, and the bounds
//! on revalidation round-trips.
//!
//! Configuration can be assembled three ways:
//!
//! - `PlatformConfig::builder()` for code and tests
//! - `PlatformConfig::from_env()` reading `PLATFORM_*` variables
//! - `PlatformConfig::from_toml_str()` for a config file
//!
//! All three go through `PlatformConfigBuilder::build`, which validates URLs
//! and fills in defaults.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::shared::cookies::{CookieOptions, SameSite};

/// Default site URL used when none is configured
pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";

/// Default name of the session cookie
pub const DEFAULT_SESSION_COOKIE: &str = "sb-session";

/// Default bound on a single revalidation or refresh round-trip
pub const DEFAULT_REVALIDATE_TIMEOUT: Duration = Duration::from_secs(3);

/// Default window before expiry in which a session is refreshed
pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Default bucket for avatar uploads
pub const DEFAULT_AVATAR_BUCKET: &str = "avatars";

/// 400 days, the longest lifetime browsers accept
const COOKIE_MAX_AGE_SECS: i64 = 400 * 24 * 60 * 60;

const DEFAULT_EXCLUDED_PREFIXES: &[&str] = &["/static/", "/favicon.ico"];
const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &["svg", "png", "jpg", "jpeg", "gif", "webp", "ico"];

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL for {key}: {value}")]
    InvalidUrl { key: &'static str, value: String },
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid number for {key}: {value}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Platform and session configuration
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Base URL of the hosted platform (auth, rest and storage live under it)
    pub api_url: Url,
    /// Public API key sent as the `apikey` header
    pub anon_key: String,
    /// Public URL of this site, used for email links
    pub site_url: Url,
    /// Name of the session cookie (chunks use `<name>.<n>`)
    pub session_cookie: String,
    pub cookie_options: CookieOptions,
    pub revalidate_timeout: Duration,
    pub refresh_margin: Duration,
    pub avatar_bucket: String,
    /// Path prefixes the session middleware never touches
    pub excluded_prefixes: Vec<String>,
    /// File extensions the session middleware never touches
    pub excluded_extensions: Vec<String>,
}

impl PlatformConfig {
    /// Create a new PlatformConfigBuilder
    pub fn builder() -> PlatformConfigBuilder {
        PlatformConfigBuilder::default()
    }

    /// Load from `PLATFORM_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup using the environment variable names
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();
        if let Some(url) = lookup("PLATFORM_URL") {
            builder = builder.api_url(url);
        }
        if let Some(key) = lookup("PLATFORM_ANON_KEY") {
            builder = builder.anon_key(key);
        }
        if let Some(url) = lookup("PLATFORM_SITE_URL") {
            builder = builder.site_url(url);
        }
        if let Some(name) = lookup("PLATFORM_SESSION_COOKIE") {
            builder = builder.session_cookie(name);
        }
        if let Some(ms) = lookup("PLATFORM_REVALIDATE_TIMEOUT_MS") {
            let ms = parse_number("PLATFORM_REVALIDATE_TIMEOUT_MS", &ms)?;
            builder = builder.revalidate_timeout(Duration::from_millis(ms));
        }
        if let Some(secs) = lookup("PLATFORM_REFRESH_MARGIN_SECS") {
            let secs = parse_number("PLATFORM_REFRESH_MARGIN_SECS", &secs)?;
            builder = builder.refresh_margin(Duration::from_secs(secs));
        }
        if let Some(bucket) = lookup("PLATFORM_AVATAR_BUCKET") {
            builder = builder.avatar_bucket(bucket);
        }
        builder.build()
    }

    /// Load from a TOML document
    ///
    /// ```toml
    /// api_url = "https://project.example.co"
    /// anon_key = "public-anon-key"
    /// site_url = "https://portal.example.com"
    /// revalidate_timeout_ms = 2500
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(source)?;
        file.into_builder().build()
    }

    /// Load from a TOML file on disk
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Full URL for a platform endpoint path such as `/auth/v1/user`
    pub fn api_endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url.as_str().trim_end_matches('/'), path)
    }

    /// Full URL for a path on this site
    pub fn site_link(&self, path: &str) -> String {
        format!("{}{}", self.site_url.as_str().trim_end_matches('/'), path)
    }

    /// Whether the session middleware should run for `path`
    pub fn is_intercepted(&self, path: &str) -> bool {
        if self
            .excluded_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
        {
            return false;
        }

        let last_segment = path.rsplit('/').next().unwrap_or(path);
        match last_segment.rsplit_once('.') {
            Some((_, ext)) => !self
                .excluded_extensions
                .iter()
                .any(|excluded| excluded.eq_ignore_ascii_case(ext)),
            None => true,
        }
    }
}

fn parse_number(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        key,
        value: value.to_string(),
    })
}

fn parse_url(key: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|_| ConfigError::InvalidUrl {
        key,
        value: value.to_string(),
    })
}

/// On-disk layout accepted by `PlatformConfig::from_toml_str`
#[derive(Debug, Deserialize)]
struct FileConfig {
    api_url: Option<String>,
    anon_key: Option<String>,
    site_url: Option<String>,
    session_cookie: Option<String>,
    revalidate_timeout_ms: Option<u64>,
    refresh_margin_secs: Option<u64>,
    avatar_bucket: Option<String>,
    excluded_prefixes: Option<Vec<String>>,
}

impl FileConfig {
    fn into_builder(self) -> PlatformConfigBuilder {
        PlatformConfigBuilder {
            api_url: self.api_url,
            anon_key: self.anon_key,
            site_url: self.site_url,
            session_cookie: self.session_cookie,
            revalidate_timeout: self.revalidate_timeout_ms.map(Duration::from_millis),
            refresh_margin: self.refresh_margin_secs.map(Duration::from_secs),
            avatar_bucket: self.avatar_bucket,
            excluded_prefixes: self.excluded_prefixes,
        }
    }
}

/// Builder for PlatformConfig
#[derive(Debug, Default, Clone)]
pub struct PlatformConfigBuilder {
    api_url: Option<String>,
    anon_key: Option<String>,
    site_url: Option<String>,
    session_cookie: Option<String>,
    revalidate_timeout: Option<Duration>,
    refresh_margin: Option<Duration>,
    avatar_bucket: Option<String>,
    excluded_prefixes: Option<Vec<String>>,
}

impl PlatformConfigBuilder {
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    pub fn anon_key(mut self, key: impl Into<String>) -> Self {
        self.anon_key = Some(key.into());
        self
    }

    pub fn site_url(mut self, url: impl Into<String>) -> Self {
        self.site_url = Some(url.into());
        self
    }

    pub fn session_cookie(mut self, name: impl Into<String>) -> Self {
        self.session_cookie = Some(name.into());
        self
    }

    pub fn revalidate_timeout(mut self, timeout: Duration) -> Self {
        self.revalidate_timeout = Some(timeout);
        self
    }

    pub fn refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = Some(margin);
        self
    }

    pub fn avatar_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.avatar_bucket = Some(bucket.into());
        self
    }

    pub fn excluded_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.excluded_prefixes = Some(prefixes);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<PlatformConfig, ConfigError> {
        let api_url = self
            .api_url
            .ok_or(ConfigError::MissingValue("api_url"))
            .and_then(|url| parse_url("api_url", &url))?;
        let anon_key = self
            .anon_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingValue("anon_key"))?;
        let site_url = parse_url(
            "site_url",
            self.site_url.as_deref().unwrap_or(DEFAULT_SITE_URL),
        )?;

        let session_cookie = self
            .session_cookie
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_COOKIE.to_string());

        let cookie_options = CookieOptions {
            path: "/".to_string(),
            max_age: Some(COOKIE_MAX_AGE_SECS),
            http_only: true,
            secure: site_url.scheme() == "https",
            same_site: SameSite::Lax,
        };

        Ok(PlatformConfig {
            api_url,
            anon_key,
            site_url,
            session_cookie,
            cookie_options,
            revalidate_timeout: self.revalidate_timeout.unwrap_or(DEFAULT_REVALIDATE_TIMEOUT),
            refresh_margin: self.refresh_margin.unwrap_or(DEFAULT_REFRESH_MARGIN),
            avatar_bucket: self
                .avatar_bucket
                .unwrap_or_else(|| DEFAULT_AVATAR_BUCKET.to_string()),
            excluded_prefixes: self.excluded_prefixes.unwrap_or_else(|| {
                DEFAULT_EXCLUDED_PREFIXES.iter().map(|p| p.to_string()).collect()
            }),
            excluded_extensions: DEFAULT_EXCLUDED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        })
    }
}
