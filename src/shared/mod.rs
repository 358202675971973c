//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the server (edge middleware and page handlers) and the browser agent.
//!
//! # Overview
//!
//! The shared module provides platform-agnostic types that can be used
//! in both server and client code: cookie sets and their mirroring rules,
//! the session token and its cookie encoding, principal and profile types,
//! and the platform configuration.

/// Cookie parsing, rendering and mirroring
pub mod cookies;

/// Session token and its cookie encoding
pub mod session;

/// Principal and profile types
pub mod principal;

/// Shared error types
pub mod error;

/// Platform configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use cookies::{Cookie, CookieOptions, CookieSet, MirroredCookies, SameSite};
pub use session::SessionToken;
pub use principal::{Principal, Profile, ProfileUpdate};
pub use error::SharedError;
pub use config::{ConfigError, PlatformConfig, PlatformConfigBuilder};
