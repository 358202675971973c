//! Platform Services
//!
//! Traits for the three collaborators hosted by the backend-as-a-service
//! platform, plus their implementations.
//!
//! # Seams
//!
//! - **`AuthService`** - sign-in, sign-up, revalidation, refresh, token-hash exchange
//! - **`ProfileStore`** - profile rows keyed by principal id
//! - **`ContentStore`** - opaque-path objects inside logical buckets
//!
//! # Implementations
//!
//! - **`http`** - reqwest clients for the hosted platform
//! - **`memory`** - `MemoryPlatform`, an in-process stand-in for tests and local runs

/// Authentication service seam and revalidation
pub mod auth;

/// Service error taxonomy
pub mod error;

/// reqwest-backed platform clients
pub mod http;

/// In-process platform
pub mod memory;

/// Profile store seam
pub mod profiles;

/// Content store seam and upload path policy
pub mod storage;

pub use auth::{
    revalidate, AuthService, Credentials, EmailLinkTemplate, OtpType, RevalidationResult, SignUpOutcome,
};
pub use error::{with_timeout, ServiceError};
pub use http::{HttpAuthService, HttpContentStore, HttpProfileStore, PlatformClient};
pub use memory::MemoryPlatform;
pub use profiles::ProfileStore;
pub use storage::{object_path, ContentStore};
