//! Common test utilities and helpers
//!
//! - In-process application over `MemoryPlatform`
//! - Request builders and response readers
//! - Custom assertion macros

pub mod assertions;
#[cfg(feature = "ssr")]
pub mod app;

#[cfg(feature = "ssr")]
pub use app::*;
