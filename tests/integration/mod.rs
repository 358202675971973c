//! Integration tests
//!
//! Requests go through the full router over an in-process platform.

#[cfg(feature = "ssr")]
mod session_test;
#[cfg(feature = "ssr")]
mod account_test;
#[cfg(feature = "ssr")]
mod auth_test;
#[cfg(feature = "ssr")]
mod confirm_test;
#[cfg(feature = "ssr")]
mod browser_test;
