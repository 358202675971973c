//! Account Portal - Main Library
//!
//! Session synchronization for a user-management web application whose
//! identity, profile rows and file storage live on a hosted
//! backend-as-a-service platform.
//!
//! # Overview
//!
//! One cookie-backed session is carried consistently across three participants:
//!
//! - the **session interceptor**, request middleware that revalidates or
//!   refreshes the session and mirrors any cookie rewrite onto both the
//!   forwarded request and the outgoing response
//! - the **server renderer**, page handlers behind a guard that re-checks the
//!   principal with the platform on every request
//! - the **browser agent**, which absorbs `Set-Cookie` headers and calls the
//!   platform directly with the same session
//!
//! # Module Structure
//!
//! - **`shared`** - Types used by both sides
//!   - Cookie sets and mirrored rewrites
//!   - Session token and its cookie encoding
//!   - Principal, profile and configuration types
//!
//! - **`services`** - Platform seams and their implementations
//!   - `AuthService`, `ProfileStore`, `ContentStore`
//!   - reqwest clients for the hosted platform
//!   - `MemoryPlatform` for tests and local runs
//!
//! - **`client`** - Browser agent and account component state
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum router, session interceptor, principal guard
//!   - Sign-in, sign-up, sign-out, recovery and token-hash confirmation
//!   - Server-rendered entry, account and error pages
//!
//! # Feature Flags
//!
//! - **`ssr`** - Server-side rendering (enables the backend module and binary)
//!
//! # Usage
//!
//! ```rust,no_run
//! use account_portal::backend::server::init::create_app;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let app = create_app().await?;
//! // Serve with axum::serve
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `ServiceError` in `services::error` for platform calls
//! - `SharedError` in `shared::error` for encoding and validation
//! - `BackendError` in `backend::error` for handler responses
//!
//! Boundary components turn errors into redirects or notices; raw service
//! errors never reach the end user.

/// Shared types and data structures
pub mod shared;

/// Platform service seams and clients
pub mod services;

/// Browser agent and component state
pub mod client;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
