//! Route Configuration Module
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Route paths and exports
//! ├── router.rs       - Main router creation
//! └── api_routes.rs   - Authentication action routes
//! ```
//!
//! # Routes
//!
//! ## Pages
//!
//! - `GET /` - Sign-in, sign-up and password-recovery forms
//! - `GET /account` - Account form (protected)
//! - `POST /account` - Save profile (protected)
//! - `GET /error` - Generic error page
//!
//! ## Authentication Actions
//!
//! - `POST /auth/login`
//! - `POST /auth/signup`
//! - `POST /auth/signout`
//! - `POST /auth/recover`
//! - `GET /auth/confirm` - Token-hash exchange from email links
//!
//! ## Static Files
//!
//! - `/static/*` - Served from `public/`, outside the session middleware

/// Main router creation
pub mod router;

/// Authentication action routes
pub mod api_routes;

pub use router::create_router;

/// Unauthenticated entry page
pub const ENTRY_PATH: &str = "/";

/// Protected account page
pub const ACCOUNT_PATH: &str = "/account";

/// Generic error page
pub const ERROR_PATH: &str = "/error";

/// Token-hash exchange endpoint targeted by email links
pub const CONFIRM_PATH: &str = "/auth/confirm";
