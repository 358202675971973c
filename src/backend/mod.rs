//! Backend Module
//!
//! Server-side code for the account portal: the session interceptor, the
//! revalidating guard, page and action handlers, and server assembly.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - Route paths and router assembly
//! - **`middleware`** - Session interceptor
//! - **`auth`** - Principal guard and authentication handlers
//! - **`pages`** - Server-rendered pages
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── middleware/     - Session interceptor
//! ├── auth/           - Guard and authentication handlers
//! ├── pages/          - HTML pages
//! └── error/          - Error types
//! ```
//!
//! # Request Flow
//!
//! 1. The session interceptor revalidates or refreshes the session cookie and
//!    mirrors any rewrite onto the forwarded request and the response.
//! 2. Protected handlers take `CurrentPrincipal`, which makes its own
//!    `get_user` round-trip with the (possibly refreshed) cookie.
//! 3. Handlers render HTML or redirect; platform failures redirect to `/error`.
//!
//! # State Management
//!
//! `AppState` holds the platform configuration and `Arc<dyn ...>` service
//! handles. Nothing about a user is cached between requests.
//!
//! # Example
//!
//! ```rust,no_run
//! use account_portal::backend::server::create_app;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let app = create_app().await?;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Backend error types
pub mod error;

/// Principal guard and authentication handlers
pub mod auth;

/// Session interceptor
pub mod middleware;

/// Server-rendered pages
pub mod pages;

pub use auth::{CurrentPrincipal, GuardRejection};
pub use error::BackendError;
pub use middleware::{evaluate_session, session_interceptor, SessionDecision};
pub use routes::create_router;
pub use server::{create_app, AppState};
