//! Authentication Module
//!
//! Server-side half of the session flow: the revalidating principal extractor
//! and the handlers that create, exchange and clear sessions.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── guard.rs        - CurrentPrincipal extractor
//! ├── sessions.rs     - Writing and clearing session cookies on responses
//! └── handlers/       - HTTP handlers
//!     ├── mod.rs      - Handler exports
//!     ├── types.rs    - Form types
//!     ├── login.rs    - Password sign-in
//!     ├── signup.rs   - Registration
//!     ├── signout.rs  - Sign-out
//!     ├── recover.rs  - Password recovery email
//!     └── confirm.rs  - Token-hash exchange
//! ```
//!
//! # Security
//!
//! - Protected pages are only rendered after a `get_user` round-trip
//! - Invalid credentials return the same message for unknown and wrong accounts
//! - Recovery always answers with the same notice
//! - Tokens and token hashes are never logged

/// Revalidating principal extractor
pub mod guard;

/// Session cookie helpers for responses
pub mod sessions;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use guard::{CurrentPrincipal, GuardRejection};
pub use handlers::{confirm, login, recover, signout, signup};
