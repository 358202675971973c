//! Middleware Module
//!
//! HTTP middleware that runs before the page and action handlers.
//!
//! - **`session`** - The session interceptor: revalidates or refreshes the
//!   session cookie and mirrors any rewrite onto both the forwarded request and
//!   the response
//!
//! # Example
//!
//! ```rust,ignore
//! let router = router.layer(axum::middleware::from_fn_with_state(state.clone(), session_interceptor));
//! ```

pub mod session;

pub use session::{evaluate_session, session_interceptor, SessionDecision};
