//! Server-Rendered Pages
//!
//! Minimal HTML for the route surface. Markup is plain strings; every
//! user-supplied value goes through `render::escape_html`.
//!
//! - **`entry`** - `GET /` sign-in, sign-up and recovery forms
//! - **`account`** - `GET /account` and `POST /account` (protected)
//! - **`error`** - `GET /error` and the 404 fallback

pub mod account;
pub mod entry;
pub mod error;
pub mod render;
