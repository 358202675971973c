//! Browser-side session handle and component state.
//!
//! - **`agent`** - `BrowserAgent`, the cookie jar plus direct platform calls
//! - **`account`** - `AccountForm`, state of a mounted account component
//! - **`notice`** - user-facing notices built from errors

/// Browser agent
pub mod agent;

/// Account component state
pub mod account;

/// User-facing notices
pub mod notice;

pub use account::AccountForm;
pub use agent::{AgentError, BrowserAgent, SignUpResult, UploadResult};
pub use notice::{Notice, NoticeKind};
