//! Authentication Handlers Module
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs      - Module exports and documentation
//! ├── types.rs    - Form types
//! ├── login.rs    - POST /auth/login
//! ├── signup.rs   - POST /auth/signup
//! ├── signout.rs  - POST /auth/signout
//! ├── recover.rs  - POST /auth/recover
//! └── confirm.rs  - GET /auth/confirm
//! ```
//!
//! # Session Flow
//!
//! 1. **Login**: credentials → session cookie → 303 `/account`
//! 2. **Signup**: credentials → session cookie, or a confirmation email
//! 3. **Confirm**: email link → token-hash exchange → session cookie → 303 `next`
//! 4. **Signout**: platform sign-out (best effort) → cookies expired → 303 `/`

/// Form types
pub mod types;

/// Login handler
pub mod login;

/// Signup handler
pub mod signup;

/// Signout handler
pub mod signout;

/// Password recovery handler
pub mod recover;

/// Token-hash confirmation handler
pub mod confirm;

pub use types::{CredentialsForm, RecoverForm};

pub use confirm::confirm;
pub use login::login;
pub use recover::recover;
pub use signout::signout;
pub use signup::signup;
