//! Server Module
//!
//! Server initialization, application state and configuration loading.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Platform configuration loading
//! └── init.rs         - Server initialization and app creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: `PLATFORM_CONFIG` TOML file, else `PLATFORM_*` env vars
//! 2. **Service Creation**: reqwest clients, or the in-memory platform when no URL is set
//! 3. **Router Creation**: pages, auth actions, session middleware, static files

/// Application state management
pub mod state;

/// Platform configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use init::create_app;
pub use state::AppState;
