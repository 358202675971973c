//! Shared Error Types
//!
//! This module defines error types that are shared between the server and the
//! browser agent. These errors represent failures that happen before any call
//! reaches the platform: cookie decoding, input validation, serialization.
//!
//! # Error Categories
//!
//! - `SerializationError` - JSON serialization/deserialization failures
//! - `ValidationError` - Data validation failures
//! - `SessionDecodeError` - A session cookie that cannot be decoded
//!
//! # Usage
//!
//! ```rust
//! use account_portal::shared::error::SharedError;
//!
//! let error = SharedError::validation("email", "Email address is not valid");
//! ```
use thiserror::Error;

/// Shared error types that can occur on both sides of the session
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Session cookie could not be decoded
    #[error("Session cookie error: {message}")]
    SessionDecodeError {
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new session decode error
    pub fn session_decode(message: impl Into<String>) -> Self {
        Self::SessionDecodeError {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
