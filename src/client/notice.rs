//! User-facing notices.
//!
//! A `Notice` is what a form shows after an action. It never carries platform
//! detail: every `ServiceError` maps to a fixed sentence.

use serde::{Deserialize, Serialize};

use crate::client::agent::AgentError;
use crate::services::ServiceError;
use crate::shared::SharedError;

pub const INVALID_CREDENTIALS: &str = "Invalid login credentials";
pub const SERVICE_UNAVAILABLE: &str = "Service unavailable, please try again";
pub const SESSION_EXPIRED: &str = "Your session has expired, please sign in again";
pub const LINK_EXPIRED: &str = "This link is invalid or has expired";
pub const GENERIC_FAILURE: &str = "Something went wrong, please try again";
pub const REQUEST_REFUSED: &str = "That request could not be completed, please check your details";
pub const PROFILE_UPDATED: &str = "Profile updated";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

impl From<&ServiceError> for Notice {
    fn from(err: &ServiceError) -> Self {
        match err {
            ServiceError::InvalidCredentials => Notice::error(INVALID_CREDENTIALS),
            ServiceError::Unreachable(_) | ServiceError::Timeout(_) => Notice::error(SERVICE_UNAVAILABLE),
            ServiceError::InvalidSession => Notice::error(SESSION_EXPIRED),
            ServiceError::InvalidOneTimeToken => Notice::error(LINK_EXPIRED),
            // The platform's own text may reveal whether an account exists.
            ServiceError::Rejected { status, .. } if (400..500).contains(status) => Notice::error(REQUEST_REFUSED),
            ServiceError::NotFound(_) | ServiceError::Rejected { .. } | ServiceError::Decode(_) => {
                Notice::error(GENERIC_FAILURE)
            }
        }
    }
}

impl From<&SharedError> for Notice {
    fn from(err: &SharedError) -> Self {
        match err {
            SharedError::ValidationError { message, .. } => Notice::error(message.clone()),
            _ => Notice::error(GENERIC_FAILURE),
        }
    }
}

impl From<&AgentError> for Notice {
    fn from(err: &AgentError) -> Self {
        match err {
            AgentError::NoSession => Notice::error(SESSION_EXPIRED),
            AgentError::Service(e) => e.into(),
            AgentError::Shared(e) => e.into(),
        }
    }
}
