/**
 * Backend Error Types
 *
 * Errors returned from HTTP handlers: anything that went wrong talking to the
 * platform or reading session state. Both redirect (303) to the generic error
 * page. The detail is logged and never sent to the browser.
 *
 * Problems the user can fix (bad credentials, a short username) are not
 * errors here; handlers answer those by rendering the form again with a notice.
 */

use thiserror::Error;

use crate::services::ServiceError;
use crate::shared::SharedError;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    ServiceError(#[from] ServiceError),

    #[error(transparent)]
    SharedError(#[from] SharedError),
}

impl BackendError {
    /// Whether the failure was the platform not answering, as opposed to refusing
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::ServiceError(e) if e.is_unreachable())
    }
}
