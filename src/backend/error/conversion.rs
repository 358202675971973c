/**
 * Error Conversion
 *
 * `IntoResponse` for `BackendError`: log the detail, then 303 to the generic
 * error page. Soft failures (platform unreachable) log at `warn`, everything
 * else at `error`.
 */

use axum::response::{IntoResponse, Redirect, Response};

use crate::backend::error::types::BackendError;
use crate::backend::routes::ERROR_PATH;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        if self.is_unavailable() {
            tracing::warn!("Request failed, platform unavailable: {}", self);
        } else {
            tracing::error!("Request failed: {}", self);
        }
        Redirect::to(ERROR_PATH).into_response()
    }
}
