/**
 * Login Handler
 *
 * `POST /auth/login` with an email and password form.
 *
 * # Outcomes
 *
 * - success → session cookie written, 303 to `/account`
 * - invalid credentials → entry page again, 401, "Invalid login credentials"
 * - service unreachable → entry page again, 503, retry notice
 * - other platform refusals → entry page again, 400, the refusal's message
 *
 * Unknown emails and wrong passwords are indistinguishable.
 */

use axum::{
    extract::{Form, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};

use crate::backend::auth::handlers::types::CredentialsForm;
use crate::backend::auth::sessions::store_session;
use crate::backend::error::BackendError;
use crate::backend::pages::entry::render_entry;
use crate::backend::pages::render::page;
use crate::backend::routes::ACCOUNT_PATH;
use crate::backend::server::state::AppState;
use crate::client::Notice;
use crate::services::{with_timeout, ServiceError};
use crate::shared::cookies::CookieSet;

/// Login handler
///
/// # Arguments
///
/// * `State(state)` - Platform services and configuration
/// * `headers` - Request headers, for stale session cookies to expire
/// * `Form(form)` - Email and password
///
/// # Errors
///
/// Undecodable platform answers redirect to `/error`.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, BackendError> {
    let credentials = form.credentials();
    let result = with_timeout(
        state.config.revalidate_timeout,
        state.auth.sign_in_with_password(&credentials),
    )
    .await;

    let session = match result {
        Ok(session) => session,
        Err(e) => return entry_with_error(e),
    };

    tracing::info!("User signed in: {}", session.user_id);
    let request_cookies = CookieSet::from_headers(&headers);
    let cookies = store_session(&state.config, &session, &request_cookies)?;
    Ok((cookies, Redirect::to(ACCOUNT_PATH)).into_response())
}

/// Re-render the entry page for a failed sign-in or sign-up
pub(crate) fn entry_with_error(err: ServiceError) -> Result<Response, BackendError> {
    let status = match &err {
        ServiceError::InvalidCredentials => Some(StatusCode::UNAUTHORIZED),
        e if e.is_unreachable() => {
            tracing::warn!("Authentication service unavailable: {}", e);
            Some(StatusCode::SERVICE_UNAVAILABLE)
        }
        ServiceError::Rejected { status, .. } if (400..500).contains(status) => Some(StatusCode::BAD_REQUEST),
        _ => None,
    };
    let Some(status) = status else {
        return Err(err.into());
    };
    tracing::info!("Authentication attempt failed: {}", err);
    Ok(page(status, render_entry(Some(&Notice::from(&err)))))
}
