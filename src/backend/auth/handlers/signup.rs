/**
 * Signup Handler
 *
 * `POST /auth/signup` with an email and password form.
 *
 * # Outcomes
 *
 * - invalid email or short password → entry page again, 400
 * - platform issued a session (auto-confirm) → cookie written, 303 `/account`
 * - confirmation email sent → entry page with a "check your email" notice
 *
 * The confirmation link lands on `/auth/confirm` and continues to `/account`.
 */

use axum::{
    extract::{Form, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};

use crate::backend::auth::handlers::login::entry_with_error;
use crate::backend::auth::handlers::types::CredentialsForm;
use crate::backend::auth::sessions::store_session;
use crate::backend::error::BackendError;
use crate::backend::pages::entry::render_entry;
use crate::backend::pages::render::page;
use crate::backend::routes::ACCOUNT_PATH;
use crate::backend::server::state::AppState;
use crate::client::Notice;
use crate::services::{with_timeout, SignUpOutcome};
use crate::shared::cookies::CookieSet;

pub const CHECK_EMAIL_NOTICE: &str = "Check your email to confirm your account";

/// Signup handler
///
/// # Arguments
///
/// * `State(state)` - Platform services and configuration
/// * `headers` - Request headers, for stale session cookies to expire
/// * `Form(form)` - Email and password
pub async fn signup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, BackendError> {
    if let Err(e) = form.validate_for_signup() {
        return Ok(page(StatusCode::BAD_REQUEST, render_entry(Some(&Notice::from(&e)))));
    }

    let result = with_timeout(
        state.config.revalidate_timeout,
        state.auth.sign_up(&form.credentials(), ACCOUNT_PATH),
    )
    .await;

    match result {
        Ok(SignUpOutcome::SessionIssued(session)) => {
            tracing::info!("User signed up and signed in: {}", session.user_id);
            let request_cookies = CookieSet::from_headers(&headers);
            let cookies = store_session(&state.config, &session, &request_cookies)?;
            Ok((cookies, Redirect::to(ACCOUNT_PATH)).into_response())
        }
        Ok(SignUpOutcome::ConfirmationSent { user_id }) => {
            tracing::info!("Confirmation email sent for new user {}", user_id);
            Ok(page(StatusCode::OK, render_entry(Some(&Notice::info(CHECK_EMAIL_NOTICE)))))
        }
        Err(e) => entry_with_error(e),
    }
}
