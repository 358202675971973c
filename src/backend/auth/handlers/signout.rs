/**
 * Signout Handler
 *
 * `POST /auth/signout`. The platform sign-out is best effort: whatever it
 * answers, the session cookies are expired and the browser goes back to `/`.
 */

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::ExposeSecret;

use crate::backend::auth::sessions::clear_session;
use crate::backend::routes::ENTRY_PATH;
use crate::backend::server::state::AppState;
use crate::services::with_timeout;
use crate::shared::cookies::CookieSet;
use crate::shared::session::read_session;

pub async fn signout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let request_cookies = CookieSet::from_headers(&headers);

    if let Some(Ok(session)) = read_session(&request_cookies, &state.config.session_cookie) {
        match with_timeout(
            state.config.revalidate_timeout,
            state.auth.sign_out(session.access_token.expose_secret()),
        )
        .await
        {
            Ok(()) => tracing::info!("User signed out: {}", session.user_id),
            Err(e) => tracing::warn!("Platform sign-out failed for {}: {}", session.user_id, e),
        }
    }

    let cookies = clear_session(&state.config, &request_cookies);
    (cookies, Redirect::to(ENTRY_PATH)).into_response()
}
