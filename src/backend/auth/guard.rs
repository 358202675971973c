/**
 * Current Principal Guard
 *
 * `CurrentPrincipal` is the extractor every protected handler takes. It reads
 * the session from the request cookies (already rewritten by the session
 * interceptor) and asks the authentication service who it belongs to. A
 * cookie on its own is never trusted.
 *
 * # Rejections
 *
 * - no session, unreadable session, or revalidation says invalid → 303 to `/`
 * - authentication service unreachable or too slow → 303 to `/error`
 *
 * Either way the protected handler does not run.
 */

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::ExposeSecret;

use crate::backend::routes::{ENTRY_PATH, ERROR_PATH};
use crate::backend::server::state::AppState;
use crate::services::{revalidate, RevalidationResult};
use crate::shared::cookies::CookieSet;
use crate::shared::principal::Principal;
use crate::shared::session::{read_session, SessionToken};

/// Principal revalidated for this request, with the session it came from
#[derive(Debug, Clone)]
pub struct CurrentPrincipal {
    pub principal: Principal,
    pub session: SessionToken,
}

/// Why the guard refused the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardRejection {
    /// Missing or invalid session
    Unauthenticated,
    /// The authentication service could not answer
    Unavailable,
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        match self {
            GuardRejection::Unauthenticated => Redirect::to(ENTRY_PATH).into_response(),
            GuardRejection::Unavailable => Redirect::to(ERROR_PATH).into_response(),
        }
    }
}

impl FromRequestParts<AppState> for CurrentPrincipal {
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let cookies = CookieSet::from_headers(&parts.headers);
        let session = match read_session(&cookies, &state.config.session_cookie) {
            Some(Ok(session)) => session,
            Some(Err(e)) => {
                tracing::debug!("Guard rejected unreadable session: {}", e);
                return Err(GuardRejection::Unauthenticated);
            }
            None => return Err(GuardRejection::Unauthenticated),
        };

        match revalidate(
            state.auth.as_ref(),
            session.access_token.expose_secret(),
            state.config.revalidate_timeout,
        )
        .await
        {
            RevalidationResult::Valid(principal) => Ok(CurrentPrincipal { principal, session }),
            RevalidationResult::Invalid => {
                tracing::info!("Guard rejected session for {}", session.user_id);
                Err(GuardRejection::Unauthenticated)
            }
            RevalidationResult::Unreachable => {
                tracing::warn!("Guard could not revalidate session for {}", session.user_id);
                Err(GuardRejection::Unavailable)
            }
        }
    }
}
