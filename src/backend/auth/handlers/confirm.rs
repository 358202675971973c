/**
 * Token-Hash Confirmation Handler
 *
 * `GET /auth/confirm?token_hash=...&type=...&next=...` is where sign-up,
 * recovery, invite, magic-link and email-change links land.
 *
 * # States
 *
 * ```text
 * Received ──exchange ok──▶ Exchanged   (cookie written, 303 to next)
 *     └────anything else──▶ Failed      (no cookie, 303 to /error)
 * ```
 *
 * At most one call to the authentication service is made per request. Hashes
 * are consumed by the platform, so replaying a link fails there; nothing is
 * remembered here.
 *
 * # Redirect Target
 *
 * `next` is reduced to a path on this site. Other origins, scheme-relative
 * URLs and unparsable values fall back to `/account`. The `token_hash` and
 * `type` parameters are stripped so the one-time hash never survives into the
 * browser's address bar.
 */

use axum::{
    extract::{RawQuery, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use url::Url;

use crate::backend::auth::sessions::store_session;
use crate::backend::routes::{ACCOUNT_PATH, ERROR_PATH};
use crate::backend::server::state::AppState;
use crate::services::{with_timeout, AuthService, OtpType, ServiceError};
use crate::shared::config::PlatformConfig;
use crate::shared::cookies::CookieSet;
use crate::shared::session::SessionToken;

const STRIPPED_PARAMS: [&str; 2] = ["token_hash", "type"];

/// Parameters of a confirmation link. The first occurrence of each wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmQuery {
    pub token_hash: Option<String>,
    pub kind: Option<String>,
    pub next: Option<String>,
}

impl ConfirmQuery {
    pub fn parse(raw: Option<&str>) -> Self {
        let mut query = Self::default();
        for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            let slot = match key.as_ref() {
                "token_hash" => &mut query.token_hash,
                "type" => &mut query.kind,
                "next" => &mut query.next,
                _ => continue,
            };
            if slot.is_none() && !value.is_empty() {
                *slot = Some(value.into_owned());
            }
        }
        query
    }
}

/// Why a confirmation did not produce a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmFailure {
    MissingTokenHash,
    MissingType,
    UnknownType,
    /// Hash unknown, already used, expired, or of another type
    Rejected,
    /// The service could not be reached in time
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmState {
    Received(ConfirmQuery),
    Exchanged {
        session: SessionToken,
        redirect_to: String,
    },
    Failed(ConfirmFailure),
}

impl ConfirmState {
    /// Run the exchange. Terminal states are returned unchanged.
    pub async fn advance(self, auth: &dyn AuthService, config: &PlatformConfig) -> ConfirmState {
        let query = match self {
            ConfirmState::Received(query) => query,
            terminal => return terminal,
        };

        let Some(token_hash) = query.token_hash else {
            return ConfirmState::Failed(ConfirmFailure::MissingTokenHash);
        };
        let Some(kind) = query.kind else {
            return ConfirmState::Failed(ConfirmFailure::MissingType);
        };
        let Ok(kind) = kind.parse::<OtpType>() else {
            return ConfirmState::Failed(ConfirmFailure::UnknownType);
        };

        match with_timeout(config.revalidate_timeout, auth.verify_token_hash(&token_hash, kind)).await {
            Ok(session) => ConfirmState::Exchanged {
                session,
                redirect_to: sanitize_next(query.next.as_deref(), &config.site_url),
            },
            Err(ServiceError::Decode(_)) => ConfirmState::Failed(ConfirmFailure::Unavailable),
            Err(e) if e.is_unreachable() => ConfirmState::Failed(ConfirmFailure::Unavailable),
            Err(_) => ConfirmState::Failed(ConfirmFailure::Rejected),
        }
    }
}

/// Reduce `next` to a path on `site_url`, without one-time parameters
pub fn sanitize_next(next: Option<&str>, site_url: &Url) -> String {
    let Some(next) = next.map(str::trim).filter(|n| !n.is_empty()) else {
        return ACCOUNT_PATH.to_string();
    };
    let target = match site_url.join(next) {
        Ok(target) if target.origin() == site_url.origin() => target,
        _ => return ACCOUNT_PATH.to_string(),
    };

    let kept: Vec<(String, String)> = target
        .query_pairs()
        .filter(|(key, _)| !STRIPPED_PARAMS.contains(&key.as_ref()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut path = target.path().to_string();
    if !kept.is_empty() {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(kept)
            .finish();
        path.push('?');
        path.push_str(&query);
    }
    path
}

/// Confirmation handler
///
/// # Arguments
///
/// * `State(state)` - Platform services and configuration
/// * `headers` - Request headers, for stale session cookies to expire
/// * `RawQuery(query)` - `token_hash`, `type` and optional `next`
///
/// # Returns
///
/// 303 to the sanitized `next` with the session cookie on success, otherwise
/// 303 to `/error` with no cookie.
pub async fn confirm(State(state): State<AppState>, headers: HeaderMap, RawQuery(query): RawQuery) -> Response {
    let received = ConfirmState::Received(ConfirmQuery::parse(query.as_deref()));
    let outcome = received.advance(state.auth.as_ref(), &state.config).await;

    match outcome {
        ConfirmState::Exchanged { session, redirect_to } => {
            let request_cookies = CookieSet::from_headers(&headers);
            match store_session(&state.config, &session, &request_cookies) {
                Ok(cookies) => {
                    tracing::info!("Token hash exchanged for {}", session.user_id);
                    (cookies, Redirect::to(&redirect_to)).into_response()
                }
                Err(e) => {
                    tracing::error!("Failed to encode session after exchange: {}", e);
                    Redirect::to(ERROR_PATH).into_response()
                }
            }
        }
        ConfirmState::Failed(reason) => {
            tracing::warn!("Confirmation failed: {:?}", reason);
            Redirect::to(ERROR_PATH).into_response()
        }
        ConfirmState::Received(_) => Redirect::to(ERROR_PATH).into_response(),
    }
}
