/**
 * Session Interceptor
 *
 * Runs on every page and action request before the handler.
 *
 * # Decision
 *
 * `evaluate_session` turns the inbound cookies into a `SessionDecision`:
 *
 * - no session cookie → `Anonymous` (no service call)
 * - undecodable cookie → `Revoked`
 * - expiring within the refresh margin → refresh; success is `Refreshed`, a
 *   rejected refresh token is `Revoked`, a soft failure is `Unverified`
 * - otherwise revalidate with `get_user`; `Valid`, `Revoked` or `Unverified`
 *
 * Every service call is bounded by the configured revalidation timeout.
 *
 * # Application
 *
 * `Refreshed` and `Revoked` rewrite cookies through `MirroredCookies`, so the
 * handler downstream sees exactly what the browser will store. The forwarded
 * request gets a new `Cookie` header and the response gets the matching
 * `Set-Cookie` headers. All other decisions forward the request untouched.
 *
 * The interceptor never fails a request. Soft failures pass through and the
 * protected pages do their own authoritative check.
 */

use axum::{
    extract::{Request, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;

use crate::backend::server::state::AppState;
use crate::services::{revalidate, with_timeout, AuthService, RevalidationResult, ServiceError};
use crate::shared::config::PlatformConfig;
use crate::shared::cookies::{Cookie, CookieSet, MirroredCookies};
use crate::shared::principal::Principal;
use crate::shared::session::{expired_session_cookies, read_session, session_cookies, SessionToken};
use crate::shared::SharedError;

/// What the interceptor concluded about the inbound session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionDecision {
    /// No session cookie at all
    Anonymous,
    /// Revalidated with the authentication service
    Valid(Principal),
    /// Near expiry; replaced with a freshly issued session
    Refreshed(SessionToken),
    /// Rejected, expired beyond refresh, or unreadable; cookies get cleared
    Revoked,
    /// The service could not answer in time; passed through as-is
    Unverified,
}

impl SessionDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionDecision::Anonymous => "anonymous",
            SessionDecision::Valid(_) => "valid",
            SessionDecision::Refreshed(_) => "refreshed",
            SessionDecision::Revoked => "revoked",
            SessionDecision::Unverified => "unverified",
        }
    }
}

/// Decide what to do with the session carried in `cookies`
pub async fn evaluate_session(
    auth: &dyn AuthService,
    config: &PlatformConfig,
    cookies: &CookieSet,
    now: DateTime<Utc>,
) -> SessionDecision {
    let token = match read_session(cookies, &config.session_cookie) {
        None => return SessionDecision::Anonymous,
        Some(Err(e)) => {
            tracing::debug!("Dropping unreadable session cookie: {}", e);
            return SessionDecision::Revoked;
        }
        Some(Ok(token)) => token,
    };

    if token.expires_within(config.refresh_margin, now) {
        let refreshed = with_timeout(
            config.revalidate_timeout,
            auth.refresh_session(token.refresh_token.expose_secret()),
        )
        .await;
        return match refreshed {
            Ok(session) => SessionDecision::Refreshed(session),
            Err(e) if e.is_unreachable() || matches!(e, ServiceError::Decode(_)) => {
                tracing::warn!("Session refresh unavailable for {}: {}", token.user_id, e);
                SessionDecision::Unverified
            }
            Err(e) => {
                tracing::debug!("Session refresh rejected for {}: {}", token.user_id, e);
                SessionDecision::Revoked
            }
        };
    }

    match revalidate(auth, token.access_token.expose_secret(), config.revalidate_timeout).await {
        RevalidationResult::Valid(principal) => SessionDecision::Valid(principal),
        RevalidationResult::Invalid => SessionDecision::Revoked,
        RevalidationResult::Unreachable => {
            tracing::warn!("Session revalidation unavailable for {}", token.user_id);
            SessionDecision::Unverified
        }
    }
}

/// Apply `decision` to both cookie sets
pub fn apply_decision(
    decision: &SessionDecision,
    config: &PlatformConfig,
    cookies: &mut MirroredCookies,
) -> Result<(), SharedError> {
    let rewrites = match decision {
        SessionDecision::Refreshed(token) => session_cookies(
            &config.session_cookie,
            token,
            &config.cookie_options,
            cookies.request(),
        )?,
        SessionDecision::Revoked => {
            expired_session_cookies(&config.session_cookie, &config.cookie_options, cookies.request())
        }
        SessionDecision::Anonymous | SessionDecision::Valid(_) | SessionDecision::Unverified => Vec::new(),
    };

    for cookie in rewrites {
        cookies.write(cookie);
    }
    Ok(())
}

/// Replace the request's `Cookie` header with the live entries of `cookies`
fn rewrite_cookie_header(headers: &mut HeaderMap, cookies: &CookieSet) {
    headers.remove(COOKIE);
    if let Some(header) = cookies.to_cookie_header() {
        match HeaderValue::from_str(&header) {
            Ok(value) => {
                headers.insert(COOKIE, value);
            }
            Err(e) => tracing::error!("Rewritten Cookie header is not a valid header value: {}", e),
        }
    }
}

/// Names the handler already set on the response
fn names_set_by_handler(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(Cookie::parse_set_cookie)
        .map(|cookie| cookie.name)
        .collect()
}

/// Append `cookies` as `Set-Cookie` headers. A cookie the handler set itself
/// takes precedence over the interceptor's rewrite.
fn append_set_cookies(headers: &mut HeaderMap, cookies: &CookieSet) {
    let handled = names_set_by_handler(headers);
    for cookie in cookies.iter().filter(|cookie| !handled.contains(&cookie.name)) {
        match HeaderValue::from_str(&cookie.to_set_cookie()) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Set-Cookie for '{}' is not a valid header value: {}", cookie.name, e),
        }
    }
}

/// Session interceptor middleware
///
/// # Arguments
///
/// * `State(state)` - Configuration and the authentication service
/// * `request` - Inbound request; its `Cookie` header may be rewritten
/// * `next` - The rest of the stack
///
/// # Returns
///
/// The downstream response, with `Set-Cookie` headers appended when the
/// session was refreshed or revoked.
pub async fn session_interceptor(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    if !state.config.is_intercepted(request.uri().path()) {
        return next.run(request).await;
    }

    let inbound = CookieSet::from_headers(request.headers());
    let decision = evaluate_session(state.auth.as_ref(), &state.config, &inbound, Utc::now()).await;
    tracing::debug!(
        "Session {} for {} {}",
        decision.as_str(),
        request.method(),
        request.uri().path()
    );

    let mut cookies = MirroredCookies::new(inbound);
    if let Err(e) = apply_decision(&decision, &state.config, &mut cookies) {
        tracing::error!("Failed to write refreshed session cookie: {}", e);
        return next.run(request).await;
    }

    if !cookies.is_dirty() {
        return next.run(request).await;
    }

    let (forwarded, outgoing) = cookies.into_parts();
    rewrite_cookie_header(request.headers_mut(), &forwarded);

    let mut response = next.run(request).await;
    append_set_cookies(response.headers_mut(), &outgoing);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryPlatform;
    use assert_matches::assert_matches;
    use std::time::Duration;
    use uuid::Uuid;

    fn config() -> PlatformConfig {
        PlatformConfig::builder()
            .api_url("http://127.0.0.1:54321")
            .anon_key("anon")
            .revalidate_timeout(Duration::from_millis(200))
            .build()
            .unwrap()
    }

    fn cookie_set(config: &PlatformConfig, token: &SessionToken) -> CookieSet {
        let mut set = CookieSet::new();
        for cookie in session_cookies(&config.session_cookie, token, &config.cookie_options, &CookieSet::new()).unwrap() {
            set.insert(cookie);
        }
        set
    }

    async fn platform_with_session() -> (MemoryPlatform, SessionToken) {
        let platform = MemoryPlatform::default();
        let id = platform.create_user("a@example.com", "Passw0rd!").await;
        let session = platform.issue_session(id).await;
        (platform, session)
    }

    #[tokio::test]
    async fn test_no_cookie_is_anonymous_without_calls() {
        let platform = MemoryPlatform::default();
        let decision = evaluate_session(&platform, &config(), &CookieSet::new(), Utc::now()).await;
        assert_eq!(decision, SessionDecision::Anonymous);
        assert_eq!(platform.calls().await.get_user, 0);
    }

    #[tokio::test]
    async fn test_garbage_cookie_is_revoked() {
        let platform = MemoryPlatform::default();
        let config = config();
        let cookies = CookieSet::parse(&format!("{}=garbage", config.session_cookie));
        let decision = evaluate_session(&platform, &config, &cookies, Utc::now()).await;
        assert_eq!(decision, SessionDecision::Revoked);
    }

    #[tokio::test]
    async fn test_live_session_is_valid() {
        let (platform, session) = platform_with_session().await;
        let config = config();
        let decision = evaluate_session(&platform, &config, &cookie_set(&config, &session), Utc::now()).await;
        assert_matches!(decision, SessionDecision::Valid(principal) if principal.id == session.user_id);
    }

    #[tokio::test]
    async fn test_revoked_access_token() {
        let (platform, session) = platform_with_session().await;
        platform.revoke_access_token(session.access_token.expose_secret()).await;
        let config = config();
        let decision = evaluate_session(&platform, &config, &cookie_set(&config, &session), Utc::now()).await;
        assert_eq!(decision, SessionDecision::Revoked);
    }

    #[tokio::test]
    async fn test_expiring_session_is_refreshed() {
        let (platform, session) = platform_with_session().await;
        let config = config();
        // Evaluate as if the clock were just before expiry.
        let later = session.expires_at - chrono::Duration::seconds(10);
        let decision = evaluate_session(&platform, &config, &cookie_set(&config, &session), later).await;
        assert_matches!(decision, SessionDecision::Refreshed(token) if token.access_token.expose_secret() != session.access_token.expose_secret());
        assert_eq!(platform.calls().await.refresh, 1);
        assert_eq!(platform.calls().await.get_user, 0);
    }

    #[tokio::test]
    async fn test_used_refresh_token_is_revoked() {
        let (platform, session) = platform_with_session().await;
        platform.refresh_session(session.refresh_token.expose_secret()).await.unwrap();
        let config = config();
        let later = session.expires_at - chrono::Duration::seconds(10);
        let decision = evaluate_session(&platform, &config, &cookie_set(&config, &session), later).await;
        assert_eq!(decision, SessionDecision::Revoked);
    }

    #[tokio::test]
    async fn test_unreachable_is_unverified() {
        let (platform, session) = platform_with_session().await;
        platform.set_unreachable(true).await;
        let config = config();
        let cookies = cookie_set(&config, &session);
        assert_eq!(
            evaluate_session(&platform, &config, &cookies, Utc::now()).await,
            SessionDecision::Unverified
        );
        let later = session.expires_at - chrono::Duration::seconds(10);
        assert_eq!(
            evaluate_session(&platform, &config, &cookies, later).await,
            SessionDecision::Unverified
        );
    }

    #[tokio::test]
    async fn test_slow_service_times_out_to_unverified() {
        let (platform, session) = platform_with_session().await;
        platform.set_latency(Some(Duration::from_secs(2))).await;
        let config = config();
        let decision = evaluate_session(&platform, &config, &cookie_set(&config, &session), Utc::now()).await;
        assert_eq!(decision, SessionDecision::Unverified);
    }

    #[tokio::test]
    async fn test_rate_limited_platform_keeps_session() {
        use crate::services::HttpAuthService;
        use std::sync::Arc;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let config = PlatformConfig::builder()
            .api_url(server.uri())
            .anon_key("anon")
            .build()
            .unwrap();
        let auth = HttpAuthService::new(Arc::new(config.clone())).unwrap();
        let now = Utc::now();
        let token = SessionToken::new("at", "rt", now, now + chrono::Duration::hours(1), Uuid::new_v4());
        let cookies = cookie_set(&config, &token);

        assert_eq!(evaluate_session(&auth, &config, &cookies, now).await, SessionDecision::Unverified);
        let later = token.expires_at - chrono::Duration::seconds(10);
        assert_eq!(evaluate_session(&auth, &config, &cookies, later).await, SessionDecision::Unverified);
    }

    #[test]
    fn test_decision_debug_hides_tokens() {
        let now = Utc::now();
        let token = SessionToken::new("SECRET-AT", "SECRET-RT", now, now, Uuid::new_v4());
        let debug = format!("{:?}", SessionDecision::Refreshed(token));
        assert!(!debug.contains("SECRET-AT"));
        assert!(!debug.contains("SECRET-RT"));
    }

    #[test]
    fn test_apply_refresh_mirrors_both_sides() {
        let config = config();
        let now = Utc::now();
        let old = SessionToken::new("old", "r-old", now, now, Uuid::new_v4());
        let new = SessionToken::new("new", "r-new", now, now, old.user_id);

        let mut cookies = MirroredCookies::new(cookie_set(&config, &old));
        apply_decision(&SessionDecision::Refreshed(new.clone()), &config, &mut cookies).unwrap();
        let (forwarded, outgoing) = cookies.into_parts();

        let forwarded_token = read_session(&forwarded, &config.session_cookie).unwrap().unwrap();
        let outgoing_token = read_session(&outgoing, &config.session_cookie).unwrap().unwrap();
        assert_eq!(forwarded_token, new);
        assert_eq!(outgoing_token, new);
    }

    #[test]
    fn test_apply_revoke_expires_cookie() {
        let config = config();
        let mut cookies = MirroredCookies::new(CookieSet::parse(&format!("{}=garbage; theme=dark", config.session_cookie)));
        apply_decision(&SessionDecision::Revoked, &config, &mut cookies).unwrap();
        let (forwarded, outgoing) = cookies.into_parts();

        assert_eq!(forwarded.to_cookie_header().as_deref(), Some("theme=dark"));
        assert!(outgoing.get(&config.session_cookie).unwrap().is_tombstone());
        assert!(outgoing.get("theme").is_none());
    }

    #[test]
    fn test_handler_cookie_wins_over_rewrite() {
        let config = config();
        let mut headers = HeaderMap::new();
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("sb-session=fresh; Path=/; HttpOnly; SameSite=Lax"),
        );
        let mut outgoing = CookieSet::new();
        outgoing.expire(&config.session_cookie, &config.cookie_options);
        outgoing.expire("sb-session.0", &config.cookie_options);

        append_set_cookies(&mut headers, &outgoing);
        let values: Vec<_> = headers
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(values.len(), 2);
        assert!(values[0].starts_with("sb-session=fresh"));
        assert!(values[1].starts_with("sb-session.0=;"));
    }
}
