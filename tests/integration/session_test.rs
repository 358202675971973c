//! Session interceptor integration tests
//!
//! The interceptor's cookie rewrites must reach both the handler (through the
//! forwarded request) and the browser (through the response).

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::get;
use axum::{middleware, Router};
use tower::ServiceExt;
use secrecy::ExposeSecret;

use account_portal::backend::{session_interceptor, AppState};
use account_portal::services::MemoryPlatform;
use account_portal::shared::{Cookie, CookieSet};

use crate::common::{body_text, jar_after, set_cookies, test_config, TestApp, EMAIL, PASSWORD};

async fn echo_cookie(headers: HeaderMap) -> String {
    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn test_refreshed_token_matches_on_request_and_response() {
    let platform = Arc::new(MemoryPlatform::default());
    let state = AppState::with_memory_platform(test_config(), platform.clone());
    let router: Router = Router::new()
        .route("/echo", get(echo_cookie))
        .layer(middleware::from_fn_with_state(state.clone(), session_interceptor))
        .with_state(state);

    let user_id = platform.create_user(EMAIL, PASSWORD).await;
    platform.set_session_lifetime(Duration::from_secs(30)).await;
    let stale = platform.issue_session(user_id).await;
    platform.set_session_lifetime(Duration::from_secs(3600)).await;

    let app = TestApp::new();
    let request = axum::http::Request::get("/echo")
        .header(header::COOKIE, format!("theme=dark; {}", app.cookie_for(&stale)))
        .body(axum::body::Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let browser = jar_after(&CookieSet::new(), &response);
    let from_response = app.session_in(&browser).unwrap();

    let forwarded = CookieSet::parse(&body_text(response).await);
    let from_request = app.session_in(&forwarded).unwrap();

    assert_eq!(from_request, from_response);
    assert_ne!(from_request.access_token.expose_secret(), stale.access_token.expose_secret());
    assert_eq!(forwarded.value("theme"), Some("dark"));
    assert_eq!(platform.calls().await.refresh, 1);
}

#[tokio::test]
async fn test_valid_session_passes_without_rewrite() {
    let app = TestApp::new();
    let session = app.signed_in().await;

    let response = app.get("/", Some(&app.cookie_for(&session))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookies(&response).is_empty());
    assert_eq!(app.platform.calls().await.get_user, 1);
}

#[tokio::test]
async fn test_revoked_session_is_expired_in_browser() {
    let app = TestApp::new();
    let session = app.signed_in().await;
    app.platform.revoke_access_token(session.access_token.expose_secret()).await;

    let cookie = app.cookie_for(&session);
    let response = app.get("/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let tombstones = set_cookies(&response)
        .iter()
        .filter_map(|value| Cookie::parse_set_cookie(value))
        .filter(Cookie::is_tombstone)
        .count();
    assert!(tombstones >= 1);
    assert!(app.session_in(&jar_after(&CookieSet::parse(&cookie), &response)).is_none());
}

#[tokio::test]
async fn test_unreachable_service_passes_request_through() {
    let app = TestApp::new();
    let session = app.signed_in().await;
    app.platform.set_unreachable(true).await;

    let response = app.get("/", Some(&app.cookie_for(&session))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn test_static_assets_skip_revalidation() {
    let app = TestApp::new();
    let session = app.signed_in().await;
    let cookie = app.cookie_for(&session);

    let response = app.get("/static/style.css", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let _ = app.get("/static/logo.png", Some(&cookie)).await;

    let calls = app.platform.calls().await;
    assert_eq!(calls.get_user, 0);
    assert_eq!(calls.refresh, 0);
}
