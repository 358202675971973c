//! Protected account page integration tests
//!
//! The guard re-checks the principal on every request. Protected content is
//! never rendered for an invalid or unverifiable session.

use std::time::Duration;

use axum::http::StatusCode;
use secrecy::ExposeSecret;

use account_portal::shared::CookieSet;

use crate::common::{body_text, jar_after, TestApp, EMAIL, PASSWORD};
use crate::{assert_contains, assert_see_other};

#[tokio::test]
async fn test_account_without_session_redirects_to_entry() {
    let app = TestApp::new();
    let response = app.get("/account", None).await;
    assert_see_other!(response, "/");
    assert_eq!(app.platform.calls().await.get_profile, 0);
}

#[tokio::test]
async fn test_account_renders_for_valid_session() {
    let app = TestApp::new();
    let session = app.signed_in().await;

    let response = app.get("/account", Some(&app.cookie_for(&session))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert_contains!(body, "Your account");
    assert_contains!(body, EMAIL);

    // One round-trip in the interceptor and one in the guard.
    assert_eq!(app.platform.calls().await.get_user, 2);
}

#[tokio::test]
async fn test_revoked_session_never_renders_account() {
    let app = TestApp::new();
    let session = app.signed_in().await;
    app.platform.revoke_access_token(session.access_token.expose_secret()).await;

    let response = app.get("/account", Some(&app.cookie_for(&session))).await;
    assert_see_other!(response, "/");
    assert!(!body_text(response).await.contains(EMAIL));
    assert_eq!(app.platform.calls().await.get_profile, 0);
}

#[tokio::test]
async fn test_unreachable_service_redirects_to_error() {
    let app = TestApp::new();
    let session = app.signed_in().await;
    app.platform.set_unreachable(true).await;

    let response = app.get("/account", Some(&app.cookie_for(&session))).await;
    assert_see_other!(response, "/error");
    assert!(!body_text(response).await.contains(EMAIL));
}

#[tokio::test]
async fn test_guard_sees_refreshed_session() {
    let app = TestApp::new();
    let user_id = app.platform.create_user(EMAIL, PASSWORD).await;
    app.platform.set_session_lifetime(Duration::from_secs(30)).await;
    let stale = app.platform.issue_session(user_id).await;
    app.platform.set_session_lifetime(Duration::from_secs(3600)).await;

    let cookie = app.cookie_for(&stale);
    let response = app.get("/account", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let fresh = app.session_in(&jar_after(&CookieSet::parse(&cookie), &response)).unwrap();
    assert_ne!(fresh.access_token.expose_secret(), stale.access_token.expose_secret());

    let calls = app.platform.calls().await;
    assert_eq!(calls.refresh, 1);
    assert_eq!(calls.get_user, 1);
}

#[tokio::test]
async fn test_profile_save_is_idempotent() {
    let app = TestApp::new();
    let session = app.signed_in().await;
    let cookie = app.cookie_for(&session);
    let form = "full_name=Ada+Lovelace&username=ada&website=https%3A%2F%2Fada.example&avatar_url=";

    let first = app.post_form("/account", form, Some(&cookie)).await;
    assert_see_other!(first, "/account");
    let second = app.post_form("/account", form, Some(&cookie)).await;
    assert_see_other!(second, "/account");
    assert_eq!(app.platform.profile_count().await, 1);

    let page = body_text(app.get("/account", Some(&cookie)).await).await;
    assert_contains!(page, "Ada Lovelace");
    assert_contains!(page, "https://ada.example");
}

#[tokio::test]
async fn test_profile_validation_error_rerenders_form() {
    let app = TestApp::new();
    let session = app.signed_in().await;

    let response = app
        .post_form("/account", "username=ab&website=", Some(&app.cookie_for(&session)))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_contains!(body_text(response).await, "Username must be at least 3 characters");
    assert_eq!(app.platform.profile_count().await, 0);
}

#[tokio::test]
async fn test_profile_save_requires_session() {
    let app = TestApp::new();
    let response = app.post_form("/account", "username=ada", None).await;
    assert_see_other!(response, "/");
    assert_eq!(app.platform.calls().await.upsert_profile, 0);
}
