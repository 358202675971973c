//! Authentication route integration tests

use axum::http::StatusCode;
use secrecy::ExposeSecret;

use account_portal::backend::auth::handlers::recover::RECOVERY_NOTICE;
use account_portal::backend::auth::handlers::signup::CHECK_EMAIL_NOTICE;
use account_portal::client::notice::{INVALID_CREDENTIALS, REQUEST_REFUSED, SERVICE_UNAVAILABLE};
use account_portal::services::{AuthService, ServiceError};
use account_portal::shared::CookieSet;

use crate::common::{body_text, jar_after, set_cookies, TestApp, EMAIL, PASSWORD};
use crate::{assert_contains, assert_see_other};

const LOGIN_FORM: &str = "email=ada%40example.com&password=Passw0rd%21";

#[tokio::test]
async fn test_login_writes_session_and_redirects() {
    let app = TestApp::new();
    app.platform.create_user(EMAIL, PASSWORD).await;

    let response = app.post_form("/auth/login", LOGIN_FORM, None).await;
    assert_see_other!(response, "/account");

    let session = app.session_in(&jar_after(&CookieSet::new(), &response)).unwrap();
    assert!(app.platform.get_user(session.access_token.expose_secret()).await.is_ok());
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let app = TestApp::new();
    app.platform.create_user(EMAIL, PASSWORD).await;

    let response = app
        .post_form("/auth/login", "email=ada%40example.com&password=nope", None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&response).is_empty());
    assert_contains!(body_text(response).await, INVALID_CREDENTIALS);
}

#[tokio::test]
async fn test_login_service_unavailable() {
    let app = TestApp::new();
    app.platform.set_unreachable(true).await;

    let response = app.post_form("/auth/login", LOGIN_FORM, None).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_contains!(body_text(response).await, SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_signup_sends_confirmation() {
    let app = TestApp::new();

    let response = app.post_form("/auth/signup", LOGIN_FORM, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookies(&response).is_empty());
    assert_contains!(body_text(response).await, CHECK_EMAIL_NOTICE);

    let email = app.platform.last_email_to(EMAIL).await.unwrap();
    assert!(email.link.starts_with("http://localhost:3000/auth/confirm?"));
}

#[tokio::test]
async fn test_signup_auto_confirmed_signs_in() {
    let app = TestApp::new();
    app.platform.set_auto_confirm(true).await;

    let response = app.post_form("/auth/signup", LOGIN_FORM, None).await;
    assert_see_other!(response, "/account");
    assert!(app.session_in(&jar_after(&CookieSet::new(), &response)).is_some());
}

#[tokio::test]
async fn test_signup_rejects_short_password() {
    let app = TestApp::new();
    let response = app
        .post_form("/auth/signup", "email=ada%40example.com&password=123", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.platform.calls().await.sign_up, 0);
}

#[tokio::test]
async fn test_signup_existing_email_shows_fixed_notice() {
    let app = TestApp::new();
    app.platform.create_user(EMAIL, PASSWORD).await;

    let response = app.post_form("/auth/signup", LOGIN_FORM, None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_text(response).await;
    assert_contains!(body, REQUEST_REFUSED);
    assert!(!body.contains("already registered"));
}

#[tokio::test]
async fn test_signout_revokes_and_expires_cookie() {
    let app = TestApp::new();
    let session = app.signed_in().await;
    let cookie = app.cookie_for(&session);

    let response = app.post_form("/auth/signout", "", Some(&cookie)).await;
    assert_see_other!(response, "/");
    assert!(app.session_in(&jar_after(&CookieSet::parse(&cookie), &response)).is_none());
    assert_eq!(
        app.platform.get_user(session.access_token.expose_secret()).await,
        Err(ServiceError::InvalidSession)
    );
}

#[tokio::test]
async fn test_signout_when_unreachable_still_clears() {
    let app = TestApp::new();
    let session = app.signed_in().await;
    let cookie = app.cookie_for(&session);
    app.platform.set_unreachable(true).await;

    let response = app.post_form("/auth/signout", "", Some(&cookie)).await;
    assert_see_other!(response, "/");
    assert!(app.session_in(&jar_after(&CookieSet::parse(&cookie), &response)).is_none());
}

#[tokio::test]
async fn test_recover_does_not_reveal_accounts() {
    let app = TestApp::new();
    app.platform.create_user(EMAIL, PASSWORD).await;

    let known = body_text(app.post_form("/auth/recover", "email=ada%40example.com", None).await).await;
    let unknown = body_text(app.post_form("/auth/recover", "email=nobody%40example.com", None).await).await;

    assert_contains!(known, RECOVERY_NOTICE);
    assert_eq!(known, unknown);
    assert_eq!(app.platform.outbox().await.len(), 1);
}
