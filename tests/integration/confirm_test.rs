//! Token-hash confirmation integration tests

use axum::http::StatusCode;
use secrecy::ExposeSecret;

use account_portal::shared::CookieSet;

use crate::assert_see_other;
use crate::common::{link_target, location, set_cookies, TestApp, EMAIL};

async fn signup_link(app: &TestApp) -> String {
    let response = app
        .post_form("/auth/signup", "email=ada%40example.com&password=Passw0rd%21", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let email = app.platform.last_email_to(EMAIL).await.unwrap();
    link_target(&email.link)
}

#[tokio::test]
async fn test_signup_link_signs_in_and_strips_hash() {
    let app = TestApp::new();
    let target = signup_link(&app).await;
    assert!(target.contains("token_hash="));

    let response = app.get(&target, None).await;
    assert_see_other!(response, "/account");
    assert!(!location(&response).unwrap().contains("token_hash"));

    let mut jar = CookieSet::new();
    for value in set_cookies(&response) {
        jar.apply_set_cookie(&value);
    }
    let session = app.session_in(&jar).unwrap();

    let account = app.get("/account", jar.to_cookie_header().as_deref()).await;
    assert_eq!(account.status(), StatusCode::OK);
    assert_eq!(app.platform.calls().await.verify, 1);
    assert!(session.access_token.expose_secret().starts_with("mem-at-"));
}

#[tokio::test]
async fn test_replayed_link_fails() {
    let app = TestApp::new();
    let target = signup_link(&app).await;

    let first = app.get(&target, None).await;
    assert_see_other!(first, "/account");

    let replay = app.get(&target, None).await;
    assert_see_other!(replay, "/error");
    assert!(set_cookies(&replay).is_empty());
}

#[tokio::test]
async fn test_recovery_link_lands_on_account() {
    let app = TestApp::new();
    app.signed_in().await;
    app.post_form("/auth/recover", "email=ada%40example.com", None).await;

    let email = app.platform.last_email_to(EMAIL).await.unwrap();
    let target = link_target(&email.link);
    assert!(target.contains("type=recovery"));

    let response = app.get(&target, None).await;
    assert_see_other!(response, "/account");
}

#[tokio::test]
async fn test_missing_hash_fails_without_service_call() {
    let app = TestApp::new();
    let response = app.get("/auth/confirm?type=email&next=%2Faccount", None).await;
    assert_see_other!(response, "/error");
    assert!(set_cookies(&response).is_empty());
    assert_eq!(app.platform.calls().await.verify, 0);
}

#[tokio::test]
async fn test_unknown_hash_fails() {
    let app = TestApp::new();
    let response = app.get("/auth/confirm?token_hash=deadbeef&type=email", None).await;
    assert_see_other!(response, "/error");
    assert_eq!(app.platform.calls().await.verify, 1);
}

#[tokio::test]
async fn test_foreign_next_falls_back_to_account() {
    let app = TestApp::new();
    let target = signup_link(&app).await;
    let hijacked = format!("{}&next=https%3A%2F%2Fevil.example%2F", target.split("&next=").next().unwrap());

    let response = app.get(&hijacked, None).await;
    assert_see_other!(response, "/account");
}

#[tokio::test]
async fn test_error_page_carries_no_detail() {
    let app = TestApp::new();
    let response = app.get("/error", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = crate::common::body_text(response).await;
    assert!(!body.contains("token"));
}
