//! Browser agent against the server
//!
//! The agent absorbs the server's `Set-Cookie` headers and then calls the
//! platform directly with the same session.

use std::time::Duration;

use bytes::Bytes;

use account_portal::client::{AccountForm, BrowserAgent};
use account_portal::shared::CookieSet;

use crate::assert_see_other;
use crate::common::{jar_after, set_cookies, TestApp, EMAIL, PASSWORD};

fn agent_for(app: &TestApp) -> BrowserAgent {
    BrowserAgent::with_memory_platform(app.config.clone(), app.platform.clone())
}

#[tokio::test]
async fn test_agent_uses_session_from_server_login() {
    let app = TestApp::new();
    app.platform.create_user(EMAIL, PASSWORD).await;
    let response = app
        .post_form("/auth/login", "email=ada%40example.com&password=Passw0rd%21", None)
        .await;
    assert_see_other!(response, "/account");

    let mut agent = agent_for(&app);
    agent.absorb_set_cookies(set_cookies(&response));

    let principal = agent.current_principal().await.unwrap();
    assert_eq!(principal.email.as_deref(), Some(EMAIL));
}

#[tokio::test]
async fn test_agent_observes_interceptor_refresh() {
    let app = TestApp::new();
    let user_id = app.platform.create_user(EMAIL, PASSWORD).await;
    app.platform.set_session_lifetime(Duration::from_secs(30)).await;
    let stale = app.platform.issue_session(user_id).await;
    app.platform.set_session_lifetime(Duration::from_secs(3600)).await;

    let mut agent = agent_for(&app);
    let cookie = app.cookie_for(&stale);
    let response = app.get("/account", Some(&cookie)).await;
    let fresh = app.session_in(&jar_after(&CookieSet::parse(&cookie), &response)).unwrap();

    agent.absorb_set_cookies(set_cookies(&response));
    assert_eq!(agent.session(), Some(fresh));

    // The stale refresh token is spent; the agent must not need it.
    agent.current_principal().await.unwrap();
    assert_eq!(app.platform.calls().await.refresh, 1);
}

#[tokio::test]
async fn test_account_form_round_trip_with_server() {
    let app = TestApp::new();
    let session = app.signed_in().await;
    let cookie = app.cookie_for(&session);

    let mut agent = agent_for(&app);
    agent.absorb_set_cookies(
        cookie
            .split("; ")
            .map(|pair| format!("{}; Path=/", pair)),
    );

    let mut form = AccountForm::new();
    form.mount(&mut agent).await;
    form.upload(&mut agent, "portrait.JPG", Bytes::from_static(b"jpeg"), "image/jpeg")
        .await
        .unwrap();

    let paths = app.platform.object_paths().await;
    assert_eq!(paths.len(), 1);
    assert!(paths[0].starts_with(&format!("{}/", session.user_id)));
    assert!(paths[0].ends_with(".jpg"));

    let page = crate::common::body_text(app.get("/account", Some(&cookie)).await).await;
    assert!(page.contains(&paths[0]));
}
