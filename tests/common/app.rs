//! In-process application helpers
//!
//! `TestApp` wraps the real router over a `MemoryPlatform` and sends requests
//! through it with `tower::ServiceExt::oneshot`, so no socket is opened.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;

use account_portal::backend::{create_router, AppState};
use account_portal::services::MemoryPlatform;
use account_portal::shared::session::{read_session, session_cookies};
use account_portal::shared::{CookieSet, PlatformConfig, SessionToken};

pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "Passw0rd!";
pub const SITE_URL: &str = "http://localhost:3000";

pub fn test_config() -> PlatformConfig {
    PlatformConfig::builder()
        .api_url("http://127.0.0.1:54321")
        .anon_key("test-anon-key")
        .site_url(SITE_URL)
        .build()
        .unwrap()
}

pub struct TestApp {
    pub platform: Arc<MemoryPlatform>,
    pub config: Arc<PlatformConfig>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let platform = Arc::new(MemoryPlatform::new(SITE_URL));
        let state = AppState::with_memory_platform(test_config(), platform.clone());
        let config = state.config.clone();
        Self {
            platform,
            config,
            router: create_router(state),
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::get(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, form: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(form.to_string())).unwrap()).await
    }

    /// A confirmed user with a live session
    pub async fn signed_in(&self) -> SessionToken {
        let user_id = self.platform.create_user(EMAIL, PASSWORD).await;
        self.platform.issue_session(user_id).await
    }

    /// `Cookie` header carrying `token`
    pub fn cookie_for(&self, token: &SessionToken) -> String {
        let mut jar = CookieSet::new();
        for cookie in session_cookies(
            &self.config.session_cookie,
            token,
            &self.config.cookie_options,
            &CookieSet::new(),
        )
        .unwrap()
        {
            jar.apply(cookie);
        }
        jar.to_cookie_header().unwrap()
    }

    /// Session found in `jar`, if any
    pub fn session_in(&self, jar: &CookieSet) -> Option<SessionToken> {
        read_session(jar, &self.config.session_cookie).and_then(Result::ok)
    }
}

pub fn location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// What a browser jar holds after applying the response's `Set-Cookie` headers
pub fn jar_after(start: &CookieSet, response: &Response) -> CookieSet {
    let mut jar = start.clone();
    for value in set_cookies(response) {
        jar.apply_set_cookie(&value);
    }
    jar
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Path and query of an emailed link, ready to be requested against the router
pub fn link_target(link: &str) -> String {
    let url = url::Url::parse(link).unwrap();
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}
