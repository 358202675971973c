/**
 * Session Cookies on Responses
 *
 * Handlers that create or end a session write the cookies here. Stale chunk
 * variants present on the request are always expired alongside.
 */

use axum::http::{header::SET_COOKIE, HeaderMap, HeaderValue};

use crate::shared::config::PlatformConfig;
use crate::shared::cookies::{Cookie, CookieSet};
use crate::shared::session::{expired_session_cookies, session_cookies, SessionToken};
use crate::shared::SharedError;

fn append(headers: &mut HeaderMap, cookies: Vec<Cookie>) {
    for cookie in cookies {
        match HeaderValue::from_str(&cookie.to_set_cookie()) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Invalid Set-Cookie for '{}': {}", cookie.name, e),
        }
    }
}

/// `Set-Cookie` headers storing `token` as the session
pub fn store_session(
    config: &PlatformConfig,
    token: &SessionToken,
    request_cookies: &CookieSet,
) -> Result<HeaderMap, SharedError> {
    let mut headers = HeaderMap::new();
    append(
        &mut headers,
        session_cookies(&config.session_cookie, token, &config.cookie_options, request_cookies)?,
    );
    Ok(headers)
}

/// `Set-Cookie` headers expiring every variant of the session cookie
pub fn clear_session(config: &PlatformConfig, request_cookies: &CookieSet) -> HeaderMap {
    let mut headers = HeaderMap::new();
    append(
        &mut headers,
        expired_session_cookies(&config.session_cookie, &config.cookie_options, request_cookies),
    );
    headers
}
