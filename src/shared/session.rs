/**
 * Session Tokens and their Cookie Encoding
 *
 * A `SessionToken` is the opaque credential pair issued by the authentication
 * platform. Nothing in this module validates a token: an access token is only
 * trusted after a round-trip to the platform (see `services::auth::revalidate`).
 * The expiry carried here is used as a hint for when to refresh.
 *
 * # Cookie Format
 *
 * The session is stored as `base64-<url-safe base64 of the JSON token>`. Values
 * longer than `CHUNK_SIZE` are split across `<name>.0`, `<name>.1`, ... since
 * browsers cap a single cookie at about 4 KB.
 */

use std::borrow::Cow;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::cookies::{Cookie, CookieOptions, CookieSet};
use crate::shared::error::SharedError;

/// Largest value written into a single session cookie
pub const CHUNK_SIZE: usize = 3180;

const VALUE_PREFIX: &str = "base64-";

/// Time-bounded credential pair identifying an authenticated principal.
///
/// Both tokens are secrets: `Debug` redacts them and they are only exposed
/// when written to the wire or into a cookie.
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Principal the platform issued this session for
    pub user_id: Uuid,
}

/// Cookie payload of a `SessionToken`
#[derive(Serialize, Deserialize)]
struct StoredSession<'a> {
    #[serde(borrow)]
    access_token: Cow<'a, str>,
    #[serde(borrow)]
    refresh_token: Cow<'a, str>,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    user_id: Uuid,
}

impl PartialEq for SessionToken {
    fn eq(&self, other: &Self) -> bool {
        self.user_id == other.user_id
            && self.issued_at == other.issued_at
            && self.expires_at == other.expires_at
            && self.access_token.expose_secret() == other.access_token.expose_secret()
            && self.refresh_token.expose_secret() == other.refresh_token.expose_secret()
    }
}

impl Eq for SessionToken {}

impl SessionToken {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        user_id: Uuid,
    ) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
            refresh_token: SecretString::new(refresh_token.into()),
            issued_at,
            expires_at,
            user_id,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// True when the token is expired or expires within `margin` of `now`
    pub fn expires_within(&self, margin: std::time::Duration, now: DateTime<Utc>) -> bool {
        let margin = chrono::Duration::from_std(margin).unwrap_or_else(|_| chrono::Duration::zero());
        self.expires_at - now <= margin
    }

    /// Encode as a cookie value
    pub fn encode(&self) -> Result<String, SharedError> {
        let stored = StoredSession {
            access_token: Cow::Borrowed(self.access_token.expose_secret()),
            refresh_token: Cow::Borrowed(self.refresh_token.expose_secret()),
            issued_at: self.issued_at,
            expires_at: self.expires_at,
            user_id: self.user_id,
        };
        let json = serde_json::to_vec(&stored)?;
        Ok(format!("{}{}", VALUE_PREFIX, URL_SAFE_NO_PAD.encode(json)))
    }

    /// Decode a cookie value produced by [`SessionToken::encode`]
    pub fn decode(value: &str) -> Result<Self, SharedError> {
        let encoded = value
            .strip_prefix(VALUE_PREFIX)
            .ok_or_else(|| SharedError::session_decode("missing base64- prefix"))?;
        let json = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| SharedError::session_decode(format!("invalid base64: {}", e)))?;
        let stored: StoredSession<'_> = serde_json::from_slice(&json)
            .map_err(|e| SharedError::session_decode(format!("invalid session JSON: {}", e)))?;
        Ok(Self::new(
            stored.access_token.into_owned(),
            stored.refresh_token.into_owned(),
            stored.issued_at,
            stored.expires_at,
            stored.user_id,
        ))
    }
}

fn chunk_name(name: &str, index: usize) -> String {
    format!("{}.{}", name, index)
}

/// Names of every live cookie that belongs to the session called `name`
fn existing_session_names(cookies: &CookieSet, name: &str) -> Vec<String> {
    let chunk_prefix = format!("{}.", name);
    let mut names = cookies
        .live_names_with_prefix(&chunk_prefix)
        .filter(|candidate| {
            candidate[chunk_prefix.len()..]
                .chars()
                .all(|c| c.is_ascii_digit())
        })
        .map(str::to_string)
        .collect::<Vec<_>>();
    if cookies.contains(name) {
        names.push(name.to_string());
    }
    names
}

/// Read the session stored under `name`, reassembling chunks when needed.
///
/// Returns `None` when no session cookie is present and `Some(Err(_))` when one is
/// present but cannot be decoded.
pub fn read_session(cookies: &CookieSet, name: &str) -> Option<Result<SessionToken, SharedError>> {
    if let Some(value) = cookies.value(name) {
        return Some(SessionToken::decode(value));
    }

    let mut combined = String::new();
    let mut index = 0;
    while let Some(chunk) = cookies.value(&chunk_name(name, index)) {
        combined.push_str(chunk);
        index += 1;
    }

    if index == 0 {
        None
    } else {
        Some(SessionToken::decode(&combined))
    }
}

/// Cookies that store `token` under `name`, including tombstones for any stale
/// chunk or unchunked variant currently present in `existing`
pub fn session_cookies(
    name: &str,
    token: &SessionToken,
    options: &CookieOptions,
    existing: &CookieSet,
) -> Result<Vec<Cookie>, SharedError> {
    let encoded = token.encode()?;

    let mut cookies = if encoded.len() <= CHUNK_SIZE {
        vec![Cookie::new(name, encoded, options.clone())]
    } else {
        // The encoding is ASCII, so byte offsets are char boundaries.
        encoded
            .as_bytes()
            .chunks(CHUNK_SIZE)
            .enumerate()
            .map(|(index, chunk)| {
                Cookie::new(
                    chunk_name(name, index),
                    String::from_utf8_lossy(chunk).into_owned(),
                    options.clone(),
                )
            })
            .collect::<Vec<_>>()
    };

    let written = cookies.iter().map(|c| c.name.clone()).collect::<Vec<_>>();
    for stale in existing_session_names(existing, name) {
        if !written.contains(&stale) {
            cookies.push(Cookie::tombstone(stale, options));
        }
    }

    Ok(cookies)
}

/// Tombstones for every variant of the session called `name`.
///
/// The unchunked name is always included so a browser holding a cookie the
/// server never saw still drops it.
pub fn expired_session_cookies(name: &str, options: &CookieOptions, existing: &CookieSet) -> Vec<Cookie> {
    let mut names = existing_session_names(existing, name);
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
    names
        .into_iter()
        .map(|n| Cookie::tombstone(n, options))
        .collect()
}
