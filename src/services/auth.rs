/**
 * Authentication Service
 *
 * The `AuthService` trait is the seam between this crate and the hosted
 * authentication platform. The server-side components and the browser agent
 * only ever talk to the platform through it, which lets tests swap in
 * `MemoryPlatform` and production use `HttpAuthService`.
 *
 * # Revalidation
 *
 * `revalidate` is the only way to learn whether an access token is good. It
 * always performs a `get_user` round-trip and classifies the outcome into the
 * tri-state `RevalidationResult`. A cookie being present proves nothing.
 */

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::error::{with_timeout, ServiceError};
use crate::shared::principal::Principal;
use crate::shared::session::SessionToken;
use crate::shared::SharedError;

/// Email and password pair
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::new(password.into()),
        }
    }

    /// JSON body for the platform's password endpoints
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "email": self.email, "password": self.password.expose_secret() })
    }
}

/// Result of a sign-up call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The platform auto-confirmed the address and issued a session
    SessionIssued(SessionToken),
    /// A confirmation email was sent; no session until the link is followed
    ConfirmationSent { user_id: Uuid },
}

/// Kind of one-time token carried in an email link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OtpType {
    #[serde(rename = "signup")]
    Signup,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "recovery")]
    Recovery,
    #[serde(rename = "invite")]
    Invite,
    #[serde(rename = "magiclink")]
    MagicLink,
    #[serde(rename = "email_change")]
    EmailChange,
}

impl OtpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpType::Signup => "signup",
            OtpType::Email => "email",
            OtpType::Recovery => "recovery",
            OtpType::Invite => "invite",
            OtpType::MagicLink => "magiclink",
            OtpType::EmailChange => "email_change",
        }
    }
}

impl FromStr for OtpType {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signup" => Ok(OtpType::Signup),
            "email" => Ok(OtpType::Email),
            "recovery" => Ok(OtpType::Recovery),
            "invite" => Ok(OtpType::Invite),
            "magiclink" => Ok(OtpType::MagicLink),
            "email_change" => Ok(OtpType::EmailChange),
            other => Err(SharedError::validation("type", format!("unknown token type '{}'", other))),
        }
    }
}

impl fmt::Display for OtpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations consumed from the authentication platform
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<SessionToken, ServiceError>;

    /// Register a principal. `email_redirect_to` is where the confirmation link lands.
    async fn sign_up(
        &self,
        credentials: &Credentials,
        email_redirect_to: &str,
    ) -> Result<SignUpOutcome, ServiceError>;

    /// Revoke the session behind `access_token`
    async fn sign_out(&self, access_token: &str) -> Result<(), ServiceError>;

    /// Revalidating lookup of the principal behind `access_token`
    async fn get_user(&self, access_token: &str) -> Result<Principal, ServiceError>;

    /// Trade a refresh token for a new session. Refresh tokens are single use.
    async fn refresh_session(&self, refresh_token: &str) -> Result<SessionToken, ServiceError>;

    /// Exchange a one-time token hash from an email link for a live session
    async fn verify_token_hash(&self, token_hash: &str, kind: OtpType) -> Result<SessionToken, ServiceError>;

    /// Send a password-recovery email whose link lands on `redirect_to`
    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> Result<(), ServiceError>;
}

/// Outcome of checking a session against the authentication service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevalidationResult {
    Valid(Principal),
    Invalid,
    Unreachable,
}

impl RevalidationResult {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            RevalidationResult::Valid(principal) => Some(principal),
            _ => None,
        }
    }
}

impl From<Result<Principal, ServiceError>> for RevalidationResult {
    fn from(result: Result<Principal, ServiceError>) -> Self {
        match result {
            Ok(principal) => RevalidationResult::Valid(principal),
            Err(err) if err.is_unreachable() => RevalidationResult::Unreachable,
            // An unreadable answer cannot vouch for the token either way.
            Err(ServiceError::Decode(_)) => RevalidationResult::Unreachable,
            Err(_) => RevalidationResult::Invalid,
        }
    }
}

/// Check `access_token` with a bounded `get_user` round-trip
pub async fn revalidate(auth: &dyn AuthService, access_token: &str, limit: Duration) -> RevalidationResult {
    let result = with_timeout(limit, auth.get_user(access_token)).await;
    if let Err(err) = &result {
        tracing::debug!("Revalidation failed: {}", err);
    }
    result.into()
}

/// Default confirmation link, landing on the token-hash exchange route
pub const DEFAULT_EMAIL_LINK_TEMPLATE: &str =
    "{{ .SiteURL }}/auth/confirm?token_hash={{ .TokenHash }}&type={{ .Type }}&next={{ .RedirectTo }}";

/// Email link template with `{{ .SiteURL }}`, `{{ .TokenHash }}`, `{{ .Type }}`
/// and `{{ .RedirectTo }}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailLinkTemplate {
    template: String,
}

impl Default for EmailLinkTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_EMAIL_LINK_TEMPLATE)
    }
}

fn encode_component(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

impl EmailLinkTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Fill in the placeholders. Everything but the site URL is query-encoded.
    pub fn render(&self, site_url: &str, token_hash: &str, kind: OtpType, redirect_to: &str) -> String {
        self.template
            .replace("{{ .SiteURL }}", site_url.trim_end_matches('/'))
            .replace("{{ .TokenHash }}", &encode_component(token_hash))
            .replace("{{ .Type }}", kind.as_str())
            .replace("{{ .RedirectTo }}", &encode_component(redirect_to))
    }
}
