/**
 * Browser Agent
 *
 * The session handle the browser uses for interactive calls after the first
 * page load. It owns the browser's cookie jar and talks to the platform
 * directly through the same service seams the server uses.
 *
 * # Session Handling
 *
 * - The session is read from the cookie jar on every call; nothing about the
 *   principal is held between calls.
 * - `Set-Cookie` headers from the server are fed in through
 *   `absorb_set_cookies`, so a refresh done by the session interceptor is
 *   picked up before the next call.
 * - A token close to expiry is refreshed here the same way the interceptor
 *   does it, and the new token replaces the old one in the jar.
 * - `sign_out` always clears the jar, even when the service call fails.
 */

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use secrecy::ExposeSecret;
use thiserror::Error;
use uuid::Uuid;

use crate::services::{
    object_path, with_timeout, AuthService, ContentStore, Credentials, HttpAuthService, HttpContentStore,
    HttpProfileStore, MemoryPlatform, OtpType, PlatformClient, ProfileStore, ServiceError, SignUpOutcome,
};
use crate::shared::config::PlatformConfig;
use crate::shared::cookies::CookieSet;
use crate::shared::principal::{Principal, Profile, ProfileUpdate};
use crate::shared::session::{expired_session_cookies, read_session, session_cookies, SessionToken};
use crate::shared::SharedError;

/// Where confirmation and recovery links send the browser after the exchange
const ACCOUNT_PATH: &str = "/account";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// No session cookie, or one that could not be read
    #[error("not signed in")]
    NoSession,

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Shared(#[from] SharedError),
}

/// Result of a sign-up from the browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpResult {
    SignedIn { user_id: Uuid },
    /// The principal exists but has to follow the emailed link first
    ConfirmationSent { user_id: Uuid },
}

/// Location of an uploaded object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub bucket: String,
    pub path: String,
}

pub struct BrowserAgent {
    cookies: CookieSet,
    config: Arc<PlatformConfig>,
    auth: Arc<dyn AuthService>,
    profiles: Arc<dyn ProfileStore>,
    content: Arc<dyn ContentStore>,
}

impl BrowserAgent {
    pub fn new(
        config: Arc<PlatformConfig>,
        auth: Arc<dyn AuthService>,
        profiles: Arc<dyn ProfileStore>,
        content: Arc<dyn ContentStore>,
    ) -> Self {
        Self {
            cookies: CookieSet::new(),
            config,
            auth,
            profiles,
            content,
        }
    }

    /// Agent talking to the hosted platform over HTTP
    pub fn with_http_platform(config: Arc<PlatformConfig>) -> Result<Self, ServiceError> {
        let client = PlatformClient::new(config.clone())?;
        Ok(Self::new(
            config,
            Arc::new(HttpAuthService::from_client(client.clone())),
            Arc::new(HttpProfileStore::from_client(client.clone())),
            Arc::new(HttpContentStore::from_client(client)),
        ))
    }

    /// Agent sharing one in-process platform for every seam
    pub fn with_memory_platform(config: Arc<PlatformConfig>, platform: Arc<MemoryPlatform>) -> Self {
        Self::new(config, platform.clone(), platform.clone(), platform)
    }

    pub fn cookies(&self) -> &CookieSet {
        &self.cookies
    }

    /// `Cookie` header the browser would attach to its next request
    pub fn cookie_header(&self) -> Option<String> {
        self.cookies.to_cookie_header()
    }

    /// Session currently held in the jar, if it decodes
    pub fn session(&self) -> Option<SessionToken> {
        read_session(&self.cookies, &self.config.session_cookie).and_then(Result::ok)
    }

    /// Apply `Set-Cookie` header values received from the server
    pub fn absorb_set_cookies<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for value in values {
            self.cookies.apply_set_cookie(value.as_ref());
        }
    }

    fn store_session(&mut self, token: &SessionToken) -> Result<(), SharedError> {
        let cookies = session_cookies(
            &self.config.session_cookie,
            token,
            &self.config.cookie_options,
            &self.cookies,
        )?;
        for cookie in cookies {
            self.cookies.apply(cookie);
        }
        Ok(())
    }

    fn clear_session(&mut self) {
        let tombstones = expired_session_cookies(
            &self.config.session_cookie,
            &self.config.cookie_options,
            &self.cookies,
        );
        for cookie in tombstones {
            self.cookies.apply(cookie);
        }
    }

    /// Session to use for the next call, refreshed when it is about to expire
    async fn active_session(&mut self) -> Result<SessionToken, AgentError> {
        let token = match read_session(&self.cookies, &self.config.session_cookie) {
            None => return Err(AgentError::NoSession),
            Some(Err(e)) => {
                tracing::debug!("Dropping unreadable session cookie: {}", e);
                self.clear_session();
                return Err(AgentError::NoSession);
            }
            Some(Ok(token)) => token,
        };

        let now = Utc::now();
        if !token.expires_within(self.config.refresh_margin, now) {
            return Ok(token);
        }

        let refreshed = with_timeout(
            self.config.revalidate_timeout,
            self.auth.refresh_session(token.refresh_token.expose_secret()),
        )
        .await;
        match refreshed {
            Ok(fresh) => {
                self.store_session(&fresh)?;
                Ok(fresh)
            }
            // Still usable for now; try again on the next call.
            Err(e) if e.is_unreachable() && !token.is_expired(now) => Ok(token),
            Err(ServiceError::InvalidSession) => {
                self.clear_session();
                Err(ServiceError::InvalidSession.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<Uuid, AgentError> {
        let credentials = Credentials::new(email.trim(), password);
        let token = with_timeout(
            self.config.revalidate_timeout,
            self.auth.sign_in_with_password(&credentials),
        )
        .await?;
        self.store_session(&token)?;
        tracing::debug!("Signed in as {}", token.user_id);
        Ok(token.user_id)
    }

    pub async fn sign_up(&mut self, email: &str, password: &str) -> Result<SignUpResult, AgentError> {
        let credentials = Credentials::new(email.trim(), password);
        let outcome = with_timeout(
            self.config.revalidate_timeout,
            self.auth.sign_up(&credentials, ACCOUNT_PATH),
        )
        .await?;
        match outcome {
            SignUpOutcome::SessionIssued(token) => {
                self.store_session(&token)?;
                Ok(SignUpResult::SignedIn { user_id: token.user_id })
            }
            SignUpOutcome::ConfirmationSent { user_id } => Ok(SignUpResult::ConfirmationSent { user_id }),
        }
    }

    /// Revoke the session and clear the jar. The jar is cleared even when
    /// the platform call fails; the failure is still reported.
    pub async fn sign_out(&mut self) -> Result<(), AgentError> {
        let session = self.session();
        self.clear_session();

        let Some(session) = session else {
            return Ok(());
        };
        with_timeout(self.config.revalidate_timeout, self.auth.sign_out(session.access_token.expose_secret()))
            .await
            .map_err(|e| {
                tracing::warn!("Sign-out call failed, session cleared locally: {}", e);
                AgentError::from(e)
            })
    }

    /// Trade the one-time hash from an email link for a session
    pub async fn exchange_token_hash(&mut self, token_hash: &str, kind: OtpType) -> Result<Uuid, AgentError> {
        let token = with_timeout(
            self.config.revalidate_timeout,
            self.auth.verify_token_hash(token_hash, kind),
        )
        .await?;
        self.store_session(&token)?;
        Ok(token.user_id)
    }

    /// Revalidating lookup of the signed-in principal
    pub async fn current_principal(&mut self) -> Result<Principal, AgentError> {
        let session = self.active_session().await?;
        match with_timeout(self.config.revalidate_timeout, self.auth.get_user(session.access_token.expose_secret())).await {
            Ok(principal) => Ok(principal),
            Err(ServiceError::InvalidSession) => {
                self.clear_session();
                Err(ServiceError::InvalidSession.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Profile row of `principal`, empty when none has been saved yet
    pub async fn load_profile(&mut self, principal: &Principal) -> Result<Profile, AgentError> {
        let session = self.active_session().await?;
        let row = with_timeout(
            self.config.revalidate_timeout,
            self.profiles.get_profile(session.access_token.expose_secret(), principal.id),
        )
        .await?;
        Ok(row.unwrap_or_else(|| Profile::empty(principal.id)))
    }

    /// Validate `update` and upsert it as the row of `principal`.
    ///
    /// `principal` must come from [`BrowserAgent::current_principal`]; the user
    /// id carried in the cookie is never used to key a write.
    pub async fn upsert_profile(&mut self, principal: &Principal, update: ProfileUpdate) -> Result<Profile, AgentError> {
        let profile = update.into_profile(principal.id, Utc::now())?;
        let session = self.active_session().await?;
        let stored = with_timeout(
            self.config.revalidate_timeout,
            self.profiles.upsert_profile(session.access_token.expose_secret(), &profile),
        )
        .await?;
        Ok(stored)
    }

    /// Upload an avatar under a fresh path in the folder of `principal`
    pub async fn upload_avatar(
        &mut self,
        principal: &Principal,
        file_name: &str,
        body: impl Into<Bytes>,
        content_type: &str,
    ) -> Result<UploadResult, AgentError> {
        let session = self.active_session().await?;
        let path = object_path(principal.id, file_name);
        let bucket = self.config.avatar_bucket.clone();
        self.content
            .upload(session.access_token.expose_secret(), &bucket, &path, body.into(), content_type)
            .await?;
        tracing::debug!("Uploaded avatar to {}/{}", bucket, path);
        Ok(UploadResult { bucket, path })
    }

    pub async fn download_avatar(&mut self, path: &str) -> Result<Bytes, AgentError> {
        let session = self.active_session().await?;
        let bytes = self
            .content
            .download(session.access_token.expose_secret(), &self.config.avatar_bucket, path)
            .await?;
        Ok(bytes)
    }
}
