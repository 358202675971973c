/**
 * In-Memory Platform
 *
 * `MemoryPlatform` implements `AuthService`, `ProfileStore` and `ContentStore`
 * in-process. Integration tests drive the router against it and the server
 * binary falls back to it when no platform URL is configured.
 *
 * It keeps the platform behaviours the session flow depends on:
 *
 * - token hashes are single use and expire after an hour
 * - refresh tokens rotate; presenting one twice fails
 * - access tokens expire after the configured session lifetime
 * - expired tokens and hashes are pruned whenever new ones are issued, and the
 *   outbox only keeps the latest `OUTBOX_CAPACITY` emails
 * - sign-up either auto-confirms or sends a confirmation email to the outbox
 * - profile rows and objects are only reachable by their owner
 *
 * Test hooks: `set_unreachable` fails every call as a network error would,
 * `set_latency` delays every answer and `calls` counts round-trips per
 * operation.
 *
 * Tokens are random opaque identifiers. Nothing here is signed.
 */

use std::collections::HashMap;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::services::auth::{AuthService, Credentials, EmailLinkTemplate, OtpType, SignUpOutcome};
use crate::services::error::ServiceError;
use crate::services::profiles::ProfileStore;
use crate::services::storage::ContentStore;
use crate::shared::config::DEFAULT_SITE_URL;
use crate::shared::principal::{Principal, Profile};
use crate::shared::session::SessionToken;

const DEFAULT_SESSION_LIFETIME_SECS: i64 = 3600;
const TOKEN_HASH_LIFETIME_SECS: i64 = 3600;
const REFRESH_TOKEN_LIFETIME_SECS: i64 = 7 * 24 * 3600;

/// Emails kept for inspection; older ones are dropped
pub const OUTBOX_CAPACITY: usize = 256;

/// Email captured instead of being delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub to: String,
    pub kind: OtpType,
    pub token_hash: String,
    pub link: String,
}

/// Round-trips seen per operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub sign_in: usize,
    pub sign_up: usize,
    pub sign_out: usize,
    pub get_user: usize,
    pub refresh: usize,
    pub verify: usize,
    pub recover: usize,
    pub get_profile: usize,
    pub upsert_profile: usize,
    pub upload: usize,
    pub download: usize,
}

#[derive(Debug, Clone)]
struct UserRecord {
    id: Uuid,
    email: String,
    password: String,
    confirmed: bool,
}

#[derive(Debug, Clone)]
struct AccessRecord {
    user_id: Uuid,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct RefreshRecord {
    user_id: Uuid,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct PendingHash {
    user_id: Uuid,
    kind: OtpType,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredObject {
    body: Bytes,
    content_type: String,
}

struct PlatformState {
    users: HashMap<String, UserRecord>,
    access_tokens: HashMap<String, AccessRecord>,
    refresh_tokens: HashMap<String, RefreshRecord>,
    token_hashes: HashMap<String, PendingHash>,
    outbox: Vec<SentEmail>,
    profiles: HashMap<Uuid, Profile>,
    objects: HashMap<(String, String), StoredObject>,
    session_lifetime: Duration,
    auto_confirm: bool,
    unreachable: bool,
    latency: Option<StdDuration>,
    calls: CallCounts,
}

impl PlatformState {
    /// Drop every token and hash that can no longer be presented
    fn prune(&mut self, now: DateTime<Utc>) {
        self.access_tokens.retain(|_, record| record.expires_at > now);
        self.refresh_tokens.retain(|_, record| record.expires_at > now);
        self.token_hashes.retain(|_, pending| pending.expires_at > now);
    }

    fn issue_session(&mut self, user_id: Uuid) -> SessionToken {
        let now = Utc::now();
        self.prune(now);
        let expires_at = now + self.session_lifetime;
        let access_token = format!("mem-at-{}", Uuid::new_v4().simple());
        let refresh_token = format!("mem-rt-{}", Uuid::new_v4().simple());

        self.access_tokens.insert(
            access_token.clone(),
            AccessRecord { user_id, expires_at },
        );
        self.refresh_tokens.insert(
            refresh_token.clone(),
            RefreshRecord {
                user_id,
                expires_at: now + Duration::seconds(REFRESH_TOKEN_LIFETIME_SECS),
            },
        );

        SessionToken {
            access_token: SecretString::new(access_token),
            refresh_token: SecretString::new(refresh_token),
            issued_at: now,
            expires_at,
            user_id,
        }
    }

    fn issue_token_hash(&mut self, user_id: Uuid, kind: OtpType) -> String {
        let now = Utc::now();
        self.prune(now);
        let token_hash = Uuid::new_v4().simple().to_string();
        self.token_hashes.insert(
            token_hash.clone(),
            PendingHash {
                user_id,
                kind,
                expires_at: now + Duration::seconds(TOKEN_HASH_LIFETIME_SECS),
            },
        );
        token_hash
    }

    fn principal_for(&self, access_token: &str) -> Result<Principal, ServiceError> {
        let record = self
            .access_tokens
            .get(access_token)
            .filter(|record| record.expires_at > Utc::now())
            .ok_or(ServiceError::InvalidSession)?;
        let email = self
            .users
            .values()
            .find(|user| user.id == record.user_id)
            .map(|user| user.email.clone());
        Ok(Principal {
            id: record.user_id,
            email,
        })
    }

    fn user_by_id(&self, id: Uuid) -> Option<&UserRecord> {
        self.users.values().find(|user| user.id == id)
    }
}

/// In-process stand-in for the hosted platform
pub struct MemoryPlatform {
    state: Mutex<PlatformState>,
    site_url: String,
    link_template: EmailLinkTemplate,
}

impl Default for MemoryPlatform {
    fn default() -> Self {
        Self::new(DEFAULT_SITE_URL)
    }
}

fn email_key(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

impl MemoryPlatform {
    /// Platform whose email links point at `site_url`
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(PlatformState {
                users: HashMap::new(),
                access_tokens: HashMap::new(),
                refresh_tokens: HashMap::new(),
                token_hashes: HashMap::new(),
                outbox: Vec::new(),
                profiles: HashMap::new(),
                objects: HashMap::new(),
                session_lifetime: Duration::seconds(DEFAULT_SESSION_LIFETIME_SECS),
                auto_confirm: false,
                unreachable: false,
                latency: None,
                calls: CallCounts::default(),
            }),
            site_url: site_url.into(),
            link_template: EmailLinkTemplate::default(),
        }
    }

    pub fn with_link_template(mut self, template: EmailLinkTemplate) -> Self {
        self.link_template = template;
        self
    }

    /// Register a confirmed user directly, bypassing the email round-trip
    pub async fn create_user(&self, email: &str, password: &str) -> Uuid {
        let mut state = self.state.lock().await;
        let id = Uuid::new_v4();
        state.users.insert(
            email_key(email),
            UserRecord {
                id,
                email: email.trim().to_string(),
                password: password.to_string(),
                confirmed: true,
            },
        );
        id
    }

    /// Issue a session for an existing user without a sign-in call
    pub async fn issue_session(&self, user_id: Uuid) -> SessionToken {
        self.state.lock().await.issue_session(user_id)
    }

    /// Invalidate an access token as a server-side revocation would
    pub async fn revoke_access_token(&self, access_token: &str) {
        self.state.lock().await.access_tokens.remove(access_token);
    }

    pub async fn set_session_lifetime(&self, lifetime: StdDuration) {
        let lifetime = Duration::from_std(lifetime).unwrap_or(Duration::seconds(DEFAULT_SESSION_LIFETIME_SECS));
        self.state.lock().await.session_lifetime = lifetime;
    }

    pub async fn set_auto_confirm(&self, auto_confirm: bool) {
        self.state.lock().await.auto_confirm = auto_confirm;
    }

    /// Fail every call with `ServiceError::Unreachable` while set
    pub async fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().await.unreachable = unreachable;
    }

    /// Delay every answer by `latency`
    pub async fn set_latency(&self, latency: Option<StdDuration>) {
        self.state.lock().await.latency = latency;
    }

    pub async fn calls(&self) -> CallCounts {
        self.state.lock().await.calls
    }

    pub async fn outbox(&self) -> Vec<SentEmail> {
        self.state.lock().await.outbox.clone()
    }

    /// Most recent email sent to `email`
    pub async fn last_email_to(&self, email: &str) -> Option<SentEmail> {
        let key = email_key(email);
        self.state
            .lock()
            .await
            .outbox
            .iter()
            .rev()
            .find(|sent| email_key(&sent.to) == key)
            .cloned()
    }

    pub async fn profile_count(&self) -> usize {
        self.state.lock().await.profiles.len()
    }

    pub async fn object_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .state
            .lock()
            .await
            .objects
            .keys()
            .map(|(_, path)| path.clone())
            .collect();
        paths.sort();
        paths
    }

    pub async fn object_content_type(&self, bucket: &str, path: &str) -> Option<String> {
        self.state
            .lock()
            .await
            .objects
            .get(&(bucket.to_string(), path.to_string()))
            .map(|object| object.content_type.clone())
    }

    /// Run the shared preamble of every call: count it, apply latency and the
    /// fault switch, then hand over the locked state.
    async fn enter<F>(&self, count: F) -> Result<tokio::sync::MutexGuard<'_, PlatformState>, ServiceError>
    where
        F: FnOnce(&mut CallCounts),
    {
        let latency = {
            let mut state = self.state.lock().await;
            count(&mut state.calls);
            state.latency
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let state = self.state.lock().await;
        if state.unreachable {
            return Err(ServiceError::Unreachable("memory platform offline".to_string()));
        }
        Ok(state)
    }

    fn send_email(&self, state: &mut PlatformState, to: &str, user_id: Uuid, kind: OtpType, redirect_to: &str) {
        let token_hash = state.issue_token_hash(user_id, kind);
        let link = self
            .link_template
            .render(&self.site_url, &token_hash, kind, redirect_to);
        tracing::debug!("Queued {} email for user {}", kind, user_id);
        if state.outbox.len() >= OUTBOX_CAPACITY {
            let excess = state.outbox.len() + 1 - OUTBOX_CAPACITY;
            state.outbox.drain(..excess);
        }
        state.outbox.push(SentEmail {
            to: to.to_string(),
            kind,
            token_hash,
            link,
        });
    }
}

/// Sign-up confirmations may be presented as either `signup` or `email`
fn kinds_compatible(issued: OtpType, presented: OtpType) -> bool {
    issued == presented
        || matches!(
            (issued, presented),
            (OtpType::Signup, OtpType::Email) | (OtpType::Email, OtpType::Signup)
        )
}

#[async_trait]
impl AuthService for MemoryPlatform {
    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<SessionToken, ServiceError> {
        let mut state = self.enter(|calls| calls.sign_in += 1).await?;
        let user = state
            .users
            .get(&email_key(&credentials.email))
            .filter(|user| user.password == *credentials.password.expose_secret() && user.confirmed)
            .cloned()
            .ok_or(ServiceError::InvalidCredentials)?;
        Ok(state.issue_session(user.id))
    }

    async fn sign_up(
        &self,
        credentials: &Credentials,
        email_redirect_to: &str,
    ) -> Result<SignUpOutcome, ServiceError> {
        let mut state = self.enter(|calls| calls.sign_up += 1).await?;
        let key = email_key(&credentials.email);
        if state.users.contains_key(&key) {
            return Err(ServiceError::rejected(422, "User already registered"));
        }

        let id = Uuid::new_v4();
        let confirmed = state.auto_confirm;
        state.users.insert(
            key,
            UserRecord {
                id,
                email: credentials.email.trim().to_string(),
                password: credentials.password.expose_secret().clone(),
                confirmed,
            },
        );

        if confirmed {
            return Ok(SignUpOutcome::SessionIssued(state.issue_session(id)));
        }
        self.send_email(&mut state, &credentials.email, id, OtpType::Signup, email_redirect_to);
        Ok(SignUpOutcome::ConfirmationSent { user_id: id })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ServiceError> {
        let mut state = self.enter(|calls| calls.sign_out += 1).await?;
        let user_id = state.principal_for(access_token)?.id;
        state.access_tokens.retain(|_, record| record.user_id != user_id);
        state.refresh_tokens.retain(|_, record| record.user_id != user_id);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<Principal, ServiceError> {
        let state = self.enter(|calls| calls.get_user += 1).await?;
        state.principal_for(access_token)
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<SessionToken, ServiceError> {
        let mut state = self.enter(|calls| calls.refresh += 1).await?;
        let record = state
            .refresh_tokens
            .remove(refresh_token)
            .filter(|record| record.expires_at > Utc::now())
            .ok_or(ServiceError::InvalidSession)?;
        Ok(state.issue_session(record.user_id))
    }

    async fn verify_token_hash(&self, token_hash: &str, kind: OtpType) -> Result<SessionToken, ServiceError> {
        let mut state = self.enter(|calls| calls.verify += 1).await?;
        let pending = state
            .token_hashes
            .remove(token_hash)
            .ok_or(ServiceError::InvalidOneTimeToken)?;

        if pending.expires_at <= Utc::now() || !kinds_compatible(pending.kind, kind) {
            return Err(ServiceError::InvalidOneTimeToken);
        }

        if let Some(user) = state.users.values_mut().find(|user| user.id == pending.user_id) {
            user.confirmed = true;
        }
        Ok(state.issue_session(pending.user_id))
    }

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> Result<(), ServiceError> {
        let mut state = self.enter(|calls| calls.recover += 1).await?;
        let Some(user) = state.users.get(&email_key(email)).cloned() else {
            // Unknown addresses look the same as known ones from outside.
            return Ok(());
        };
        self.send_email(&mut state, &user.email, user.id, OtpType::Recovery, redirect_to);
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryPlatform {
    async fn get_profile(&self, access_token: &str, id: Uuid) -> Result<Option<Profile>, ServiceError> {
        let state = self.enter(|calls| calls.get_profile += 1).await?;
        let principal = state.principal_for(access_token)?;
        if principal.id != id {
            return Ok(None);
        }
        Ok(state.profiles.get(&id).cloned())
    }

    async fn upsert_profile(&self, access_token: &str, profile: &Profile) -> Result<Profile, ServiceError> {
        let mut state = self.enter(|calls| calls.upsert_profile += 1).await?;
        let principal = state.principal_for(access_token)?;
        if principal.id != profile.id || state.user_by_id(profile.id).is_none() {
            return Err(ServiceError::rejected(403, "row-level security violation"));
        }
        state.profiles.insert(profile.id, profile.clone());
        Ok(profile.clone())
    }
}

#[async_trait]
impl ContentStore for MemoryPlatform {
    async fn upload(
        &self,
        access_token: &str,
        bucket: &str,
        path: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), ServiceError> {
        let mut state = self.enter(|calls| calls.upload += 1).await?;
        let principal = state.principal_for(access_token)?;
        let owner = path.split('/').next().unwrap_or_default();
        if owner != principal.id.to_string() {
            return Err(ServiceError::rejected(403, "object path outside the caller's folder"));
        }

        let key = (bucket.to_string(), path.to_string());
        if state.objects.contains_key(&key) {
            return Err(ServiceError::rejected(409, "The resource already exists"));
        }
        state.objects.insert(
            key,
            StoredObject {
                body,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn download(&self, access_token: &str, bucket: &str, path: &str) -> Result<Bytes, ServiceError> {
        let state = self.enter(|calls| calls.download += 1).await?;
        state.principal_for(access_token)?;
        state
            .objects
            .get(&(bucket.to_string(), path.to_string()))
            .map(|object| object.body.clone())
            .ok_or_else(|| ServiceError::NotFound(format!("{}/{}", bucket, path)))
    }
}
