/**
 * HTTP Authentication Client
 *
 * Implements `AuthService` against the platform's `/auth/v1` endpoints.
 *
 * # Endpoints
 *
 * - `POST /auth/v1/token?grant_type=password` - sign in
 * - `POST /auth/v1/token?grant_type=refresh_token` - refresh
 * - `POST /auth/v1/signup?redirect_to=...` - sign up
 * - `POST /auth/v1/logout` - sign out (bearer)
 * - `GET /auth/v1/user` - revalidate (bearer)
 * - `POST /auth/v1/verify` - token-hash exchange
 * - `POST /auth/v1/recover?redirect_to=...` - password recovery email
 */

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::services::auth::{AuthService, Credentials, OtpType, SignUpOutcome};
use crate::services::error::ServiceError;
use crate::services::http::{error_from_response, PlatformClient};
use crate::shared::config::PlatformConfig;
use crate::shared::principal::Principal;
use crate::shared::session::SessionToken;

#[derive(Debug, Deserialize)]
struct UserBody {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

impl From<UserBody> for Principal {
    fn from(user: UserBody) -> Self {
        Principal {
            id: user.id,
            email: user.email,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SessionBody {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserBody,
}

impl SessionBody {
    fn into_session(self, now: DateTime<Utc>) -> Result<SessionToken, ServiceError> {
        let expires_at = match self.expires_at.and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)) {
            Some(expires_at) => expires_at,
            None => TimeDelta::try_seconds(self.expires_in)
                .and_then(|lifetime| now.checked_add_signed(lifetime))
                .ok_or_else(|| ServiceError::Decode(format!("expires_in out of range: {}", self.expires_in)))?,
        };
        Ok(SessionToken::new(
            self.access_token,
            self.refresh_token,
            now,
            expires_at,
            self.user.id,
        ))
    }
}

/// `AuthService` backed by the platform's REST API
#[derive(Clone)]
pub struct HttpAuthService {
    client: PlatformClient,
}

impl HttpAuthService {
    pub fn new(config: Arc<PlatformConfig>) -> Result<Self, ServiceError> {
        Ok(Self {
            client: PlatformClient::new(config)?,
        })
    }

    pub fn from_client(client: PlatformClient) -> Self {
        Self { client }
    }

    async fn session_from(response: reqwest::Response) -> Result<SessionToken, ServiceError> {
        let body: SessionBody = response.json().await?;
        body.into_session(Utc::now())
    }
}

#[async_trait]
impl AuthService for HttpAuthService {
    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<SessionToken, ServiceError> {
        let response = self
            .client
            .request(Method::POST, "/auth/v1/token")
            .query(&[("grant_type", "password")])
            .json(&credentials.to_json())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, |status| match status {
                StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => Some(ServiceError::InvalidCredentials),
                _ => None,
            })
            .await);
        }
        Self::session_from(response).await
    }

    async fn sign_up(
        &self,
        credentials: &Credentials,
        email_redirect_to: &str,
    ) -> Result<SignUpOutcome, ServiceError> {
        let response = self
            .client
            .request(Method::POST, "/auth/v1/signup")
            .query(&[("redirect_to", email_redirect_to)])
            .json(&credentials.to_json())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, |_| None).await);
        }

        // Auto-confirmed projects answer with a session, others with the bare user.
        let body: serde_json::Value = response.json().await?;
        if body.get("access_token").is_some() {
            let session: SessionBody =
                serde_json::from_value(body).map_err(|e| ServiceError::Decode(e.to_string()))?;
            Ok(SignUpOutcome::SessionIssued(session.into_session(Utc::now())?))
        } else {
            let user: UserBody = serde_json::from_value(body.get("user").cloned().unwrap_or(body))
                .map_err(|e| ServiceError::Decode(e.to_string()))?;
            Ok(SignUpOutcome::ConfirmationSent { user_id: user.id })
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ServiceError> {
        let response = self
            .client
            .authorized(Method::POST, "/auth/v1/logout", access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, |status| match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Some(ServiceError::InvalidSession),
                _ => None,
            })
            .await);
        }
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<Principal, ServiceError> {
        let response = self
            .client
            .authorized(Method::GET, "/auth/v1/user", access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, |status| match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Some(ServiceError::InvalidSession),
                _ => None,
            })
            .await);
        }
        let user: UserBody = response.json().await?;
        Ok(user.into())
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<SessionToken, ServiceError> {
        let response = self
            .client
            .request(Method::POST, "/auth/v1/token")
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, |status| match status {
                StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    Some(ServiceError::InvalidSession)
                }
                _ => None,
            })
            .await);
        }
        Self::session_from(response).await
    }

    async fn verify_token_hash(&self, token_hash: &str, kind: OtpType) -> Result<SessionToken, ServiceError> {
        let response = self
            .client
            .request(Method::POST, "/auth/v1/verify")
            .json(&json!({ "type": kind, "token_hash": token_hash }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, |status| {
                status.is_client_error().then_some(ServiceError::InvalidOneTimeToken)
            })
            .await);
        }
        Self::session_from(response).await
    }

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> Result<(), ServiceError> {
        let response = self
            .client
            .request(Method::POST, "/auth/v1/recover")
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({ "email": email }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, |_| None).await);
        }
        Ok(())
    }
}
