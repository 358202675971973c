//! `ProfileStore` over the platform's `/rest/v1/profiles` table endpoint.
//!
//! Upserts are `POST`s with `Prefer: resolution=merge-duplicates`, keyed by
//! the primary key `id`, so repeating a save never adds a second row.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use uuid::Uuid;

use crate::services::error::ServiceError;
use crate::services::http::{error_from_response, PlatformClient};
use crate::services::profiles::ProfileStore;
use crate::shared::config::PlatformConfig;
use crate::shared::principal::Profile;

const PROFILES_PATH: &str = "/rest/v1/profiles";

fn row_error(status: StatusCode) -> Option<ServiceError> {
    match status {
        StatusCode::UNAUTHORIZED => Some(ServiceError::InvalidSession),
        _ => None,
    }
}

#[derive(Clone)]
pub struct HttpProfileStore {
    client: PlatformClient,
}

impl HttpProfileStore {
    pub fn new(config: Arc<PlatformConfig>) -> Result<Self, ServiceError> {
        Ok(Self {
            client: PlatformClient::new(config)?,
        })
    }

    pub fn from_client(client: PlatformClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProfileStore for HttpProfileStore {
    async fn get_profile(&self, access_token: &str, id: Uuid) -> Result<Option<Profile>, ServiceError> {
        let response = self
            .client
            .authorized(Method::GET, PROFILES_PATH, access_token)
            .query(&[("id", format!("eq.{}", id)), ("select", "*".to_string())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, row_error).await);
        }
        let rows: Vec<Profile> = response.json().await?;
        Ok(rows.into_iter().next())
    }

    async fn upsert_profile(&self, access_token: &str, profile: &Profile) -> Result<Profile, ServiceError> {
        let response = self
            .client
            .authorized(Method::POST, PROFILES_PATH, access_token)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(profile)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, row_error).await);
        }
        let rows: Vec<Profile> = response.json().await?;
        Ok(rows.into_iter().next().unwrap_or_else(|| profile.clone()))
    }
}
