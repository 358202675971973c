//! `ContentStore` over `/storage/v1/object`.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};

use crate::services::error::ServiceError;
use crate::services::http::{error_from_response, PlatformClient};
use crate::services::storage::ContentStore;
use crate::shared::config::PlatformConfig;

fn object_error(status: StatusCode) -> Option<ServiceError> {
    match status {
        StatusCode::UNAUTHORIZED => Some(ServiceError::InvalidSession),
        _ => None,
    }
}

#[derive(Clone)]
pub struct HttpContentStore {
    client: PlatformClient,
}

impl HttpContentStore {
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
impl ContentStore for HttpContentStore {
    async fn upload(
        &self,
        access_token: &str,
        bucket: &str,
        path: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), ServiceError> {
        let endpoint = format!("/storage/v1/object/{}/{}", bucket, path);
        let response = self
            .client
            .authorized(Method::POST, &endpoint, access_token)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, object_error).await);
        }
        tracing::debug!("Stored object {}/{}", bucket, path);
        Ok(())
    }

    async fn download(&self, access_token: &str, bucket: &str, path: &str) -> Result<Bytes, ServiceError> {
        let endpoint = format!("/storage/v1/object/authenticated/{}/{}", bucket, path);
        let response = self
            .client
            .authorized(Method::GET, &endpoint, access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, object_error).await);
        }
        Ok(response.bytes().await?)
    }
}
