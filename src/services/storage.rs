/**
 * Content Store
 *
 * Opaque-path object storage grouped into logical buckets, plus the path
 * policy for user uploads.
 *
 * # Upload Paths
 *
 * `object_path` builds `<principal-id>/<random-uuid>.<ext>`:
 *
 * - the principal id prefix keeps each user's objects apart
 * - the random component makes two uploads in the same instant distinct
 *   (there is no lock; concurrent uploads simply never collide)
 * - only a sanitized extension survives from the original file name, so a
 *   crafted name cannot add path segments
 */

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use crate::services::error::ServiceError;

const MAX_EXTENSION_LEN: usize = 10;
const FALLBACK_EXTENSION: &str = "bin";

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn upload(
        &self,
        access_token: &str,
        bucket: &str,
        path: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), ServiceError>;

    async fn download(&self, access_token: &str, bucket: &str, path: &str) -> Result<Bytes, ServiceError>;
}

/// Lowercase extension of `file_name`, or `bin` when it has none usable
pub fn sanitized_extension(file_name: &str) -> String {
    let base = file_name.rsplit(&['/', '\\'][..]).next().unwrap_or(file_name);
    match base.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            ext.to_ascii_lowercase()
        }
        _ => FALLBACK_EXTENSION.to_string(),
    }
}

/// Storage path for a new upload by `principal_id`
pub fn object_path(principal_id: Uuid, file_name: &str) -> String {
    format!("{}/{}.{}", principal_id, Uuid::new_v4(), sanitized_extension(file_name))
}
