//! Profile store seam.
//!
//! Profile rows are keyed by principal id and only written through an upsert,
//! so saving the same form twice leaves exactly one row holding the last write.

use async_trait::async_trait;
use uuid::Uuid;

use crate::services::error::ServiceError;
use crate::shared::principal::Profile;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the row for `id`; `Ok(None)` when the principal has none yet
    async fn get_profile(&self, access_token: &str, id: Uuid) -> Result<Option<Profile>, ServiceError>;

    /// Insert or replace the row keyed by `profile.id`, returning the stored row
    async fn upsert_profile(&self, access_token: &str, profile: &Profile) -> Result<Profile, ServiceError>;
}
