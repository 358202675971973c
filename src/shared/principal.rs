/**
 * Principal and Profile Types
 *
 * The principal is the authenticated user as reported by the authentication
 * platform. Profile fields live in a separate row keyed by the principal id and
 * are only ever written through an upsert.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Authenticated user as returned by a revalidating `get_user` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Profile row keyed by principal id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Empty profile for a principal that has no row yet
    pub fn empty(id: Uuid) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

/// Editable profile fields submitted from the account form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ProfileUpdate {
    /// Validate the update and turn it into the full row for `id`.
    ///
    /// Blank fields are stored as `None`. Usernames must be at least 3 characters
    /// and websites must be http(s) URLs.
    pub fn into_profile(self, id: Uuid, now: DateTime<Utc>) -> Result<Profile, SharedError> {
        let username = normalize(self.username);
        if let Some(username) = &username {
            if username.chars().count() < 3 {
                return Err(SharedError::validation(
                    "username",
                    "Username must be at least 3 characters",
                ));
            }
        }

        let website = normalize(self.website);
        if let Some(website) = &website {
            let parsed = url::Url::parse(website)
                .map_err(|_| SharedError::validation("website", "Website must be a valid URL"))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(SharedError::validation(
                    "website",
                    "Website must use http or https",
                ));
            }
        }

        Ok(Profile {
            id,
            full_name: normalize(self.full_name),
            username,
            website,
            avatar_url: normalize(self.avatar_url),
            updated_at: Some(now),
        })
    }
}
