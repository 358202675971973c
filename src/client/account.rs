//! Account form state.
//!
//! `AccountForm` is the state of one mounted account component. It is owned
//! by that component and thrown away with it; mounting again always starts
//! over from a fresh round-trip. Failures only ever end up in `notice`.

use bytes::Bytes;

use crate::client::agent::{AgentError, BrowserAgent, UploadResult};
use crate::client::notice::{Notice, PROFILE_UPDATED};
use crate::shared::principal::{Principal, Profile, ProfileUpdate};

#[derive(Debug, Clone, Default)]
pub struct AccountForm {
    pub loading: bool,
    pub principal: Option<Principal>,
    /// Last row read from or written to the profile store
    pub profile: Option<Profile>,
    /// Field values as currently edited
    pub fields: ProfileUpdate,
    /// Bytes of the current avatar, when one could be fetched
    pub avatar: Option<Bytes>,
    pub notice: Option<Notice>,
}

fn fields_of(profile: &Profile) -> ProfileUpdate {
    ProfileUpdate {
        full_name: profile.full_name.clone(),
        username: profile.username.clone(),
        website: profile.website.clone(),
        avatar_url: profile.avatar_url.clone(),
    }
}

impl AccountForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes need a principal the platform vouched for during `mount`
    fn mounted_principal(&mut self) -> Result<Principal, AgentError> {
        match &self.principal {
            Some(principal) => Ok(principal.clone()),
            None => {
                let err = AgentError::NoSession;
                self.fail(&err);
                Err(err)
            }
        }
    }

    fn fail(&mut self, err: &AgentError) {
        tracing::debug!("Account form action failed: {}", err);
        self.notice = Some(Notice::from(err));
        self.loading = false;
    }

    /// Load principal, profile and avatar from scratch
    pub async fn mount(&mut self, agent: &mut BrowserAgent) {
        *self = Self {
            loading: true,
            ..Self::default()
        };

        let principal = match agent.current_principal().await {
            Ok(principal) => principal,
            Err(e) => return self.fail(&e),
        };
        let profile = match agent.load_profile(&principal).await {
            Ok(profile) => profile,
            Err(e) => return self.fail(&e),
        };

        if let Some(path) = &profile.avatar_url {
            match agent.download_avatar(path).await {
                Ok(bytes) => self.avatar = Some(bytes),
                // A missing image leaves the placeholder in place.
                Err(e) => tracing::warn!("Error downloading avatar {}: {}", path, e),
            }
        }

        self.fields = fields_of(&profile);
        self.principal = Some(principal);
        self.profile = Some(profile);
        self.loading = false;
    }

    /// Upsert the edited fields for the principal loaded by `mount`
    pub async fn save(&mut self, agent: &mut BrowserAgent) -> Result<Profile, AgentError> {
        let principal = self.mounted_principal()?;
        self.loading = true;
        match agent.upsert_profile(&principal, self.fields.clone()).await {
            Ok(profile) => {
                self.fields = fields_of(&profile);
                self.profile = Some(profile.clone());
                self.notice = Some(Notice::info(PROFILE_UPDATED));
                self.loading = false;
                Ok(profile)
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Upload a new avatar and save it as the profile's `avatar_url`
    pub async fn upload(
        &mut self,
        agent: &mut BrowserAgent,
        file_name: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<UploadResult, AgentError> {
        let principal = self.mounted_principal()?;
        self.loading = true;
        let uploaded = match agent.upload_avatar(&principal, file_name, body.clone(), content_type).await {
            Ok(uploaded) => uploaded,
            Err(e) => {
                self.fail(&e);
                return Err(e);
            }
        };

        self.avatar = Some(body);
        self.fields.avatar_url = Some(uploaded.path.clone());
        self.save(agent).await?;
        Ok(uploaded)
    }
}
