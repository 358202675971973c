/**
 * Authentication Handler Types
 *
 * Form bodies posted by the entry page.
 */

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::services::Credentials;
use crate::shared::SharedError;

/// Minimum accepted password length at sign-up
pub const MIN_PASSWORD_LEN: usize = 6;

/// Email and password form used by sign-in and sign-up
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub email: String,
    pub password: SecretString,
}

impl CredentialsForm {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        }
    }

    /// Sign-up rules: an address with `@`, a password of at least 6 characters
    pub fn validate_for_signup(&self) -> Result<(), SharedError> {
        validate_email(&self.email)?;
        if self.password.expose_secret().chars().count() < MIN_PASSWORD_LEN {
            return Err(SharedError::validation(
                "password",
                format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }
        Ok(())
    }
}

/// Password recovery form
#[derive(Debug, Deserialize, Serialize)]
pub struct RecoverForm {
    pub email: String,
}

pub fn validate_email(email: &str) -> Result<(), SharedError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(SharedError::validation("email", "Please enter a valid email address")),
    }
}
