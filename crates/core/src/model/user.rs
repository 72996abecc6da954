use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::UserId;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("email is required")]
    MissingEmail,

    #[error("email address is not valid")]
    InvalidEmail,

    #[error("username is required")]
    MissingUsername,

    #[error("password is required")]
    MissingPassword,

    #[error("password must be at least 6 characters")]
    PasswordTooShort,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("nothing to update")]
    NothingToUpdate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl User {
    /// Name shown in the navigation bar.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ if !self.username.is_empty() => &self.username,
            _ => &self.email,
        }
    }
}

/// Bearer token issued at login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

fn validate_email(email: &str) -> Result<String, UserError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(UserError::MissingEmail);
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email.to_owned()),
        _ => Err(UserError::InvalidEmail),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// # Errors
    ///
    /// Returns `UserError` for a missing/invalid email or empty password.
    pub fn new(email: &str, password: &str) -> Result<Self, UserError> {
        let email = validate_email(email)?;
        if password.is_empty() {
            return Err(UserError::MissingPassword);
        }
        Ok(Self {
            email,
            password: password.to_owned(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    /// # Errors
    ///
    /// Returns `UserError` if any field is missing, the email is malformed,
    /// or the password is shorter than `MIN_PASSWORD_LEN`.
    pub fn new(username: &str, email: &str, password: &str) -> Result<Self, UserError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(UserError::MissingUsername);
        }
        let email = validate_email(email)?;
        if password.is_empty() {
            return Err(UserError::MissingPassword);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(UserError::PasswordTooShort);
        }
        Ok(Self {
            username: username.to_owned(),
            email,
            password: password.to_owned(),
        })
    }

    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

/// Profile form contents; blank password means "keep current password".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdateDraft {
    pub name: String,
    pub password: String,
    pub confirm_password: String,
}

impl ProfileUpdateDraft {
    /// Builds the minimal update against the current user.
    ///
    /// # Errors
    ///
    /// Returns `UserError::PasswordTooShort` / `PasswordMismatch` for a bad new password,
    /// and `UserError::NothingToUpdate` if neither field changes.
    pub fn validate(self, current: &User) -> Result<ProfileUpdate, UserError> {
        let password = if self.password.is_empty() {
            None
        } else {
            if self.password.chars().count() < MIN_PASSWORD_LEN {
                return Err(UserError::PasswordTooShort);
            }
            if self.password != self.confirm_password {
                return Err(UserError::PasswordMismatch);
            }
            Some(self.password)
        };

        let name = self.name.trim();
        let name = (name != current.name.as_deref().unwrap_or_default()).then(|| name.to_owned());

        if name.is_none() && password.is_none() {
            return Err(UserError::NothingToUpdate);
        }
        Ok(ProfileUpdate { name, password })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub password: Option<String>,
}
