use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use super::errors::AuthError;

pub const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn check_password(field: &str, value: &str) -> Result<(), AuthError> {
    if value.is_empty() {
        return Err(AuthError::Validation(format!("{field} is required")));
    }
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "{field} must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.email.is_empty() {
            return Err(AuthError::Validation("email is required".into()));
        }
        if !is_valid_email(&self.email) {
            return Err(AuthError::Validation("email is invalid".into()));
        }
        check_password("password", &self.password)
    }
}

/// Request body for password change.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
}

impl ChangePasswordRequest {
    pub fn validate(&self) -> Result<(), AuthError> {
        check_password("oldPassword", &self.old_password)?;
        check_password("newPassword", &self.new_password)
    }
}
