// Account Domain Model (user + profile)

use serde::{Deserialize, Serialize};

use super::catalog::Image;
use super::error::{DomainError, Result};

pub type UserId = i64;

pub const MAX_USERNAME_LEN: usize = 150;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PHONE_LEN: usize = 20;

/// Accepted avatar extensions (compared case-insensitively)
pub const AVATAR_EXTENSIONS: [&str; 3] = [".png", ".jpg", ".jpeg"];

/// Stored credentials
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub avatar_path: Option<String>,
}

impl Profile {
    pub fn avatar(&self) -> Option<Image> {
        self.avatar_path
            .as_deref()
            .map(|path| Image::from_media_path(path, format!("avatar_{}", self.username)))
    }
}

/// Editable profile fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<()> {
        validate_email(&self.email, true)?;
        if self.phone.chars().count() > MAX_PHONE_LEN {
            return Err(DomainError::ValidationError(format!(
                "Phone must be at most {} characters",
                MAX_PHONE_LEN
            )));
        }
        Ok(())
    }
}

pub fn validate_username(username: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(DomainError::ValidationError(
            "Username cannot be empty".to_string(),
        ));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(DomainError::ValidationError(format!(
            "Username too long (max {} characters)",
            MAX_USERNAME_LEN
        )));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::ValidationError(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str, allow_empty: bool) -> Result<()> {
    if email.is_empty() && allow_empty {
        return Ok(());
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(DomainError::ValidationError(format!(
            "Invalid email: {}",
            email
        ))),
    }
}

/// Check the avatar extension and return a filename safe to store.
///
/// Path components are stripped and anything outside `[A-Za-z0-9._-]`
/// becomes `_`.
pub fn sanitize_avatar_filename(filename: &str) -> Result<String> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let lower = base.to_ascii_lowercase();
    if !AVATAR_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) || lower.starts_with('.') {
        return Err(DomainError::ValidationError("Wrong file format".to_string()));
    }

    Ok(base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect())
}
