// src/models/user.rs

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidateEmail, ValidationError};

use crate::utils::sniff::is_png_or_jpeg;

pub const PROFILE_IMAGE_MAX_BYTES: usize = 2 * 1024 * 1024;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: Option<String>,

    /// Set on registration, cleared by activation or password reset.
    pub inactive: bool,

    #[serde(skip)]
    pub activation_token: Option<String>,

    #[serde(skip)]
    pub password_reset_token: Option<String>,

    /// Profile image filename under the profile folder.
    pub image: Option<String>,
}

/// Public projection of a user, as listed and embedded in hoaxes.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub image: Option<String>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            image: user.image,
        }
    }
}

/// Body returned by a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: i64,
    pub username: String,
    pub image: Option<String>,
    pub token: String,
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(required(message = "username_null"), custom(function = "validate_username"))]
    pub username: Option<String>,

    #[validate(required(message = "email_null"), custom(function = "validate_email"))]
    pub email: Option<String>,

    #[validate(required(message = "password_null"), custom(function = "validate_password"))]
    pub password: Option<String>,
}

/// DTO for user login.
/// Left unvalidated: any malformed input is an authentication failure.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// DTO for updating one's own profile.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(required(message = "username_null"), custom(function = "validate_username"))]
    pub username: Option<String>,

    /// Base64 encoded PNG or JPEG.
    #[validate(custom(function = "validate_profile_image"))]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(required(message = "email_invalid"), email(message = "email_invalid"))]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PasswordUpdateRequest {
    pub password_reset_token: Option<String>,

    #[validate(required(message = "password_null"), custom(function = "validate_password"))]
    pub password: Option<String>,
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::new("username_null"));
    }
    let length = username.chars().count();
    if !(4..=32).contains(&length) {
        return Err(ValidationError::new("username_size"));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::new("email_null"));
    }
    if !email.validate_email() {
        return Err(ValidationError::new("email_invalid"));
    }
    Ok(())
}

/// At least 6 characters with one lowercase, one uppercase letter and one digit.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::new("password_null"));
    }
    if password.chars().count() < 6 {
        return Err(ValidationError::new("password_size"));
    }
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_lower && has_upper && has_digit) {
        return Err(ValidationError::new("password_pattern"));
    }
    Ok(())
}

pub fn validate_profile_image(image: &str) -> Result<(), ValidationError> {
    if image.is_empty() {
        return Ok(());
    }
    let Ok(bytes) = decode_image(image) else {
        return Err(ValidationError::new("unsupported_image_file"));
    };
    if bytes.len() > PROFILE_IMAGE_MAX_BYTES {
        return Err(ValidationError::new("profile_image_size"));
    }
    if !is_png_or_jpeg(&bytes) {
        return Err(ValidationError::new("unsupported_image_file"));
    }
    Ok(())
}

pub fn decode_image(image: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(image.trim())
}
