// src/handlers/user.rs

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::{AppError, field_errors},
    handlers::{AppJson, AppPath},
    i18n::{Locale, translate},
    models::{
        page::{MessageResponse, Page},
        user::{
            CreateUserRequest, PasswordResetRequest, PasswordUpdateRequest, UpdateUserRequest,
            UserView,
        },
    },
    services::{token::Identity, user},
    state::AppState,
    utils::pagination::Pagination,
};

fn message(locale: Locale, key: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: translate(locale, key).to_string(),
    })
}

/// Registers a new, inactive user and mails the activation link.
///
/// Every invalid field is reported at once. If the mail cannot be sent the
/// user is not stored and the response is 502.
pub async fn create_user(
    State(state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut errors = match payload.validate() {
        Ok(()) => Default::default(),
        Err(e) => field_errors(&e),
    };

    if let Some(email) = payload.email.as_deref() {
        if !errors.contains_key("email") && user::find_by_email(&state.pool, email).await?.is_some() {
            errors.insert("email".to_string(), "email_inuse".to_string());
        }
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let (Some(username), Some(email), Some(password)) =
        (&payload.username, &payload.email, &payload.password)
    else {
        return Err(AppError::BadRequest("invalid_request"));
    };

    user::save(
        &state.pool,
        state.mailer.as_ref(),
        &state.config,
        user::NewUser {
            username,
            email,
            password,
        },
    )
    .await?;

    Ok(message(locale, "user_create_success"))
}

/// Activates the account holding the given activation token.
pub async fn activate(
    State(pool): State<SqlitePool>,
    locale: Locale,
    AppPath(token): AppPath<String>,
) -> Result<Json<MessageResponse>, AppError> {
    user::activate(&pool, &token).await?;
    Ok(message(locale, "account_activation_success"))
}

/// Lists active users, leaving out the caller.
pub async fn list_users(
    State(pool): State<SqlitePool>,
    Extension(identity): Extension<Identity>,
    pagination: Pagination,
) -> Result<Json<Page<UserView>>, AppError> {
    let page = user::get_users(&pool, pagination, identity.user_id()).await?;
    Ok(Json(page))
}

pub async fn get_user(
    State(pool): State<SqlitePool>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<UserView>, AppError> {
    Ok(Json(user::get_user(&pool, id).await?))
}

/// Updates the caller's own username and profile image.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<UserView>, AppError> {
    if !identity.is(id) {
        return Err(AppError::Forbidden("unauthorized_user_update"));
    }

    payload.validate()?;

    let Some(username) = payload.username.as_deref() else {
        return Err(AppError::BadRequest("invalid_request"));
    };

    let updated = user::update_user(
        &state.pool,
        &state.config,
        id,
        username,
        payload.image.as_deref(),
    )
    .await?;

    Ok(Json(updated))
}

/// Deletes the caller's own account.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    if !identity.is(id) {
        return Err(AppError::Forbidden("unauthorized_user_delete"));
    }

    user::delete_user(&state.pool, &state.config, id).await?;
    Ok(StatusCode::OK)
}

/// Mails a password reset link to a registered address.
pub async fn password_reset_request(
    State(state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<PasswordResetRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;

    let Some(email) = payload.email.as_deref() else {
        return Err(AppError::BadRequest("invalid_request"));
    };

    user::password_reset_request(&state.pool, state.mailer.as_ref(), &state.config, email).await?;
    Ok(message(locale, "password_reset_request_success"))
}

/// Sets a new password using a reset token.
///
/// The token is checked before the password rules, so a bad token is always a 403.
pub async fn update_password(
    State(pool): State<SqlitePool>,
    AppJson(payload): AppJson<PasswordUpdateRequest>,
) -> Result<StatusCode, AppError> {
    let reset_token = payload.password_reset_token.as_deref().unwrap_or_default();
    if reset_token.is_empty() || user::find_by_password_reset_token(&pool, reset_token).await?.is_none() {
        return Err(AppError::Forbidden("unauthorized_password_reset"));
    }

    payload.validate()?;

    let Some(password) = payload.password.as_deref() else {
        return Err(AppError::BadRequest("invalid_request"));
    };

    user::update_password(&pool, reset_token, password).await?;
    Ok(StatusCode::OK)
}
