// src/handlers/auth.rs

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::user::{LoginRequest, LoginResponse, validate_email},
    services::{token, user},
    utils::{auth::bearer_token, hash::verify_password},
};

/// Authenticates a user and issues a bearer token.
///
/// A malformed body, unknown e-mail or wrong password is a 401; an account
/// that has not been activated is a 403.
pub async fn login(
    State(pool): State<SqlitePool>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    const FAILURE: AppError = AppError::AuthError("authentication_failure");

    let Ok(Json(LoginRequest {
        email: Some(email),
        password,
    })) = payload
    else {
        return Err(FAILURE);
    };

    if validate_email(&email).is_err() {
        return Err(FAILURE);
    }

    let user = user::find_by_email(&pool, &email).await?.ok_or(FAILURE)?;

    let matches = match (&password, &user.password) {
        (Some(password), Some(hash)) => verify_password(password, hash),
        _ => false,
    };
    if !matches {
        return Err(FAILURE);
    }

    if user.inactive {
        return Err(AppError::Forbidden("inactive_authentication_failure"));
    }

    let token = token::create_token(&pool, user.id).await?;

    Ok(Json(LoginResponse {
        id: user.id,
        username: user.username,
        image: user.image,
        token,
    }))
}

/// Revokes the bearer token sent with the request, if any.
pub async fn logout(
    State(pool): State<SqlitePool>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    if let Some(bearer) = bearer_token(&headers) {
        token::delete_token(&pool, bearer).await?;
    }
    Ok(StatusCode::OK)
}
