// src/handlers/hoax.rs

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::{AppJson, AppPath},
    i18n::{Locale, translate},
    models::{
        hoax::{CreateHoaxRequest, HoaxView},
        page::{MessageResponse, Page},
    },
    services::{hoax, token::Identity},
    state::AppState,
    utils::pagination::Pagination,
};

/// Submit a hoax, optionally linking a previously uploaded attachment.
/// Requires: Login.
pub async fn create_hoax(
    State(pool): State<SqlitePool>,
    Extension(identity): Extension<Identity>,
    locale: Locale,
    AppJson(payload): AppJson<CreateHoaxRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let Some(user_id) = identity.user_id() else {
        return Err(AppError::AuthError("unauthorized_hoax_submit"));
    };

    payload.validate()?;

    let content = payload.content.as_deref().unwrap_or_default();
    let hoax_id = hoax::save(&pool, user_id, content, payload.file_attachment).await?;
    tracing::debug!("User {} posted hoax {}", user_id, hoax_id);

    Ok(Json(MessageResponse {
        message: translate(locale, "hoax_submit_success").to_string(),
    }))
}

/// List hoaxes (newest first).
pub async fn list_hoaxes(
    State(pool): State<SqlitePool>,
    pagination: Pagination,
) -> Result<Json<Page<HoaxView>>, AppError> {
    Ok(Json(hoax::get_hoaxes(&pool, pagination, None).await?))
}

/// List hoaxes of one user (newest first).
pub async fn list_user_hoaxes(
    State(pool): State<SqlitePool>,
    AppPath(user_id): AppPath<i64>,
    pagination: Pagination,
) -> Result<Json<Page<HoaxView>>, AppError> {
    Ok(Json(hoax::get_hoaxes(&pool, pagination, Some(user_id)).await?))
}

/// Delete a hoax and its attachment.
/// Requires: Login + Author.
pub async fn delete_hoax(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    let Some(user_id) = identity.user_id() else {
        return Err(AppError::Forbidden("unauthorized_hoax_delete"));
    };

    hoax::delete_hoax(&state.pool, &state.config, id, user_id).await?;
    Ok(StatusCode::OK)
}
