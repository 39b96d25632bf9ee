// src/services/user.rs

use sqlx::SqlitePool;

use crate::{
    config::Config,
    error::{AppError, FieldErrors},
    models::{
        page::Page,
        user::{User, UserView},
    },
    services::{
        email::{self, Mailer},
        file, token,
    },
    utils::{hash::hash_password, pagination::Pagination, random::random_string},
};

const ONE_TIME_TOKEN_LENGTH: usize = 16;

const USER_COLUMNS: &str =
    "id, username, email, password, inactive, activation_token, password_reset_token, image";

pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_by_password_reset_token(
    pool: &SqlitePool,
    reset_token: &str,
) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE password_reset_token = ?"
    ))
    .bind(reset_token)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Registers an inactive user and mails the activation token.
///
/// The row is committed before the mail goes out so no write lock is held
/// during delivery. If the mail cannot be sent the row is deleted again.
pub async fn save(
    pool: &SqlitePool,
    mailer: &dyn Mailer,
    config: &Config,
    new_user: NewUser<'_>,
) -> Result<(), AppError> {
    let hashed_password = hash_password(new_user.password)?;
    let activation_token = random_string(ONE_TIME_TOKEN_LENGTH);

    let user_id = sqlx::query(
        r#"
        INSERT INTO users (username, email, password, inactive, activation_token)
        VALUES (?, ?, ?, 1, ?)
        "#,
    )
    .bind(new_user.username)
    .bind(new_user.email)
    .bind(&hashed_password)
    .bind(&activation_token)
    .execute(pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            let mut fields = FieldErrors::new();
            fields.insert("email".to_string(), "email_inuse".to_string());
            AppError::Validation(fields)
        } else {
            tracing::error!("Failed to register user: {:?}", e);
            AppError::from(e)
        }
    })?
    .last_insert_rowid();

    let message = email::account_activation(&config.mail, new_user.email, &activation_token);
    if let Err(e) = mailer.send(message).await {
        tracing::error!("Activation mail to {} failed, removing user {}: {}", new_user.email, user_id, e);
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(pool)
            .await?;
        return Err(AppError::EmailFailure);
    }

    Ok(())
}

/// Redeems an activation token.
pub async fn activate(pool: &SqlitePool, activation_token: &str) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE users SET inactive = 0, activation_token = NULL WHERE activation_token = ?",
    )
    .bind(activation_token)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::BadRequest("account_activation_failure"));
    }
    Ok(())
}

/// Active users, excluding the caller when there is one.
pub async fn get_users(
    pool: &SqlitePool,
    pagination: Pagination,
    exclude_id: Option<i64>,
) -> Result<Page<UserView>, AppError> {
    let exclude_id = exclude_id.unwrap_or(0);

    let users = sqlx::query_as::<_, UserView>(
        r#"
        SELECT id, username, email, image
        FROM users
        WHERE inactive = 0 AND id != ?
        ORDER BY id
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(exclude_id)
    .bind(pagination.size)
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE inactive = 0 AND id != ?")
        .bind(exclude_id)
        .fetch_one(pool)
        .await?;

    Ok(Page::new(users, pagination, count))
}

/// A single active user.
pub async fn get_user(pool: &SqlitePool, id: i64) -> Result<UserView, AppError> {
    sqlx::query_as::<_, UserView>(
        "SELECT id, username, email, image FROM users WHERE id = ? AND inactive = 0",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("user_not_found"))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Renames the user and, when an image is given, replaces the profile image.
/// The previous image file is removed only once the row points at the new one.
pub async fn update_user(
    pool: &SqlitePool,
    config: &Config,
    id: i64,
    username: &str,
    image: Option<&str>,
) -> Result<UserView, AppError> {
    let mut user = find_by_id(pool, id)
        .await?
        .ok_or(AppError::NotFound("user_not_found"))?;

    user.username = username.to_string();

    let new_image = file::save_profile_image(config, image).await?;
    let previous = match &new_image {
        Some(filename) => user.image.replace(filename.clone()),
        None => None,
    };

    let updated = sqlx::query("UPDATE users SET username = ?, image = ? WHERE id = ?")
        .bind(&user.username)
        .bind(&user.image)
        .bind(id)
        .execute(pool)
        .await;

    if let Err(e) = updated {
        if let Some(filename) = &new_image {
            file::delete_profile_image(config, filename).await;
        }
        return Err(e.into());
    }

    if let Some(previous) = previous {
        file::delete_profile_image(config, &previous).await;
    }

    Ok(user.into())
}

/// Deletes the user. Tokens, hoaxes and attachment rows go with it through
/// the foreign keys; stored files are removed afterwards.
pub async fn delete_user(pool: &SqlitePool, config: &Config, id: i64) -> Result<(), AppError> {
    let Some(user) = find_by_id(pool, id).await? else {
        return Ok(());
    };

    let attachments: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT f.filename
        FROM file_attachments f
        JOIN hoaxes h ON h.id = f.hoax_id
        WHERE h.user_id = ?
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    for filename in &attachments {
        file::delete_attachment(config, filename).await;
    }
    if let Some(image) = &user.image {
        file::delete_profile_image(config, image).await;
    }

    tracing::info!("Deleted user {} and {} attachment(s)", id, attachments.len());
    Ok(())
}

/// Stores a fresh reset token for the account and mails it.
pub async fn password_reset_request(
    pool: &SqlitePool,
    mailer: &dyn Mailer,
    config: &Config,
    email_address: &str,
) -> Result<(), AppError> {
    let user = find_by_email(pool, email_address)
        .await?
        .ok_or(AppError::NotFound("email_not_inuse"))?;

    let reset_token = random_string(ONE_TIME_TOKEN_LENGTH);
    sqlx::query("UPDATE users SET password_reset_token = ? WHERE id = ?")
        .bind(&reset_token)
        .bind(user.id)
        .execute(pool)
        .await?;

    let message = email::password_reset(&config.mail, &user.email, &reset_token);
    mailer.send(message).await.map_err(|e| {
        tracing::error!("Password reset mail to {} failed: {}", user.email, e);
        AppError::EmailFailure
    })
}

/// Sets a new password from a reset token. The account is activated and
/// every bearer token it held is revoked.
pub async fn update_password(
    pool: &SqlitePool,
    reset_token: &str,
    password: &str,
) -> Result<(), AppError> {
    let user = find_by_password_reset_token(pool, reset_token)
        .await?
        .ok_or(AppError::Forbidden("unauthorized_password_reset"))?;

    let hashed_password = hash_password(password)?;

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        UPDATE users
        SET password = ?, password_reset_token = NULL, inactive = 0, activation_token = NULL
        WHERE id = ?
        "#,
    )
    .bind(&hashed_password)
    .bind(user.id)
    .execute(&mut *tx)
    .await?;

    let revoked = token::clear_tokens(&mut *tx, user.id).await?;

    tx.commit().await?;

    tracing::info!("Password reset for user {}, revoked {} token(s)", user.id, revoked);
    Ok(())
}
