// src/services/token.rs

//! Token lifecycle: opaque bearer tokens with a sliding 7 day expiry.
//!
//! `last_used_at` is stored as text holding epoch millis and compared numerically.

use sqlx::SqlitePool;

use crate::{
    error::AppError,
    utils::{
        clock::{ONE_WEEK_IN_MILLIS, now_millis},
        random::random_string,
    },
};

pub const TOKEN_LENGTH: usize = 32;

/// Outcome of resolving a bearer token.
/// An unknown or expired token is not an error, the request is just anonymous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    Authenticated { user_id: i64 },
    Anonymous,
}

impl Identity {
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Identity::Authenticated { user_id } => Some(*user_id),
            Identity::Anonymous => None,
        }
    }

    /// True when the caller is authenticated as `id`.
    pub fn is(&self, id: i64) -> bool {
        self.user_id() == Some(id)
    }
}

/// Issues a new token for `user_id`, valid from now.
pub async fn create_token(pool: &SqlitePool, user_id: i64) -> Result<String, AppError> {
    let token = random_string(TOKEN_LENGTH);

    sqlx::query("INSERT INTO tokens (token, user_id, last_used_at) VALUES (?, ?, ?)")
        .bind(&token)
        .bind(user_id)
        .bind(now_millis().to_string())
        .execute(pool)
        .await?;

    Ok(token)
}

/// Resolves a token to its owner and slides its expiry forward.
/// Expired tokens are left for the sweep.
pub async fn verify(pool: &SqlitePool, token: &str) -> Result<Identity, AppError> {
    verify_at(pool, token, now_millis()).await
}

pub async fn verify_at(pool: &SqlitePool, token: &str, now: i64) -> Result<Identity, AppError> {
    let one_week_ago = now - ONE_WEEK_IN_MILLIS;

    let found: Option<(i64, Option<i64>)> = sqlx::query_as(
        r#"
        SELECT id, user_id
        FROM tokens
        WHERE token = ? AND CAST(last_used_at AS INTEGER) > ?
        LIMIT 1
        "#,
    )
    .bind(token)
    .bind(one_week_ago)
    .fetch_optional(pool)
    .await?;

    let Some((id, user_id)) = found else {
        return Ok(Identity::Anonymous);
    };

    sqlx::query("UPDATE tokens SET last_used_at = ? WHERE id = ?")
        .bind(now.to_string())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(match user_id {
        Some(user_id) => Identity::Authenticated { user_id },
        None => Identity::Anonymous,
    })
}

/// Removes a single token. Unknown tokens are ignored.
pub async fn delete_token(pool: &SqlitePool, token: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM tokens WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

/// Removes every token owned by `user_id`.
pub async fn clear_tokens<'e, E>(executor: E, user_id: i64) -> Result<u64, AppError>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query("DELETE FROM tokens WHERE user_id = ?")
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Deletes every token unused for a week or more. Returns how many went.
pub async fn remove_expired_tokens(pool: &SqlitePool, now: i64) -> Result<u64, AppError> {
    let one_week_ago = now - ONE_WEEK_IN_MILLIS;

    let result = sqlx::query("DELETE FROM tokens WHERE CAST(last_used_at AS INTEGER) <= ?")
        .bind(one_week_ago)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
