// src/services/hoax.rs

use sqlx::SqlitePool;

use crate::{
    config::Config,
    error::AppError,
    models::{
        hoax::{HoaxRow, HoaxView},
        page::Page,
    },
    services::file,
    utils::{clock::now_millis, pagination::Pagination},
};

/// Stores a hoax and links the attachment, if any, to it.
pub async fn save(
    pool: &SqlitePool,
    user_id: i64,
    content: &str,
    file_attachment_id: Option<i64>,
) -> Result<i64, AppError> {
    let mut tx = pool.begin().await?;

    let hoax_id = sqlx::query("INSERT INTO hoaxes (content, timestamp, user_id) VALUES (?, ?, ?)")
        .bind(content)
        .bind(now_millis())
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

    if let Some(attachment_id) = file_attachment_id.filter(|id| *id != file::NO_ATTACHMENT) {
        if !file::associate_file_to_hoax(&mut *tx, attachment_id, hoax_id).await? {
            tracing::debug!(
                "Attachment {} not linked to hoax {}: unknown or already in use",
                attachment_id,
                hoax_id
            );
        }
    }

    tx.commit().await?;
    Ok(hoax_id)
}

/// Newest first. With `user_id`, only that user's hoaxes; the user must exist.
pub async fn get_hoaxes(
    pool: &SqlitePool,
    pagination: Pagination,
    user_id: Option<i64>,
) -> Result<Page<HoaxView>, AppError> {
    if let Some(user_id) = user_id {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        if exists.is_none() {
            return Err(AppError::NotFound("user_not_found"));
        }
    }

    let rows = sqlx::query_as::<_, HoaxRow>(
        r#"
        SELECT
            h.id, h.content, h.timestamp,
            u.id AS user_id, u.username, u.email, u.image,
            f.filename AS attachment_filename,
            f.file_type AS attachment_file_type
        FROM hoaxes h
        JOIN users u ON u.id = h.user_id
        LEFT JOIN file_attachments f ON f.hoax_id = h.id
        WHERE ?1 IS NULL OR h.user_id = ?1
        ORDER BY h.timestamp DESC, h.id DESC
        LIMIT ?2 OFFSET ?3
        "#,
    )
    .bind(user_id)
    .bind(pagination.size)
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM hoaxes WHERE ?1 IS NULL OR user_id = ?1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    let content = rows.into_iter().map(HoaxView::from).collect();
    Ok(Page::new(content, pagination, count))
}

/// Deletes a hoax owned by `user_id` together with its attachment.
/// A hoax that does not exist or belongs to someone else is forbidden.
pub async fn delete_hoax(
    pool: &SqlitePool,
    config: &Config,
    hoax_id: i64,
    user_id: i64,
) -> Result<(), AppError> {
    let owned: Option<i64> = sqlx::query_scalar("SELECT id FROM hoaxes WHERE id = ? AND user_id = ?")
        .bind(hoax_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    if owned.is_none() {
        return Err(AppError::Forbidden("unauthorized_hoax_delete"));
    }

    let attachment: Option<String> =
        sqlx::query_scalar("SELECT filename FROM file_attachments WHERE hoax_id = ?")
            .bind(hoax_id)
            .fetch_optional(pool)
            .await?;

    sqlx::query("DELETE FROM hoaxes WHERE id = ?")
        .bind(hoax_id)
        .execute(pool)
        .await?;

    if let Some(filename) = attachment {
        file::delete_attachment(config, &filename).await;
    }

    Ok(())
}
