// src/services/file.rs

//! Upload storage: profile images and hoax attachments.
//!
//! Attachments are stored before the hoax that uses them exists. An attachment
//! that is still unlinked a day after upload is reclaimed by the sweep.

use std::path::Path;

use sqlx::SqlitePool;
use tokio::fs;

use crate::{
    config::Config,
    error::AppError,
    models::{file_attachment::UNRECOGNIZED_FILE_TYPE, user::decode_image},
    utils::{
        clock::{ONE_DAY_IN_MILLIS, now_millis},
        random::random_string,
        sniff::sniff,
    },
};

pub const ATTACHMENT_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Returned by `save_attachment` when no file was supplied.
pub const NO_ATTACHMENT: i64 = 0;

const FILENAME_LENGTH: usize = 32;

/// Creates the upload, profile and attachment folders if missing.
pub async fn create_folders(config: &Config) -> std::io::Result<()> {
    fs::create_dir_all(&config.upload_dir).await?;
    fs::create_dir_all(config.profile_folder()).await?;
    fs::create_dir_all(config.attachment_folder()).await?;
    Ok(())
}

/// Writes an attachment under a random name and records it, unlinked.
///
/// The extension and file type come from the content, never the client's filename.
pub async fn save_attachment(
    pool: &SqlitePool,
    config: &Config,
    bytes: Option<&[u8]>,
) -> Result<i64, AppError> {
    let Some(bytes) = bytes else {
        return Ok(NO_ATTACHMENT);
    };

    let sniffed = sniff(bytes);
    let mut filename = random_string(FILENAME_LENGTH);
    if let Some(sniffed) = sniffed {
        filename.push('.');
        filename.push_str(sniffed.extension);
    }
    let file_type = sniffed.map(|s| s.mime).unwrap_or(UNRECOGNIZED_FILE_TYPE);

    fs::write(config.attachment_folder().join(&filename), bytes).await?;

    let id = sqlx::query(
        "INSERT INTO file_attachments (filename, upload_date, file_type) VALUES (?, ?, ?)",
    )
    .bind(&filename)
    .bind(now_millis())
    .bind(file_type)
    .execute(pool)
    .await?
    .last_insert_rowid();

    tracing::debug!("Stored attachment {} ({}, {} bytes)", id, file_type, bytes.len());
    Ok(id)
}

/// Links an attachment to a hoax. The first link wins; later calls, and
/// unknown attachment ids, change nothing.
pub async fn associate_file_to_hoax<'e, E>(
    executor: E,
    attachment_id: i64,
    hoax_id: i64,
) -> Result<bool, AppError>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result =
        sqlx::query("UPDATE file_attachments SET hoax_id = ? WHERE id = ? AND hoax_id IS NULL")
            .bind(hoax_id)
            .bind(attachment_id)
            .execute(executor)
            .await?;

    Ok(result.rows_affected() == 1)
}

/// Deletes attachments uploaded more than a day before `now` that never got
/// linked to a hoax. Backing files are removed best effort, and only for rows
/// this call actually deleted.
pub async fn remove_unused_attachments(
    pool: &SqlitePool,
    config: &Config,
    now: i64,
) -> Result<u64, AppError> {
    let one_day_ago = now - ONE_DAY_IN_MILLIS;

    // Selection and deletion are one statement, so a link made concurrently
    // either wins before it and keeps the row, or finds no row to link.
    let removed: Vec<String> = sqlx::query_scalar(
        r#"
        DELETE FROM file_attachments
        WHERE upload_date < ? AND hoax_id IS NULL
        RETURNING filename
        "#,
    )
    .bind(one_day_ago)
    .fetch_all(pool)
    .await?;

    for filename in &removed {
        delete_attachment(config, filename).await;
    }

    Ok(removed.len() as u64)
}

/// Removes an attachment's backing file. A missing file is not an error.
pub async fn delete_attachment(config: &Config, filename: &str) {
    remove_quietly(&config.attachment_folder().join(filename)).await;
}

/// Decodes a base64 image and stores it under a random name in the profile folder.
/// Returns `None` when there is nothing to store.
pub async fn save_profile_image(
    config: &Config,
    base64_image: Option<&str>,
) -> Result<Option<String>, AppError> {
    let Some(encoded) = base64_image.filter(|image| !image.is_empty()) else {
        return Ok(None);
    };

    let bytes = decode_image(encoded).map_err(|_| {
        let mut fields = crate::error::FieldErrors::new();
        fields.insert("image".to_string(), "unsupported_image_file".to_string());
        AppError::Validation(fields)
    })?;

    let mut filename = random_string(FILENAME_LENGTH);
    if let Some(sniffed) = sniff(&bytes) {
        filename.push('.');
        filename.push_str(sniffed.extension);
    }
    fs::write(config.profile_folder().join(&filename), bytes).await?;
    Ok(Some(filename))
}

/// Removes a profile image. A missing file is not an error.
pub async fn delete_profile_image(config: &Config, filename: &str) {
    remove_quietly(&config.profile_folder().join(filename)).await;
}

async fn remove_quietly(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("Nothing to delete at {}", path.display());
        }
        Err(e) => tracing::error!("Failed to delete {}: {}", path.display(), e),
    }
}
