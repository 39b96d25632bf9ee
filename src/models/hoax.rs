use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{file_attachment::AttachmentView, user::UserView};

/// DTO for submitting a hoax.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateHoaxRequest {
    #[validate(
        required(message = "hoax_content_size"),
        length(min = 10, max = 5000, message = "hoax_content_size")
    )]
    pub content: Option<String>,

    /// Id returned by a previous attachment upload.
    pub file_attachment: Option<i64>,
}

/// Flat row of a hoax joined with its owner and optional attachment.
#[derive(Debug, FromRow)]
pub struct HoaxRow {
    pub id: i64,
    pub content: String,
    pub timestamp: i64,
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub image: Option<String>,
    pub attachment_filename: Option<String>,
    pub attachment_file_type: Option<String>,
}

/// A hoax as it appears in listings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoaxView {
    pub id: i64,
    pub content: String,
    pub timestamp: i64,
    pub user: UserView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_attachment: Option<AttachmentView>,
}

impl From<HoaxRow> for HoaxView {
    fn from(row: HoaxRow) -> Self {
        let file_attachment = match (row.attachment_filename, row.attachment_file_type) {
            (Some(filename), Some(file_type)) => Some(AttachmentView {
                filename,
                file_type,
            }),
            _ => None,
        };

        Self {
            id: row.id,
            content: row.content,
            timestamp: row.timestamp,
            user: UserView {
                id: row.user_id,
                username: row.username,
                email: row.email,
                image: row.image,
            },
            file_attachment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_content(length: usize) -> CreateHoaxRequest {
        CreateHoaxRequest {
            content: Some("a".repeat(length)),
            file_attachment: None,
        }
    }

    #[test]
    fn content_length_bounds() {
        assert!(with_content(9).validate().is_err());
        assert!(with_content(10).validate().is_ok());
        assert!(with_content(5000).validate().is_ok());
        assert!(with_content(5001).validate().is_err());
    }

    #[test]
    fn missing_content_is_rejected_with_size_message() {
        let request = CreateHoaxRequest {
            content: None,
            file_attachment: Some(3),
        };
        let errors = crate::error::field_errors(&request.validate().unwrap_err());
        assert_eq!(errors.get("content").map(String::as_str), Some("hoax_content_size"));
    }
}
