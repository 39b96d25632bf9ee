use serde::Serialize;
use sqlx::FromRow;

/// File type recorded when sniffing does not recognize the content.
pub const UNRECOGNIZED_FILE_TYPE: &str = "unrecognized";

/// Represents the 'file_attachments' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAttachment {
    pub id: i64,
    pub filename: String,
    /// Epoch millis.
    pub upload_date: i64,
    pub file_type: String,
    /// Set once, when the attachment is linked to a hoax.
    pub hoax_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentView {
    pub filename: String,
    pub file_type: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub id: i64,
}
