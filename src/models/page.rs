use serde::Serialize;

use crate::utils::pagination::Pagination;

/// One page of a listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, pagination: Pagination, count: i64) -> Self {
        Self {
            content,
            page: pagination.page,
            size: pagination.size,
            total_pages: pagination.total_pages(count),
        }
    }
}

/// Plain `{message}` acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
