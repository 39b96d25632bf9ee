// src/handlers/mod.rs

use axum::extract::{FromRequest, FromRequestParts, rejection::PathRejection};

use crate::error::AppError;

pub mod auth;
pub mod file;
pub mod hoax;
pub mod user;

/// `Json` extractor whose rejection goes through the error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `Path` extractor whose rejection goes through the error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

impl From<PathRejection> for AppError {
    fn from(err: PathRejection) -> Self {
        tracing::debug!("Rejected path parameter: {}", err);
        AppError::BadRequest("invalid_request")
    }
}
