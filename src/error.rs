// src/error.rs

use std::{collections::BTreeMap, fmt};

use axum::{
    Json,
    body::Body,
    extract::{Request, rejection::JsonRejection},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use validator::ValidationErrors;

use crate::{
    i18n::{Locale, translate},
    utils::clock::now_millis,
};

/// Field name to message key, one entry per invalid field.
pub type FieldErrors = BTreeMap<String, String>;

/// Global Application Error Enum.
/// Every variant carries the message key that is translated when the
/// response envelope is rendered.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(&'static str),

    // 400 Bad Request with per-field messages
    Validation(FieldErrors),

    // 400 Bad Request, upload over the attachment limit
    FileSizeLimitExceeded,

    // 401 Unauthorized
    AuthError(&'static str),

    // 403 Forbidden
    Forbidden(&'static str),

    // 404 Not Found
    NotFound(&'static str),

    // 502 Bad Gateway, the mail relay refused the message
    EmailFailure,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Untranslated error details attached to the response extensions.
/// `error_envelope` turns it into the JSON body.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub message: String,
    pub validation_errors: Option<FieldErrors>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) | AppError::Validation(_) | AppError::FileSizeLimitExceeded => {
                StatusCode::BAD_REQUEST
            }
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::EmailFailure => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn message_key(&self) -> &'static str {
        match self {
            AppError::InternalServerError(_) => "internal_server_error",
            AppError::Validation(_) => "validation_failure",
            AppError::FileSizeLimitExceeded => "attachment_size_limit",
            AppError::EmailFailure => "email_failure",
            AppError::BadRequest(key)
            | AppError::AuthError(key)
            | AppError::Forbidden(key)
            | AppError::NotFound(key) => key,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message_key().to_string();

        let validation_errors = match self {
            AppError::InternalServerError(detail) => {
                tracing::error!("Internal Server Error: {}", detail);
                None
            }
            AppError::Validation(fields) => Some(fields),
            _ => None,
        };

        let mut response = status.into_response();
        response.extensions_mut().insert(ErrorReport {
            message,
            validation_errors,
        });
        response
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    path: String,
    timestamp: i64,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    validation_errors: Option<BTreeMap<String, String>>,
}

/// Axum Middleware: renders `ErrorReport`s as the uniform error envelope
/// `{path, timestamp, message, validationErrors?}` in the caller's locale.
pub async fn error_envelope(locale: Locale, req: Request<Body>, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let mut response = next.run(req).await;

    let Some(report) = response.extensions_mut().remove::<ErrorReport>() else {
        return response;
    };

    let body = ErrorBody {
        path,
        timestamp: now_millis(),
        message: translate(locale, &report.message).to_string(),
        validation_errors: report.validation_errors.map(|fields| {
            fields
                .into_iter()
                .map(|(field, key)| {
                    let message = translate(locale, &key).to_string();
                    (field, message)
                })
                .collect()
        }),
    };

    (response.status(), Json(body)).into_response()
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", err);
        AppError::BadRequest("invalid_request")
    }
}

/// Collects the first message of every invalid field.
/// A message set on the rule wins over the code returned by custom validators.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(field_errors(&errors))
    }
}

pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|e| {
                let key = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                (field.to_string(), key)
            })
        })
        .collect()
}
