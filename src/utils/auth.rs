// src/utils/auth.rs

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    services::token::{self, Identity},
};

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Axum Middleware: Token Authentication.
///
/// Resolves the bearer token (if any) and injects an `Identity` into the
/// request extensions. Never rejects on a bad token; each handler decides
/// whether an anonymous caller is acceptable.
pub async fn token_authentication(
    State(pool): State<SqlitePool>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let identity = match bearer_token(req.headers()) {
        Some(bearer) => token::verify(&pool, bearer).await?,
        None => Identity::Anonymous,
    };

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
