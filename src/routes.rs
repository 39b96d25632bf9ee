// src/routes.rs

use std::path::Path;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    set_header::{SetResponseHeader, SetResponseHeaderLayer},
    trace::TraceLayer,
};

use crate::{
    error::error_envelope,
    handlers::{auth, file, hoax, user},
    services::file::ATTACHMENT_MAX_BYTES,
    state::AppState,
    utils::auth::token_authentication,
};

/// Limit for JSON bodies, which may carry a base64 profile image.
const JSON_BODY_LIMIT: usize = 3 * 1024 * 1024;

/// Room for multipart boundaries and headers around a maximum-size attachment.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

const ONE_YEAR_CACHE: &str = "public, max-age=31536000";

/// Assembles the main application router.
///
/// * `/api/1.0` endpoints, all behind token authentication.
/// * `/images` and `/attachments` static files with a one year cache header.
/// * Global middleware (error envelope, body limit, trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:8080"),
            HeaderValue::from_static("http://127.0.0.1:8080"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT_LANGUAGE,
        ]);

    let auth_routes = Router::new()
        .route("/auth", post(auth::login))
        .route("/logout", post(auth::logout));

    let user_routes = Router::new()
        .route("/users", post(user::create_user).get(user::list_users))
        .route("/users/token/{token}", post(user::activate))
        .route(
            "/users/{id}",
            get(user::get_user)
                .put(user::update_user)
                .delete(user::delete_user),
        )
        .route("/users/{id}/hoaxes", get(hoax::list_user_hoaxes))
        .route(
            "/user/password",
            post(user::password_reset_request).put(user::update_password),
        );

    let hoax_routes = Router::new()
        .route("/hoaxes", post(hoax::create_hoax).get(hoax::list_hoaxes))
        .route("/hoaxes/{id}", delete(hoax::delete_hoax))
        .route(
            "/hoaxes/attachments",
            post(file::upload_attachment)
                .layer(DefaultBodyLimit::max(ATTACHMENT_MAX_BYTES + MULTIPART_OVERHEAD)),
        );

    let api_routes = Router::new()
        .merge(auth_routes)
        .merge(user_routes)
        .merge(hoax_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            token_authentication,
        ));

    Router::new()
        .nest("/api/1.0", api_routes)
        .nest_service("/images", static_files(&state.config.profile_folder()))
        .nest_service("/attachments", static_files(&state.config.attachment_folder()))
        // Global Middleware (applied from outside in)
        .layer(middleware::from_fn(error_envelope))
        .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn static_files(folder: &Path) -> SetResponseHeader<ServeDir, HeaderValue> {
    ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static(ONE_YEAR_CACHE),
        ))
        .service(ServeDir::new(folder))
}
