// src/lib.rs

pub mod config;
pub mod error;
pub mod handlers;
pub mod i18n;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

pub use routes::create_router;
