// src/services/mod.rs

pub mod email;
pub mod file;
pub mod hoax;
pub mod token;
pub mod user;
