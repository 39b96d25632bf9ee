// src/models/mod.rs

pub mod file_attachment;
pub mod hoax;
pub mod page;
pub mod user;
