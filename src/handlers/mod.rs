// src/handlers/mod.rs

pub mod auth;
pub mod dashboard;
pub mod posts;
pub mod translate;
pub mod uploads;
