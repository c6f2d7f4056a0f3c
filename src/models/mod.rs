// src/models/mod.rs

pub mod post;
pub mod stats;
pub mod user;
