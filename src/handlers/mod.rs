// src/handlers/mod.rs

pub mod healthcheck;
pub mod movements;
pub mod tokens;
pub mod users;
