// src/models/mod.rs

pub mod filters;
pub mod movement;
pub mod token;
pub mod user;
