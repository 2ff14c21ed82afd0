// src/utils/mod.rs

pub mod auth;
pub mod json;
pub mod request;
pub mod validator;
