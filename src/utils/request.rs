// src/utils/request.rs

use std::collections::HashMap;

use crate::{error::AppError, utils::validator::Validator};

/// Parses a path id. Anything but a positive integer is treated as absent.
pub fn read_id_param(raw: &str) -> Result<i64, AppError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::NotFound),
    }
}

pub fn read_string(qs: &HashMap<String, String>, key: &str, default: &str) -> String {
    match qs.get(key) {
        Some(value) if !value.is_empty() => value.clone(),
        _ => default.to_string(),
    }
}

/// Reads an integer parameter, recording a validation error if it is not one.
pub fn read_int(qs: &HashMap<String, String>, key: &str, default: i64, v: &mut Validator) -> i64 {
    match qs.get(key) {
        Some(value) if !value.is_empty() => value.parse().unwrap_or_else(|_| {
            v.add_error(key, "must be an integer value");
            default
        }),
        _ => default,
    }
}

pub fn read_csv(qs: &HashMap<String, String>, key: &str, default: &[String]) -> Vec<String> {
    match qs.get(key) {
        Some(value) if !value.is_empty() => value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        _ => default.to_vec(),
    }
}
