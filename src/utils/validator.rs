// src/utils/validator.rs

use std::collections::{BTreeMap, HashSet};

use validator::ValidateEmail;

use crate::error::AppError;

/// Accumulates at most one error message per field key.
#[derive(Debug, Default)]
pub struct Validator {
    pub errors: BTreeMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Records `message` under `key` unless the key already has one.
    pub fn add_error(&mut self, key: &str, message: &str) {
        self.errors
            .entry(key.to_string())
            .or_insert_with(|| message.to_string());
    }

    /// Records `message` under `key` when `failed` is true.
    pub fn check(&mut self, failed: bool, key: &str, message: &str) {
        if failed {
            self.add_error(key, message);
        }
    }

    /// Turns the collected errors into a 422 if there are any.
    pub fn finish(self) -> Result<(), AppError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(AppError::FailedValidation(self.errors))
        }
    }
}

pub fn permitted_value(value: &str, permitted: &[&str]) -> bool {
    permitted.contains(&value)
}

/// True when no element of `values` repeats. An empty list is unique.
pub fn is_unique(values: &[String]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|value| seen.insert(value.as_str()))
}

/// HTML5 ("valid e-mail address") syntax check.
pub fn is_email(value: &str) -> bool {
    value.validate_email()
}
