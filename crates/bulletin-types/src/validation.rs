use std::collections::BTreeMap;

use serde::Serialize;

pub const VALIDATION_TITLE: &str = "One or more validation errors occurred.";

/// Shapes that carry their own required-field rules. Checked by the API's
/// validating extractor before a handler ever sees the payload.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationProblem>;
}

/// 400-style problem body listing every field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationProblem {
    pub title: String,
    pub status: u16,
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationProblem {
    pub fn new() -> Self {
        Self::with_status(400)
    }

    pub fn with_status(status: u16) -> Self {
        Self {
            title: VALIDATION_TITLE.to_string(),
            status,
            errors: BTreeMap::new(),
        }
    }

    /// Records an error for `field` unless `value` is present and non-blank.
    pub fn require(&mut self, field: &str, value: Option<&str>) {
        let present = value.is_some_and(|v| !v.trim().is_empty());
        if !present {
            self.add(field, format!("The {} field is required.", field));
        }
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<(), ValidationProblem> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl Default for ValidationProblem {
    fn default() -> Self {
        Self::new()
    }
}
