use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    Transport,
    Parse,
    Configuration,
}

impl ErrorCode {
    /// Whether resubmitting the same input can succeed.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorCode::Transport)
    }
}

/// Required form fields that were left empty. Raised before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required fields: {}", .missing.join(", "))]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
}

impl ValidationError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::Validation
    }
}

/// Collects blank required fields in declaration order.
#[derive(Debug, Default)]
pub struct RequiredFields {
    missing: Vec<&'static str>,
}

impl RequiredFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, label: &'static str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.missing.push(label);
        }
        self
    }

    pub fn present<T>(mut self, label: &'static str, value: Option<&T>) -> Self {
        if value.is_none() {
            self.missing.push(label);
        }
        self
    }

    pub fn non_empty<T>(mut self, label: &'static str, values: &[T]) -> Self {
        if values.is_empty() {
            self.missing.push(label);
        }
        self
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                missing: self.missing,
            })
        }
    }
}
