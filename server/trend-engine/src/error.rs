//! Structured error types for the trend engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
  /// Malformed or unreadable configuration (keywords, issue definition, snapshot).
  #[error("config: {source_name}: {reason}")]
  Config { source_name: String, reason: String },

  /// One inbound document failed validation; the batch continues without it.
  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },

  #[error("io: {0}")]
  Io(#[from] std::io::Error),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("csv: {0}")]
  Csv(#[from] csv::Error),
}

impl EngineError {
  pub fn config(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
    Self::Config {
      source_name: source_name.into(),
      reason: reason.into(),
    }
  }

  pub fn validation(field: &str, reason: &str) -> Self {
    Self::Validation {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  pub fn is_config(&self) -> bool {
    matches!(self, Self::Config { .. })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn config_error_names_its_source() {
    let err = EngineError::config("keywords.json", "expected an object");
    assert!(err.is_config());
    assert_eq!(err.to_string(), "config: keywords.json: expected an object");
  }

  #[test]
  fn validation_error_mentions_field() {
    let err = EngineError::validation("body", "must not be empty");
    assert!(!err.is_config());
    assert!(err.to_string().contains("body"));
  }
}
