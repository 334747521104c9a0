//! Error taxonomy and the uniform failure envelope.
//!
//! Internally the bridge works with [`BridgeError`]; at the public boundary every
//! failure is normalized into a [`Failure`] envelope so callers branch on
//! `code`/`retryable` instead of matching on error internals.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Result type returned by all public bridge operations.
pub type BridgeResult<T> = Result<T, Failure>;

/// Internal error taxonomy.
///
/// `Clone` so an error can be shared between deduplicated callers waiting on the
/// same in-flight request.
#[derive(Debug, Clone, Error)]
pub enum BridgeError {
  #[error("Insufficient permissions")]
  PermissionDenied,

  #[error("Network failure: {message}")]
  Network {
    message: String,
    status: Option<u16>,
  },

  #[error("Request timeout after {ms}ms")]
  Timeout { ms: u64 },

  #[error("Malformed API response: {message}")]
  Validation { message: String },

  #[error("{message}")]
  Api {
    message: String,
    code: Option<String>,
  },

  #[error("Serialization error: {message}")]
  Serialization { message: String },

  #[error("Internal error: {message}")]
  Internal { message: String },
}

impl BridgeError {
  /// Stable machine-readable code for this error.
  pub fn code(&self) -> &str {
    match self {
      Self::PermissionDenied => "PERMISSION_DENIED",
      Self::Network { .. } => "NETWORK_ERROR",
      Self::Timeout { .. } => "TIMEOUT",
      Self::Validation { .. } => "VALIDATION_ERROR",
      Self::Api { code, .. } => code.as_deref().unwrap_or("API_ERROR"),
      Self::Serialization { .. } => "SERIALIZATION_ERROR",
      Self::Internal { .. } => "UNKNOWN_ERROR",
    }
  }

  /// Whether a retry could plausibly succeed.
  pub fn is_transient(&self) -> bool {
    retryable_message(&self.to_string())
  }
}

/// Substrings associated with transient conditions.
const TRANSIENT_MARKERS: &[&str] = &["timeout", "network", "500", "503"];

/// Classify retryability from an error message (case-insensitive contains).
pub(crate) fn retryable_message(message: &str) -> bool {
  let lower = message.to_lowercase();
  TRANSIENT_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Uniform failure envelope returned by every public operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
  /// Human-readable message
  pub error: String,
  /// Stable machine-readable code
  pub code: String,
  /// Operation that failed (e.g. "fetchCustomers")
  pub operation: String,
  /// When the failure was produced
  pub timestamp: DateTime<Utc>,
  /// Whether a retry could plausibly succeed
  pub retryable: bool,
}

impl Failure {
  /// Convert an internal error into the uniform envelope. Never fails.
  pub fn normalize(raw: &BridgeError, operation: &str) -> Self {
    let message = raw.to_string();
    Self {
      retryable: retryable_message(&message),
      code: raw.code().to_string(),
      error: message,
      operation: operation.to_string(),
      timestamp: Utc::now(),
    }
  }
}

impl std::fmt::Display for Failure {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} failed [{}]: {}", self.operation, self.code, self.error)
  }
}

impl std::error::Error for Failure {}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_timeout_message_is_retryable() {
    let err = BridgeError::Api {
      message: "Connection timeout".to_string(),
      code: None,
    };
    let failure = Failure::normalize(&err, "fetchCustomers");
    assert!(failure.retryable);
  }

  #[test]
  fn test_validation_message_is_not_retryable() {
    let err = BridgeError::Api {
      message: "Invalid input".to_string(),
      code: None,
    };
    let failure = Failure::normalize(&err, "createCustomer");
    assert!(!failure.retryable);
  }

  #[test]
  fn test_server_errors_are_retryable() {
    let err = BridgeError::Network {
      message: "HTTP 503 Service Unavailable".to_string(),
      status: Some(503),
    };
    assert!(err.is_transient());
  }

  #[test]
  fn test_api_code_is_preserved() {
    let err = BridgeError::Api {
      message: "Customer not found".to_string(),
      code: Some("NOT_FOUND".to_string()),
    };
    let failure = Failure::normalize(&err, "getCustomer");
    assert_eq!(failure.code, "NOT_FOUND");
  }

  #[test]
  fn test_unknown_error_sentinel() {
    let err = BridgeError::Internal {
      message: "something odd".to_string(),
    };
    assert_eq!(err.code(), "UNKNOWN_ERROR");
  }

  #[test]
  fn test_denial_has_fixed_message() {
    let failure = Failure::normalize(&BridgeError::PermissionDenied, "deleteProposal");
    assert_eq!(failure.error, "Insufficient permissions");
    assert_eq!(failure.code, "PERMISSION_DENIED");
    assert!(!failure.retryable);
  }
}
