//! Response envelope decoding.
//!
//! The remote API wraps every response in `{ success: bool, data?: T,
//! error?: string }`. Decoding happens in exactly one place so a malformed
//! response is a single, uniform validation failure rather than scattered
//! shape checks.

use serde_json::Value;

use crate::error::BridgeError;

/// Decode the uniform response envelope, returning the inner `data` payload.
///
/// A `success: false` envelope becomes an API failure carrying the server's
/// error string (and `code` when present). Any deviation from the envelope
/// shape is a validation failure. A successful envelope without `data` (e.g.
/// a delete acknowledgement) yields `Value::Null`.
pub fn decode(body: Value) -> Result<Value, BridgeError> {
  let Value::Object(mut map) = body else {
    return Err(BridgeError::Validation {
      message: "response body is not a JSON object".to_string(),
    });
  };

  let success = match map.get("success") {
    Some(Value::Bool(b)) => *b,
    Some(_) => {
      return Err(BridgeError::Validation {
        message: "envelope field 'success' is not a boolean".to_string(),
      })
    }
    None => {
      return Err(BridgeError::Validation {
        message: "envelope is missing the 'success' field".to_string(),
      })
    }
  };

  if success {
    Ok(map.remove("data").unwrap_or(Value::Null))
  } else {
    Err(BridgeError::Api {
      message: map
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("Request failed")
        .to_string(),
      code: map.get("code").and_then(Value::as_str).map(String::from),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_success_envelope_yields_data() {
    let body = json!({"success": true, "data": {"items": [], "total": 0}});
    assert_eq!(decode(body).unwrap(), json!({"items": [], "total": 0}));
  }

  #[test]
  fn test_success_without_data_yields_null() {
    assert_eq!(decode(json!({"success": true})).unwrap(), Value::Null);
  }

  #[test]
  fn test_failure_envelope_carries_message_and_code() {
    let body = json!({"success": false, "error": "Customer not found", "code": "NOT_FOUND"});
    match decode(body) {
      Err(BridgeError::Api { message, code }) => {
        assert_eq!(message, "Customer not found");
        assert_eq!(code.as_deref(), Some("NOT_FOUND"));
      }
      other => panic!("expected Api error, got {:?}", other),
    }
  }

  #[test]
  fn test_missing_success_is_validation_failure() {
    assert!(matches!(
      decode(json!({"data": 1})),
      Err(BridgeError::Validation { .. })
    ));
  }

  #[test]
  fn test_non_object_body_is_validation_failure() {
    assert!(matches!(
      decode(json!([1, 2, 3])),
      Err(BridgeError::Validation { .. })
    ));
  }

  #[test]
  fn test_non_bool_success_is_validation_failure() {
    assert!(matches!(
      decode(json!({"success": "yes"})),
      Err(BridgeError::Validation { .. })
    ));
  }
}
