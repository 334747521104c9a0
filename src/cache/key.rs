//! Deterministic cache key construction.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Build a cache key from an operation name and its parameters.
///
/// The operation name is kept verbatim as a prefix so that substring
/// invalidation by operation name (e.g. invalidating `"fetchCustomers"`) works;
/// the parameter portion is a SHA-256 digest of a canonical rendering, giving a
/// stable, fixed-length suffix.
///
/// Two parameter objects that are equal as sets of key/value pairs produce the
/// same key regardless of insertion order, recursively for nested objects.
pub fn cache_key(operation: &str, params: &Value) -> String {
  let mut hasher = Sha256::new();
  hasher.update(canonicalize(params).as_bytes());
  format!("{}:{}", operation, hex::encode(hasher.finalize()))
}

/// Render a JSON value with object keys sorted at every level.
fn canonicalize(value: &Value) -> String {
  match value {
    Value::Object(map) => {
      let mut keys: Vec<&String> = map.keys().collect();
      keys.sort();
      let fields: Vec<String> = keys
        .into_iter()
        .map(|k| format!("{}={}", k, canonicalize(&map[k])))
        .collect();
      format!("{{{}}}", fields.join(","))
    }
    Value::Array(items) => {
      let rendered: Vec<String> = items.iter().map(canonicalize).collect();
      format!("[{}]", rendered.join(","))
    }
    other => other.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_key_ignores_parameter_order() {
    let a = json!({"search": "acme", "page": 1});
    let b = json!({"page": 1, "search": "acme"});
    assert_eq!(cache_key("fetchCustomers", &a), cache_key("fetchCustomers", &b));
  }

  #[test]
  fn test_key_ignores_nested_parameter_order() {
    let a = json!({"filter": {"tier": "gold", "active": true}, "page": 1});
    let b = json!({"page": 1, "filter": {"active": true, "tier": "gold"}});
    assert_eq!(cache_key("fetchCustomers", &a), cache_key("fetchCustomers", &b));
  }

  #[test]
  fn test_key_differs_on_values() {
    let a = json!({"search": "acme"});
    let b = json!({"search": "globex"});
    assert_ne!(cache_key("fetchCustomers", &a), cache_key("fetchCustomers", &b));
  }

  #[test]
  fn test_key_differs_on_operation() {
    let params = json!({"id": "c-1"});
    assert_ne!(cache_key("getCustomer", &params), cache_key("getProposal", &params));
  }

  #[test]
  fn test_operation_name_is_key_prefix() {
    let key = cache_key("fetchProposals", &json!({}));
    assert!(key.starts_with("fetchProposals:"));
  }
}
