//! In-memory TTL cache store.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// A cached payload with its storage timestamp.
#[derive(Debug, Clone)]
struct CacheEntry {
  payload: Value,
  stored_at: DateTime<Utc>,
}

/// Per-bridge in-memory cache with a single TTL.
///
/// An entry is valid iff `now - stored_at <= ttl`; expired entries are treated
/// as absent and lazily evicted on the access that observes them. All methods
/// are infallible.
pub struct CacheStore {
  entries: Mutex<HashMap<String, CacheEntry>>,
  ttl: Duration,
  enabled: bool,
}

impl CacheStore {
  /// Create a store with the given TTL. A TTL of zero or `enabled = false`
  /// turns both reads and writes into no-ops.
  pub fn new(ttl_ms: u64, enabled: bool) -> Self {
    Self {
      entries: Mutex::new(HashMap::new()),
      ttl: Duration::milliseconds(ttl_ms as i64),
      enabled,
    }
  }

  /// Get the cached payload if present and unexpired.
  pub fn get(&self, key: &str) -> Option<Value> {
    self.get_at(key, Utc::now())
  }

  pub(crate) fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<Value> {
    if !self.enabled || self.ttl.is_zero() {
      return None;
    }

    let mut entries = self.lock();
    let fresh = match entries.get(key) {
      None => return None,
      Some(entry) if now - entry.stored_at <= self.ttl => Some(entry.payload.clone()),
      Some(_) => None,
    };
    if fresh.is_none() {
      // Expired, evict lazily
      entries.remove(key);
    }
    fresh
  }

  /// Store a payload, overwriting any prior entry for the key.
  pub fn set(&self, key: &str, payload: Value) {
    self.set_at(key, payload, Utc::now());
  }

  pub(crate) fn set_at(&self, key: &str, payload: Value, now: DateTime<Utc>) {
    // A zero TTL never serves hits, so storing would only grow the map
    if !self.enabled || self.ttl.is_zero() {
      return;
    }

    self.lock().insert(
      key.to_string(),
      CacheEntry {
        payload,
        stored_at: now,
      },
    );
  }

  /// With no pattern, clear everything; with a pattern, remove every entry
  /// whose key contains it as a substring. Invalidating `"fetchCustomers"`
  /// drops all cached list pages for customers in one call.
  pub fn invalidate(&self, pattern: Option<&str>) {
    let mut entries = self.lock();
    match pattern {
      None => entries.clear(),
      Some(p) => entries.retain(|key, _| !key.contains(p)),
    }
  }

  #[cfg(test)]
  pub(crate) fn len(&self) -> usize {
    self.lock().len()
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
    // A poisoned map still holds coherent entries; recover rather than error.
    self
      .entries
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_get_returns_stored_payload() {
    let store = CacheStore::new(60_000, true);
    store.set("fetchCustomers:a", json!({"total": 3}));
    assert_eq!(store.get("fetchCustomers:a"), Some(json!({"total": 3})));
  }

  #[test]
  fn test_set_overwrites_prior_entry() {
    let store = CacheStore::new(60_000, true);
    store.set("getCustomer:a", json!(1));
    store.set("getCustomer:a", json!(2));
    assert_eq!(store.get("getCustomer:a"), Some(json!(2)));
  }

  #[test]
  fn test_ttl_boundary() {
    let store = CacheStore::new(1_000, true);
    let t0 = Utc::now();
    store.set_at("getCustomer:a", json!("x"), t0);

    let just_inside = t0 + Duration::milliseconds(999);
    assert_eq!(store.get_at("getCustomer:a", just_inside), Some(json!("x")));

    let just_outside = t0 + Duration::milliseconds(1_001);
    assert_eq!(store.get_at("getCustomer:a", just_outside), None);
    // Expired entry was evicted
    assert_eq!(store.len(), 0);
  }

  #[test]
  fn test_zero_ttl_always_misses() {
    let store = CacheStore::new(0, true);
    let t0 = Utc::now();
    store.set_at("getCustomer:a", json!("x"), t0);
    assert_eq!(store.get_at("getCustomer:a", t0), None);
  }

  #[test]
  fn test_zero_ttl_stores_nothing() {
    let store = CacheStore::new(0, true);
    for i in 0..10 {
      store.set(&format!("fetchCustomers:{}", i), json!(i));
    }
    assert_eq!(store.len(), 0);
  }

  #[test]
  fn test_disabled_store_is_noop() {
    let store = CacheStore::new(60_000, false);
    store.set("getCustomer:a", json!("x"));
    assert_eq!(store.get("getCustomer:a"), None);
    assert_eq!(store.len(), 0);
  }

  #[test]
  fn test_invalidate_by_substring() {
    let store = CacheStore::new(60_000, true);
    store.set("fetchList:a", json!("x"));
    store.set("getOne:b", json!("y"));

    store.invalidate(Some("fetchList"));

    assert_eq!(store.get("fetchList:a"), None);
    assert_eq!(store.get("getOne:b"), Some(json!("y")));
  }

  #[test]
  fn test_invalidate_all() {
    let store = CacheStore::new(60_000, true);
    store.set("fetchList:a", json!("x"));
    store.set("getOne:b", json!("y"));

    store.invalidate(None);

    assert_eq!(store.len(), 0);
  }
}
