//! In-flight request deduplication.
//!
//! Concurrent identical requests (same cache key) collapse into a single
//! underlying call whose outcome every caller shares.

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use crate::error::BridgeError;

type SharedOutcome = Shared<BoxFuture<'static, Result<Value, BridgeError>>>;

/// Tracks at most one pending request per key.
#[derive(Default)]
pub struct InflightTracker {
  pending: Mutex<HashMap<String, SharedOutcome>>,
}

impl InflightTracker {
  pub fn new() -> Self {
    Self::default()
  }

  /// Run `factory` deduplicated on `key`.
  ///
  /// If a pending request already exists for the key, its shared outcome is
  /// awaited instead of invoking the factory; all callers observe the same
  /// payload or the same error. The pending entry is removed once the request
  /// settles, success or failure, so a later call starts a fresh request.
  ///
  /// No retry happens here; retry policy belongs to the executor.
  pub async fn run_deduplicated<F, Fut>(&self, key: &str, factory: F) -> Result<Value, BridgeError>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value, BridgeError>> + Send + 'static,
  {
    let shared = {
      let mut pending = self.lock();
      if let Some(existing) = pending.get(key) {
        existing.clone()
      } else {
        let shared = factory().boxed().shared();
        pending.insert(key.to_string(), shared.clone());
        shared
      }
    };

    let outcome = shared.clone().await;

    // Remove the settled entry, but only if it is still this generation: a
    // slow waiter must not evict a newer request that reused the key.
    let mut pending = self.lock();
    if let Some(current) = pending.get(key) {
      if current.ptr_eq(&shared) {
        pending.remove(key);
      }
    }

    outcome
  }

  #[cfg(test)]
  pub(crate) fn pending_count(&self) -> usize {
    self.lock().len()
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, SharedOutcome>> {
    self
      .pending
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}
