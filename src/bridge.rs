//! The per-entity API bridge: permission gate, cache, deduplication, and
//! remote execution behind one uniform operation surface.
//!
//! Control flow per logical operation:
//! permission check -> cache lookup -> (hit: return) -> deduplicated network
//! call -> cache populate -> result. Every terminal state emits exactly one
//! analytics event, and every failure leaves the bridge as a normalized
//! [`Failure`] envelope.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

use crate::analytics::{AnalyticsSink, EventPriority, TracingAnalytics};
use crate::api::{envelope, ApiRequest, Transport};
use crate::auth::{
  AuditSink, PermissionGate, PermissionValidator, RequiredPermissions, Scope, TracingAuditSink,
};
use crate::cache::{cache_key, CacheStore, InflightTracker};
use crate::config::OperationConfig;
use crate::error::{BridgeError, BridgeResult, Failure};

/// Who is asking: the caller's permission strings and optional scope override.
#[derive(Debug, Clone, Default)]
pub struct CallerContext {
  pub permissions: Vec<String>,
  pub scope: Option<Scope>,
}

impl CallerContext {
  pub fn new(permissions: Vec<String>) -> Self {
    Self {
      permissions,
      scope: None,
    }
  }

  pub fn with_scope(mut self, scope: Scope) -> Self {
    self.scope = Some(scope);
    self
  }
}

/// Cached, deduplicated, permission-gated access to one entity type.
///
/// Constructed explicitly and passed to whoever needs it; the usual pattern is
/// one instance per entity type for the lifetime of the application, built by
/// [`crate::client::PosalClient`].
pub struct ApiBridge {
  entity: String,
  transport: Arc<dyn Transport>,
  cache: CacheStore,
  inflight: InflightTracker,
  gate: PermissionGate,
  analytics: Arc<dyn AnalyticsSink>,
  config: OperationConfig,
}

impl ApiBridge {
  /// Create a bridge with the default gate (required-permissions validator
  /// from the config, audit to tracing) and tracing-backed analytics.
  pub fn new(
    entity: impl Into<String>,
    transport: Arc<dyn Transport>,
    config: OperationConfig,
  ) -> Self {
    let validator = RequiredPermissions::new(config.required_permissions.clone());
    Self {
      entity: entity.into(),
      transport,
      cache: CacheStore::new(config.cache_ttl_ms, config.cache_enabled),
      inflight: InflightTracker::new(),
      gate: PermissionGate::new(Arc::new(validator), Arc::new(TracingAuditSink)),
      analytics: Arc::new(TracingAnalytics),
      config,
    }
  }

  /// Replace the permission gate (external validator + audit sink).
  pub fn with_gate(
    mut self,
    validator: Arc<dyn PermissionValidator>,
    audit: Arc<dyn AuditSink>,
  ) -> Self {
    self.gate = PermissionGate::new(validator, audit);
    self
  }

  /// Replace the analytics sink.
  pub fn with_analytics(mut self, analytics: Arc<dyn AnalyticsSink>) -> Self {
    self.analytics = analytics;
    self
  }

  pub fn entity(&self) -> &str {
    &self.entity
  }

  /// Manually drop cache entries (all of them, or those matching a substring).
  pub fn invalidate(&self, pattern: Option<&str>) {
    self.cache.invalidate(pattern);
  }

  /// Execute a read operation: cacheable, deduplicated.
  ///
  /// `params` feeds the cache key; two calls with equal parameter sets share
  /// one cache entry regardless of construction order. Permission is checked
  /// once per logical call, before the cache lookup; a cache hit is still an
  /// access.
  pub async fn read<T: DeserializeOwned>(
    &self,
    operation: &str,
    request: ApiRequest,
    params: &Value,
    caller: &CallerContext,
  ) -> BridgeResult<T> {
    let started = Instant::now();
    tracing::debug!(entity = %self.entity, operation, "bridge read start");

    if !self.authorize(operation, caller).await {
      return Err(self.deny(operation, &started));
    }

    let key = cache_key(operation, params);
    if let Some(hit) = self.cache.get(&key) {
      return self.settle(operation, &started, true, hit);
    }

    let transport = Arc::clone(&self.transport);
    let retry_attempts = self.config.retry_attempts;
    let timeout_ms = self.config.timeout_ms;
    let outcome = self
      .inflight
      .run_deduplicated(&key, move || {
        fetch_with_retry(transport, request, retry_attempts, timeout_ms)
      })
      .await;

    match outcome {
      Ok(payload) => {
        self.cache.set(&key, payload.clone());
        self.settle(operation, &started, false, payload)
      }
      Err(err) => Err(self.fail(operation, &started, err)),
    }
  }

  /// Execute a mutation: never cached, never deduplicated (two concurrent
  /// writes are distinct operations), never retried (a timed-out create may
  /// have reached the server, so re-sending it could duplicate the write).
  ///
  /// On success, every substring in `invalidates` is dropped from the read
  /// cache so subsequent reads are guaranteed fresh. Reads racing the
  /// mutation may still observe pre-invalidation entries; no transactional
  /// isolation is provided.
  pub async fn write<T: DeserializeOwned>(
    &self,
    operation: &str,
    request: ApiRequest,
    invalidates: &[&str],
    caller: &CallerContext,
  ) -> BridgeResult<T> {
    let started = Instant::now();
    tracing::debug!(entity = %self.entity, operation, "bridge write start");

    if !self.authorize(operation, caller).await {
      return Err(self.deny(operation, &started));
    }

    let outcome = perform(self.transport.as_ref(), request, self.config.timeout_ms).await;

    match outcome {
      Ok(payload) => {
        for &pattern in invalidates {
          self.cache.invalidate(Some(pattern));
        }
        tracing::debug!(
          entity = %self.entity,
          operation,
          invalidated = invalidates.len(),
          "bridge write invalidated cache"
        );
        self.settle(operation, &started, false, payload)
      }
      Err(err) => Err(self.fail(operation, &started, err)),
    }
  }

  async fn authorize(&self, action: &str, caller: &CallerContext) -> bool {
    if !self.config.require_auth {
      // Gate bypassed entirely; no audit record
      return true;
    }
    let scope = caller.scope.unwrap_or(self.config.default_scope);
    self
      .gate
      .check(&self.entity, action, scope, &caller.permissions)
      .await
  }

  fn deny(&self, operation: &str, started: &Instant) -> Failure {
    let failure = Failure::normalize(&BridgeError::PermissionDenied, operation);
    tracing::error!(
      entity = %self.entity,
      operation,
      code = %failure.code,
      "bridge operation denied"
    );
    self.emit(operation, started, false, Some(&failure));
    failure
  }

  /// Decode a successful payload and emit the matching terminal event. A
  /// payload that fails to deserialize is a failed operation, not a success.
  fn settle<T: DeserializeOwned>(
    &self,
    operation: &str,
    started: &Instant,
    cache_hit: bool,
    payload: Value,
  ) -> BridgeResult<T> {
    match decode_payload(payload, operation) {
      Ok(value) => {
        tracing::info!(
          entity = %self.entity,
          operation,
          duration_ms = started.elapsed().as_millis() as u64,
          cache_hit,
          "bridge operation ok"
        );
        self.emit(operation, started, cache_hit, None);
        Ok(value)
      }
      Err(failure) => {
        tracing::error!(
          entity = %self.entity,
          operation,
          code = %failure.code,
          error = %failure.error,
          "bridge payload decode failed"
        );
        self.emit(operation, started, cache_hit, Some(&failure));
        Err(failure)
      }
    }
  }

  fn fail(&self, operation: &str, started: &Instant, err: BridgeError) -> Failure {
    let failure = Failure::normalize(&err, operation);
    tracing::error!(
      entity = %self.entity,
      operation,
      code = %failure.code,
      retryable = failure.retryable,
      error = %failure.error,
      "bridge operation failed"
    );
    self.emit(operation, started, false, Some(&failure));
    failure
  }

  fn emit(&self, operation: &str, started: &Instant, cache_hit: bool, failure: Option<&Failure>) {
    let mut attributes = json!({
      "entity": self.entity,
      "operation": operation,
      "durationMs": started.elapsed().as_millis() as u64,
      "cacheHit": cache_hit,
      "success": failure.is_none(),
    });
    if let Some(f) = failure {
      attributes["errorCode"] = json!(f.code);
    }

    let (event, priority) = match failure {
      None => ("bridge_operation_succeeded", EventPriority::Low),
      Some(_) => ("bridge_operation_failed", EventPriority::High),
    };
    self.analytics.track(event, attributes, priority);
  }
}

/// One network attempt: per-attempt timeout, transport send, envelope decode.
async fn perform(
  transport: &dyn Transport,
  request: ApiRequest,
  timeout_ms: u64,
) -> Result<Value, BridgeError> {
  let deadline = std::time::Duration::from_millis(timeout_ms);
  let body = match tokio::time::timeout(deadline, transport.send(request)).await {
    Ok(sent) => sent?,
    Err(_) => return Err(BridgeError::Timeout { ms: timeout_ms }),
  };
  envelope::decode(body)
}

/// Run attempts until success, a non-retryable error, or the attempt budget
/// is exhausted. `retry_attempts = 0` means a single attempt.
async fn fetch_with_retry(
  transport: Arc<dyn Transport>,
  request: ApiRequest,
  retry_attempts: u32,
  timeout_ms: u64,
) -> Result<Value, BridgeError> {
  let mut attempt = 0u32;
  loop {
    match perform(transport.as_ref(), request.clone(), timeout_ms).await {
      Ok(payload) => return Ok(payload),
      Err(err) if attempt < retry_attempts && err.is_transient() => {
        attempt += 1;
        tracing::debug!(attempt, error = %err, "retrying transient failure");
      }
      Err(err) => return Err(err),
    }
  }
}

fn decode_payload<T: DeserializeOwned>(payload: Value, operation: &str) -> BridgeResult<T> {
  serde_json::from_value(payload).map_err(|e| {
    Failure::normalize(
      &BridgeError::Serialization {
        message: format!("Failed to deserialize response payload: {}", e),
      },
      operation,
    )
  })
}
