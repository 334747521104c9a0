//! Permission gate and audit trail.
//!
//! Every remote operation passes through a [`PermissionGate`] before the cache
//! or the network is touched. The gate delegates the actual decision to an
//! external [`PermissionValidator`] and emits exactly one [`AuditRecord`] per
//! evaluation, grant or deny.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::BridgeError;

/// Coarse-grained data-visibility level for an access check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
  /// Records owned by the caller
  #[default]
  Own,
  /// Records visible to the caller's team
  Team,
  /// All records
  All,
}

/// One access check, as presented to a validator.
#[derive(Debug, Clone, Copy)]
pub struct AccessRequest<'a> {
  pub resource: &'a str,
  pub action: &'a str,
  pub scope: Scope,
  /// Permission strings held by the caller, e.g. `"customers:read"`
  pub permissions: &'a [String],
}

/// External authorization decision.
///
/// A returned error is treated identically to an explicit deny.
#[async_trait]
pub trait PermissionValidator: Send + Sync {
  async fn validate(&self, request: AccessRequest<'_>) -> Result<bool, BridgeError>;
}

/// Fire-and-forget audit destination.
pub trait AuditSink: Send + Sync {
  fn log_access(&self, record: AuditRecord);
}

/// Write-once record of a single gate evaluation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
  pub resource: String,
  pub action: String,
  pub scope: Scope,
  pub success: bool,
  pub timestamp: DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

/// Pairs a validator with an audit sink.
pub struct PermissionGate {
  validator: Arc<dyn PermissionValidator>,
  audit: Arc<dyn AuditSink>,
}

impl PermissionGate {
  pub fn new(validator: Arc<dyn PermissionValidator>, audit: Arc<dyn AuditSink>) -> Self {
    Self { validator, audit }
  }

  /// Evaluate an access check, emitting one audit record before returning.
  pub async fn check(
    &self,
    resource: &str,
    action: &str,
    scope: Scope,
    permissions: &[String],
  ) -> bool {
    let outcome = self
      .validator
      .validate(AccessRequest {
        resource,
        action,
        scope,
        permissions,
      })
      .await;

    let (granted, error) = match outcome {
      Ok(granted) => (granted, None),
      Err(e) => (false, Some(e.to_string())),
    };

    self.audit.log_access(AuditRecord {
      resource: resource.to_string(),
      action: action.to_string(),
      scope,
      success: granted,
      timestamp: Utc::now(),
      error,
    });

    granted
  }
}

/// Validator that grants everything. Useful for public endpoints and tests.
pub struct AllowAll;

#[async_trait]
impl PermissionValidator for AllowAll {
  async fn validate(&self, _request: AccessRequest<'_>) -> Result<bool, BridgeError> {
    Ok(true)
  }
}

/// Validator that grants access when the caller's permission set covers every
/// required permission. `*` matches everything; `resource:*` matches any
/// action on that resource.
pub struct RequiredPermissions {
  required: BTreeSet<String>,
}

impl RequiredPermissions {
  pub fn new(required: BTreeSet<String>) -> Self {
    Self { required }
  }

  fn covers(held: &[String], required: &str) -> bool {
    held.iter().any(|p| {
      if p == required || p == "*" {
        return true;
      }
      match (p.split_once(':'), required.split_once(':')) {
        (Some((resource, "*")), Some((req_resource, _))) => resource == req_resource,
        _ => false,
      }
    })
  }
}

#[async_trait]
impl PermissionValidator for RequiredPermissions {
  async fn validate(&self, request: AccessRequest<'_>) -> Result<bool, BridgeError> {
    Ok(
      self
        .required
        .iter()
        .all(|req| Self::covers(request.permissions, req)),
    )
  }
}

/// Audit sink that writes records to the `audit` tracing target.
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
  fn log_access(&self, record: AuditRecord) {
    tracing::info!(
      target: "audit",
      resource = %record.resource,
      action = %record.action,
      scope = ?record.scope,
      success = record.success,
      error = record.error.as_deref().unwrap_or(""),
      "access check"
    );
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Mutex;

  /// Audit sink that records everything it sees.
  pub(crate) struct RecordingAudit {
    pub records: Mutex<Vec<AuditRecord>>,
  }

  impl RecordingAudit {
    pub fn new() -> Arc<Self> {
      Arc::new(Self {
        records: Mutex::new(Vec::new()),
      })
    }
  }

  impl AuditSink for RecordingAudit {
    fn log_access(&self, record: AuditRecord) {
      self.records.lock().unwrap().push(record);
    }
  }

  struct DenyAll;

  #[async_trait]
  impl PermissionValidator for DenyAll {
    async fn validate(&self, _request: AccessRequest<'_>) -> Result<bool, BridgeError> {
      Ok(false)
    }
  }

  struct FailingValidator;

  #[async_trait]
  impl PermissionValidator for FailingValidator {
    async fn validate(&self, _request: AccessRequest<'_>) -> Result<bool, BridgeError> {
      Err(BridgeError::Internal {
        message: "validator unavailable".to_string(),
      })
    }
  }

  #[tokio::test]
  async fn test_grant_emits_audit_record() {
    let audit = RecordingAudit::new();
    let gate = PermissionGate::new(Arc::new(AllowAll), audit.clone());

    let granted = gate.check("customers", "fetchCustomers", Scope::Own, &[]).await;

    assert!(granted);
    let records = audit.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].success);
    assert!(records[0].error.is_none());
  }

  #[tokio::test]
  async fn test_deny_emits_audit_record() {
    let audit = RecordingAudit::new();
    let gate = PermissionGate::new(Arc::new(DenyAll), audit.clone());

    let granted = gate.check("proposals", "deleteProposal", Scope::All, &[]).await;

    assert!(!granted);
    let records = audit.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert!(!records[0].success);
  }

  #[tokio::test]
  async fn test_validator_error_is_a_deny() {
    let audit = RecordingAudit::new();
    let gate = PermissionGate::new(Arc::new(FailingValidator), audit.clone());

    let granted = gate.check("products", "fetchProducts", Scope::Team, &[]).await;

    assert!(!granted);
    let records = audit.records.lock().unwrap();
    assert_eq!(records[0].error.as_deref(), Some("Internal error: validator unavailable"));
  }

  #[tokio::test]
  async fn test_required_permissions_exact_match() {
    let validator = RequiredPermissions::new(
      ["customers:read".to_string()].into_iter().collect(),
    );
    let held = vec!["customers:read".to_string()];
    let ok = validator
      .validate(AccessRequest {
        resource: "customers",
        action: "fetchCustomers",
        scope: Scope::Own,
        permissions: &held,
      })
      .await
      .unwrap();
    assert!(ok);
  }

  #[tokio::test]
  async fn test_required_permissions_wildcards() {
    let validator = RequiredPermissions::new(
      ["customers:read".to_string(), "customers:write".to_string()]
        .into_iter()
        .collect(),
    );

    let resource_wildcard = vec!["customers:*".to_string()];
    let global_wildcard = vec!["*".to_string()];
    let wrong_resource = vec!["proposals:*".to_string()];

    for (held, expected) in [
      (&resource_wildcard, true),
      (&global_wildcard, true),
      (&wrong_resource, false),
    ] {
      let got = validator
        .validate(AccessRequest {
          resource: "customers",
          action: "createCustomer",
          scope: Scope::Own,
          permissions: held,
        })
        .await
        .unwrap();
      assert_eq!(got, expected, "held: {:?}", held);
    }
  }
}
