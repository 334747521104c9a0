//! Composition root: builds entity bridges over a shared transport.

use std::sync::Arc;

use crate::analytics::{AnalyticsSink, TracingAnalytics};
use crate::api::{HttpTransport, Transport};
use crate::auth::{AuditSink, PermissionValidator, RequiredPermissions, TracingAuditSink};
use crate::bridge::ApiBridge;
use crate::config::ApiConfig;
use crate::entities::{customer, product, proposal, CustomerBridge, ProductBridge, ProposalBridge};
use crate::error::BridgeError;

/// Client for the PosalPro API.
///
/// Holds the shared transport and the validator/audit/analytics handles, and
/// hands out entity bridges. Each bridge owns its own cache and in-flight
/// tracker; the usual pattern is to construct each bridge once and keep it
/// for the lifetime of the application.
pub struct PosalClient {
  config: ApiConfig,
  transport: Arc<dyn Transport>,
  validator: Option<Arc<dyn PermissionValidator>>,
  audit: Arc<dyn AuditSink>,
  analytics: Arc<dyn AnalyticsSink>,
}

impl PosalClient {
  /// Build a client with an HTTP transport from configuration. The API token
  /// is read from the environment when present.
  pub fn new(config: ApiConfig) -> Result<Self, BridgeError> {
    let token = ApiConfig::api_token().ok();
    let transport = HttpTransport::new(&config.base_url, config.timeout_ms, token)?;
    Ok(Self::with_transport(config, Arc::new(transport)))
  }

  /// Build a client over an existing transport (tests, custom stacks).
  pub fn with_transport(config: ApiConfig, transport: Arc<dyn Transport>) -> Self {
    Self {
      config,
      transport,
      validator: None,
      audit: Arc::new(TracingAuditSink),
      analytics: Arc::new(TracingAnalytics),
    }
  }

  /// Use an external permission validator instead of the per-bridge
  /// required-permissions default.
  pub fn with_validator(mut self, validator: Arc<dyn PermissionValidator>) -> Self {
    self.validator = Some(validator);
    self
  }

  pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
    self.audit = audit;
    self
  }

  pub fn with_analytics(mut self, analytics: Arc<dyn AnalyticsSink>) -> Self {
    self.analytics = analytics;
    self
  }

  fn bridge_for(&self, entity: &str) -> ApiBridge {
    let config = self.config.operation_config(entity);
    let validator: Arc<dyn PermissionValidator> = match &self.validator {
      Some(v) => Arc::clone(v),
      None => Arc::new(RequiredPermissions::new(config.required_permissions.clone())),
    };
    ApiBridge::new(entity, Arc::clone(&self.transport), config)
      .with_gate(validator, Arc::clone(&self.audit))
      .with_analytics(Arc::clone(&self.analytics))
  }

  pub fn customers(&self) -> CustomerBridge {
    CustomerBridge::new(self.bridge_for(customer::RESOURCE))
  }

  pub fn products(&self) -> ProductBridge {
    ProductBridge::new(self.bridge_for(product::RESOURCE))
  }

  pub fn proposals(&self) -> ProposalBridge {
    ProposalBridge::new(self.bridge_for(proposal::RESOURCE))
  }
}
