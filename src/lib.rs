//! Client-side access layer for the PosalPro REST API.
//!
//! Each entity type (customers, products, proposals) gets a *bridge*: a typed
//! facade over one [`bridge::ApiBridge`] that combines
//! - a permission gate with audit emission on every evaluation,
//! - an in-memory TTL cache keyed deterministically by operation + parameters,
//! - in-flight request deduplication (at most one fetch per key),
//! - uniform failure envelopes instead of raw transport errors,
//! - best-effort analytics on every terminal state.
//!
//! Bridges are plain constructed values: build a [`client::PosalClient`] at
//! your composition root and keep the entity bridges it hands out.
//!
//! ```no_run
//! use posal_bridge::{ApiConfig, CallerContext, ListParams, PosalClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ApiConfig::load(None)?;
//! let client = PosalClient::new(config)?;
//! let customers = client.customers();
//!
//! let caller = CallerContext::new(vec!["customers:read".to_string()]);
//! let page = customers.list(&ListParams::search("acme"), &caller).await?;
//! println!("{} customers", page.total);
//! # Ok(())
//! # }
//! ```

pub mod analytics;
pub mod api;
pub mod auth;
pub mod bridge;
pub mod cache;
pub mod client;
pub mod config;
pub mod entities;
pub mod error;
pub mod logging;

pub use analytics::{AnalyticsSink, EventPriority, NoopAnalytics, TracingAnalytics};
pub use api::{ApiMethod, ApiRequest, HttpTransport, Transport};
pub use auth::{
  AccessRequest, AllowAll, AuditRecord, AuditSink, PermissionGate, PermissionValidator,
  RequiredPermissions, Scope, TracingAuditSink,
};
pub use bridge::{ApiBridge, CallerContext};
pub use client::PosalClient;
pub use config::{ApiConfig, OperationConfig};
pub use entities::{
  Customer, CustomerBridge, ListParams, Page, Product, ProductBridge, Proposal, ProposalBridge,
  ProposalStats, ProposalStatus, ProposalTemplate,
};
pub use error::{BridgeError, BridgeResult, Failure};
