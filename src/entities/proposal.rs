//! Proposal entity bridge.
//!
//! Proposals carry two entity-specific reads on top of CRUD: aggregate stats
//! for the dashboard and the proposal template catalog. Mutations invalidate
//! the stats cache as well, since any create/update/delete changes the counts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::customer::serialization_failure;
use super::types::Page;
use crate::api::ApiRequest;
use crate::bridge::{ApiBridge, CallerContext};
use crate::error::BridgeResult;

pub const RESOURCE: &str = "proposals";

/// Cache-key substrings dropped by every proposal mutation.
const MUTATION_INVALIDATES: &[&str] = &["fetchProposals", "getProposal", "getProposalStats"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
  Draft,
  InReview,
  Submitted,
  Won,
  Lost,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
  pub id: String,
  pub title: String,
  pub status: ProposalStatus,
  pub customer_id: String,
  #[serde(default)]
  pub due_date: Option<DateTime<Utc>>,
  #[serde(default)]
  pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalListParams {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub search: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status: Option<ProposalStatus>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub page: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub limit: Option<u32>,
}

impl ProposalListParams {
  fn to_value(&self) -> serde_json::Value {
    serde_json::to_value(self).unwrap_or_else(|_| json!({}))
  }

  fn to_query(&self) -> Vec<(String, String)> {
    let mut query = Vec::new();
    if let Some(search) = &self.search {
      query.push(("search".to_string(), search.clone()));
    }
    if let Some(status) = self.status {
      // snake_case wire form, matching the serde rename
      let value = match status {
        ProposalStatus::Draft => "draft",
        ProposalStatus::InReview => "in_review",
        ProposalStatus::Submitted => "submitted",
        ProposalStatus::Won => "won",
        ProposalStatus::Lost => "lost",
      };
      query.push(("status".to_string(), value.to_string()));
    }
    if let Some(page) = self.page {
      query.push(("page".to_string(), page.to_string()));
    }
    if let Some(limit) = self.limit {
      query.push(("limit".to_string(), limit.to_string()));
    }
    query
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalCreate {
  pub title: String,
  pub customer_id: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status: Option<ProposalStatus>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub due_date: Option<DateTime<Utc>>,
}

/// Aggregate proposal counts for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalStats {
  pub total: u64,
  pub in_progress: u64,
  pub won: u64,
  pub lost: u64,
  #[serde(default)]
  pub overdue: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalTemplate {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
}

/// Typed operations over `/proposals`.
pub struct ProposalBridge {
  bridge: ApiBridge,
}

impl ProposalBridge {
  pub fn new(bridge: ApiBridge) -> Self {
    Self { bridge }
  }

  pub async fn list(
    &self,
    params: &ProposalListParams,
    caller: &CallerContext,
  ) -> BridgeResult<Page<Proposal>> {
    let request = ApiRequest::get("/proposals").with_query(params.to_query());
    self
      .bridge
      .read("fetchProposals", request, &params.to_value(), caller)
      .await
  }

  pub async fn get(&self, id: &str, caller: &CallerContext) -> BridgeResult<Proposal> {
    let request = ApiRequest::get(format!("/proposals/{}", id));
    self
      .bridge
      .read("getProposal", request, &json!({"id": id}), caller)
      .await
  }

  /// Aggregate counts across all proposals visible to the caller.
  pub async fn stats(&self, caller: &CallerContext) -> BridgeResult<ProposalStats> {
    let request = ApiRequest::get("/proposals/stats");
    self
      .bridge
      .read("getProposalStats", request, &json!({}), caller)
      .await
  }

  /// Available proposal templates.
  pub async fn templates(&self, caller: &CallerContext) -> BridgeResult<Vec<ProposalTemplate>> {
    let request = ApiRequest::get("/proposals/templates");
    self
      .bridge
      .read("fetchProposalTemplates", request, &json!({}), caller)
      .await
  }

  pub async fn create(
    &self,
    payload: &ProposalCreate,
    caller: &CallerContext,
  ) -> BridgeResult<Proposal> {
    let body =
      serde_json::to_value(payload).map_err(|e| serialization_failure("createProposal", e))?;
    let request = ApiRequest::post("/proposals", body);
    self
      .bridge
      .write("createProposal", request, MUTATION_INVALIDATES, caller)
      .await
  }

  pub async fn update(
    &self,
    id: &str,
    payload: &ProposalPatch,
    caller: &CallerContext,
  ) -> BridgeResult<Proposal> {
    let body =
      serde_json::to_value(payload).map_err(|e| serialization_failure("updateProposal", e))?;
    let request = ApiRequest::patch(format!("/proposals/{}", id), body);
    self
      .bridge
      .write("updateProposal", request, MUTATION_INVALIDATES, caller)
      .await
  }

  pub async fn delete(&self, id: &str, caller: &CallerContext) -> BridgeResult<()> {
    let request = ApiRequest::delete(format!("/proposals/{}", id));
    self
      .bridge
      .write("deleteProposal", request, MUTATION_INVALIDATES, caller)
      .await
  }

  pub fn bridge(&self) -> &ApiBridge {
    &self.bridge
  }
}
