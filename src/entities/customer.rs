//! Customer entity bridge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::types::{ListParams, Page};
use crate::api::ApiRequest;
use crate::bridge::{ApiBridge, CallerContext};
use crate::error::{BridgeResult, Failure};

pub const RESOURCE: &str = "customers";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub email: Option<String>,
  /// Commercial tier, e.g. "standard", "premium", "enterprise"
  #[serde(default)]
  pub tier: Option<String>,
  #[serde(default)]
  pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCreate {
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tier: Option<String>,
}

/// Partial update; absent fields are left untouched by the server.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tier: Option<String>,
}

/// Typed operations over `/customers`, backed by one [`ApiBridge`].
pub struct CustomerBridge {
  bridge: ApiBridge,
}

impl CustomerBridge {
  pub fn new(bridge: ApiBridge) -> Self {
    Self { bridge }
  }

  pub async fn list(
    &self,
    params: &ListParams,
    caller: &CallerContext,
  ) -> BridgeResult<Page<Customer>> {
    let request = ApiRequest::get("/customers").with_query(params.to_query());
    self
      .bridge
      .read("fetchCustomers", request, &params.to_value(), caller)
      .await
  }

  pub async fn get(&self, id: &str, caller: &CallerContext) -> BridgeResult<Customer> {
    let request = ApiRequest::get(format!("/customers/{}", id));
    self
      .bridge
      .read("getCustomer", request, &json!({"id": id}), caller)
      .await
  }

  pub async fn create(
    &self,
    payload: &CustomerCreate,
    caller: &CallerContext,
  ) -> BridgeResult<Customer> {
    let body = serde_json::to_value(payload)
      .map_err(|e| serialization_failure("createCustomer", e))?;
    let request = ApiRequest::post("/customers", body);
    self
      .bridge
      .write("createCustomer", request, &["fetchCustomers", "getCustomer"], caller)
      .await
  }

  pub async fn update(
    &self,
    id: &str,
    payload: &CustomerPatch,
    caller: &CallerContext,
  ) -> BridgeResult<Customer> {
    let body = serde_json::to_value(payload)
      .map_err(|e| serialization_failure("updateCustomer", e))?;
    let request = ApiRequest::patch(format!("/customers/{}", id), body);
    self
      .bridge
      .write("updateCustomer", request, &["fetchCustomers", "getCustomer"], caller)
      .await
  }

  pub async fn delete(&self, id: &str, caller: &CallerContext) -> BridgeResult<()> {
    let request = ApiRequest::delete(format!("/customers/{}", id));
    self
      .bridge
      .write("deleteCustomer", request, &["fetchCustomers", "getCustomer"], caller)
      .await
  }

  pub fn bridge(&self) -> &ApiBridge {
    &self.bridge
  }
}

pub(crate) fn serialization_failure(operation: &str, e: serde_json::Error) -> Failure {
  Failure::normalize(
    &crate::error::BridgeError::Serialization {
      message: format!("Failed to serialize request payload: {}", e),
    },
    operation,
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::testing::StubTransport;
  use crate::api::ApiMethod;
  use crate::config::OperationConfig;
  use std::sync::Arc;

  fn open_bridge(transport: Arc<StubTransport>) -> CustomerBridge {
    let config = OperationConfig {
      require_auth: false,
      ..OperationConfig::default()
    };
    CustomerBridge::new(ApiBridge::new(RESOURCE, transport, config))
  }

  #[tokio::test]
  async fn test_list_builds_request_and_decodes_page() {
    let transport = Arc::new(StubTransport::always(json!({
      "items": [{"id": "c-1", "name": "Acme"}],
      "total": 1
    })));
    let customers = open_bridge(transport.clone());

    let page = customers
      .list(&ListParams::search("acme"), &CallerContext::default())
      .await
      .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "Acme");

    let requests = transport.requests.lock().unwrap();
    assert_eq!(requests[0].method, ApiMethod::Get);
    assert_eq!(requests[0].path, "/customers");
    assert_eq!(requests[0].query, vec![("search".to_string(), "acme".to_string())]);
  }

  #[tokio::test]
  async fn test_get_targets_detail_path() {
    let transport = Arc::new(StubTransport::always(json!({"id": "c-7", "name": "Globex"})));
    let customers = open_bridge(transport.clone());

    let customer = customers.get("c-7", &CallerContext::default()).await.unwrap();
    assert_eq!(customer.id, "c-7");

    let requests = transport.requests.lock().unwrap();
    assert_eq!(requests[0].path, "/customers/c-7");
  }

  #[tokio::test]
  async fn test_delete_accepts_empty_data() {
    let transport = Arc::new(StubTransport::new(vec![Ok(json!({"success": true}))]));
    let customers = open_bridge(transport.clone());

    customers.delete("c-7", &CallerContext::default()).await.unwrap();

    let requests = transport.requests.lock().unwrap();
    assert_eq!(requests[0].method, ApiMethod::Delete);
  }

  #[tokio::test]
  async fn test_patch_omits_absent_fields() {
    let transport = Arc::new(StubTransport::always(json!({"id": "c-7", "name": "Globex"})));
    let customers = open_bridge(transport.clone());

    let patch = CustomerPatch {
      tier: Some("premium".to_string()),
      ..CustomerPatch::default()
    };
    customers.update("c-7", &patch, &CallerContext::default()).await.unwrap();

    let requests = transport.requests.lock().unwrap();
    assert_eq!(requests[0].body, Some(json!({"tier": "premium"})));
  }
}
