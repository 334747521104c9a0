//! Product entity bridge.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::customer::serialization_failure;
use super::types::{ListParams, Page};
use crate::api::ApiRequest;
use crate::bridge::{ApiBridge, CallerContext};
use crate::error::BridgeResult;

pub const RESOURCE: &str = "products";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: String,
  pub name: String,
  pub sku: String,
  pub price: f64,
  #[serde(default)]
  pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
  pub name: String,
  pub sku: String,
  pub price: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub price: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub is_active: Option<bool>,
}

/// Typed operations over `/products`.
pub struct ProductBridge {
  bridge: ApiBridge,
}

impl ProductBridge {
  pub fn new(bridge: ApiBridge) -> Self {
    Self { bridge }
  }

  pub async fn list(
    &self,
    params: &ListParams,
    caller: &CallerContext,
  ) -> BridgeResult<Page<Product>> {
    let request = ApiRequest::get("/products").with_query(params.to_query());
    self
      .bridge
      .read("fetchProducts", request, &params.to_value(), caller)
      .await
  }

  pub async fn get(&self, id: &str, caller: &CallerContext) -> BridgeResult<Product> {
    let request = ApiRequest::get(format!("/products/{}", id));
    self
      .bridge
      .read("getProduct", request, &json!({"id": id}), caller)
      .await
  }

  pub async fn create(
    &self,
    payload: &ProductCreate,
    caller: &CallerContext,
  ) -> BridgeResult<Product> {
    let body = serde_json::to_value(payload).map_err(|e| serialization_failure("createProduct", e))?;
    let request = ApiRequest::post("/products", body);
    self
      .bridge
      .write("createProduct", request, &["fetchProducts", "getProduct"], caller)
      .await
  }

  pub async fn update(
    &self,
    id: &str,
    payload: &ProductPatch,
    caller: &CallerContext,
  ) -> BridgeResult<Product> {
    let body = serde_json::to_value(payload).map_err(|e| serialization_failure("updateProduct", e))?;
    let request = ApiRequest::patch(format!("/products/{}", id), body);
    self
      .bridge
      .write("updateProduct", request, &["fetchProducts", "getProduct"], caller)
      .await
  }

  pub async fn delete(&self, id: &str, caller: &CallerContext) -> BridgeResult<()> {
    let request = ApiRequest::delete(format!("/products/{}", id));
    self
      .bridge
      .write("deleteProduct", request, &["fetchProducts", "getProduct"], caller)
      .await
  }

  pub fn bridge(&self) -> &ApiBridge {
    &self.bridge
  }
}
