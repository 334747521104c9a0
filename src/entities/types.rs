//! Shared wire types for entity operations.
//!
//! Wire names are camelCase to match the remote API; these types are kept
//! separate from any UI-side view models.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One page of a list result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub total: u64,
}

/// Common list parameters: free-text search plus pagination.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub search: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub page: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub limit: Option<u32>,
}

impl ListParams {
  pub fn search(term: impl Into<String>) -> Self {
    Self {
      search: Some(term.into()),
      ..Self::default()
    }
  }

  /// Parameter object used for cache-key derivation.
  pub(crate) fn to_value(&self) -> Value {
    serde_json::to_value(self).unwrap_or_else(|_| json!({}))
  }

  /// Query-string pairs for the HTTP request.
  pub(crate) fn to_query(&self) -> Vec<(String, String)> {
    let mut query = Vec::new();
    if let Some(search) = &self.search {
      query.push(("search".to_string(), search.clone()));
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

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_list_params_skip_absent_fields() {
    let params = ListParams::search("acme");
    assert_eq!(params.to_value(), json!({"search": "acme"}));
    assert_eq!(params.to_query(), vec![("search".to_string(), "acme".to_string())]);
  }

  #[test]
  fn test_list_params_full() {
    let params = ListParams {
      search: Some("acme".to_string()),
      page: Some(2),
      limit: Some(50),
    };
    assert_eq!(params.to_query().len(), 3);
  }
}
