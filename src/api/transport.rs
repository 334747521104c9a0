//! HTTP transport for the PosalPro REST API.

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::error::BridgeError;

/// HTTP method for a bridge request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
  Get,
  Post,
  Patch,
  Delete,
}

impl ApiMethod {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Get => "GET",
      Self::Post => "POST",
      Self::Patch => "PATCH",
      Self::Delete => "DELETE",
    }
  }
}

/// A request as handed to the transport: method, path, query or body.
#[derive(Debug, Clone)]
pub struct ApiRequest {
  pub method: ApiMethod,
  /// Path relative to the API base URL, e.g. `/customers/c-1`
  pub path: String,
  pub query: Vec<(String, String)>,
  pub body: Option<Value>,
}

impl ApiRequest {
  pub fn get(path: impl Into<String>) -> Self {
    Self {
      method: ApiMethod::Get,
      path: path.into(),
      query: Vec::new(),
      body: None,
    }
  }

  pub fn post(path: impl Into<String>, body: Value) -> Self {
    Self {
      method: ApiMethod::Post,
      path: path.into(),
      query: Vec::new(),
      body: Some(body),
    }
  }

  pub fn patch(path: impl Into<String>, body: Value) -> Self {
    Self {
      method: ApiMethod::Patch,
      path: path.into(),
      query: Vec::new(),
      body: Some(body),
    }
  }

  pub fn delete(path: impl Into<String>) -> Self {
    Self {
      method: ApiMethod::Delete,
      path: path.into(),
      query: Vec::new(),
      body: None,
    }
  }

  pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
    self.query = query;
    self
  }
}

/// Sends requests to the remote API and returns the raw JSON body.
///
/// Implementations map connection-level trouble to [`BridgeError::Network`] or
/// [`BridgeError::Timeout`]; envelope interpretation happens one layer up.
#[async_trait]
pub trait Transport: Send + Sync {
  async fn send(&self, request: ApiRequest) -> Result<Value, BridgeError>;
}

/// Transport backed by reqwest.
pub struct HttpTransport {
  client: reqwest::Client,
  base_url: Url,
}

impl HttpTransport {
  /// Create a transport for the given API base URL.
  ///
  /// `token`, when present, is sent as a bearer credential on every request.
  pub fn new(base_url: &str, timeout_ms: u64, token: Option<String>) -> Result<Self, BridgeError> {
    // A trailing slash makes Url::join treat the base path as a directory.
    let normalized = if base_url.ends_with('/') {
      base_url.to_string()
    } else {
      format!("{}/", base_url)
    };

    let base_url = Url::parse(&normalized).map_err(|e| BridgeError::Internal {
      message: format!("Invalid API base URL {}: {}", normalized, e),
    })?;

    let mut headers = reqwest::header::HeaderMap::new();
    if let Some(token) = token {
      let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token)).map_err(
        |e| BridgeError::Internal {
          message: format!("Invalid API token: {}", e),
        },
      )?;
      headers.insert(reqwest::header::AUTHORIZATION, value);
    }

    let client = reqwest::Client::builder()
      .timeout(std::time::Duration::from_millis(timeout_ms))
      .default_headers(headers)
      .build()
      .map_err(|e| BridgeError::Internal {
        message: format!("Failed to build HTTP client: {}", e),
      })?;

    Ok(Self { client, base_url })
  }

  fn url_for(&self, request: &ApiRequest) -> Result<Url, BridgeError> {
    let mut url = self
      .base_url
      .join(request.path.trim_start_matches('/'))
      .map_err(|e| BridgeError::Internal {
        message: format!("Invalid request path {}: {}", request.path, e),
      })?;

    if !request.query.is_empty() {
      let mut pairs = url.query_pairs_mut();
      for (name, value) in &request.query {
        pairs.append_pair(name, value);
      }
    }

    Ok(url)
  }
}

#[async_trait]
impl Transport for HttpTransport {
  async fn send(&self, request: ApiRequest) -> Result<Value, BridgeError> {
    let url = self.url_for(&request)?;

    let mut builder = match request.method {
      ApiMethod::Get => self.client.get(url),
      ApiMethod::Post => self.client.post(url),
      ApiMethod::Patch => self.client.patch(url),
      ApiMethod::Delete => self.client.delete(url),
    };

    if let Some(body) = &request.body {
      builder = builder.json(body);
    }

    let response = builder.send().await.map_err(|e| {
      if e.is_timeout() {
        BridgeError::Network {
          message: "Request timeout".to_string(),
          status: None,
        }
      } else {
        BridgeError::Network {
          message: format!("Network request failed: {}", e),
          status: None,
        }
      }
    })?;

    let status = response.status();
    let body: Value = response.json().await.map_err(|e| BridgeError::Validation {
      message: format!("Response body is not valid JSON: {}", e),
    })?;

    if !status.is_success() {
      // Prefer the server's error string when the body carries one.
      let message = body
        .get("error")
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| format!("HTTP {}", status));
      return Err(BridgeError::Network {
        message,
        status: Some(status.as_u16()),
      });
    }

    Ok(body)
  }
}
