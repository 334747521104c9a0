//! Configuration for the API client and per-entity bridge behavior.

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::auth::Scope;
use crate::error::BridgeError;

/// Per-bridge operation settings. Immutable after construction.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationConfig {
  /// Whether read results are cached at all
  #[serde(default = "default_true")]
  pub cache_enabled: bool,
  /// Extra attempts after a retryable failure (0 = never retry)
  #[serde(default)]
  pub retry_attempts: u32,
  /// Per-attempt deadline
  #[serde(default = "default_timeout_ms")]
  pub timeout_ms: u64,
  /// Whether the permission gate runs at all
  #[serde(default = "default_true")]
  pub require_auth: bool,
  /// Permissions the caller must hold, e.g. "customers:read"
  #[serde(default)]
  pub required_permissions: BTreeSet<String>,
  /// Scope applied when the caller doesn't specify one
  #[serde(default)]
  pub default_scope: Scope,
  /// How long cached read results stay valid
  #[serde(default = "default_cache_ttl_ms")]
  pub cache_ttl_ms: u64,
}

fn default_true() -> bool {
  true
}

fn default_timeout_ms() -> u64 {
  15_000
}

fn default_cache_ttl_ms() -> u64 {
  60_000
}

impl Default for OperationConfig {
  fn default() -> Self {
    Self {
      cache_enabled: true,
      retry_attempts: 0,
      timeout_ms: default_timeout_ms(),
      require_auth: true,
      required_permissions: BTreeSet::new(),
      default_scope: Scope::Own,
      cache_ttl_ms: default_cache_ttl_ms(),
    }
  }
}

/// Client-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the PosalPro REST API
  pub base_url: String,
  /// HTTP client timeout
  #[serde(default = "default_timeout_ms")]
  pub timeout_ms: u64,
  /// Defaults applied to every entity bridge
  #[serde(default)]
  pub operations: OperationConfig,
  /// Per-entity overrides, keyed by resource name (e.g. "proposals")
  #[serde(default)]
  pub entities: BTreeMap<String, OperationConfig>,
}

impl ApiConfig {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./posal-bridge.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/posal-bridge/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self, BridgeError> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(BridgeError::Internal {
          message: format!("Config file not found: {}", p.display()),
        });
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(BridgeError::Internal {
        message: "No configuration file found. Create one at ~/.config/posal-bridge/config.yaml"
          .to_string(),
      }),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("posal-bridge.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("posal-bridge").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self, BridgeError> {
    let contents = std::fs::read_to_string(path).map_err(|e| BridgeError::Internal {
      message: format!("Failed to read config file {}: {}", path.display(), e),
    })?;

    serde_yaml::from_str(&contents).map_err(|e| BridgeError::Internal {
      message: format!("Failed to parse config file {}: {}", path.display(), e),
    })
  }

  /// Operation settings for one entity: its override when present, otherwise
  /// the client-wide defaults.
  pub fn operation_config(&self, entity: &str) -> OperationConfig {
    self
      .entities
      .get(entity)
      .cloned()
      .unwrap_or_else(|| self.operations.clone())
  }

  /// Get the API token from environment variables.
  ///
  /// Checks POSALPRO_API_TOKEN first, then POSALPRO_TOKEN as fallback.
  pub fn api_token() -> Result<String, BridgeError> {
    std::env::var("POSALPRO_API_TOKEN")
      .or_else(|_| std::env::var("POSALPRO_TOKEN"))
      .map_err(|_| BridgeError::Internal {
        message:
          "API token not found. Set POSALPRO_API_TOKEN or POSALPRO_TOKEN environment variable."
            .to_string(),
      })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_operation_config_defaults() {
    let config = OperationConfig::default();
    assert!(config.cache_enabled);
    assert_eq!(config.retry_attempts, 0);
    assert_eq!(config.timeout_ms, 15_000);
    assert!(config.require_auth);
    assert_eq!(config.default_scope, Scope::Own);
    assert_eq!(config.cache_ttl_ms, 60_000);
  }

  #[test]
  fn test_parse_yaml_with_entity_overrides() {
    let yaml = r#"
base_url: https://api.posalpro.example
operations:
  cache_ttl_ms: 30000
entities:
  proposals:
    cache_ttl_ms: 5000
    retry_attempts: 2
    required_permissions: ["proposals:read"]
    default_scope: team
"#;

    let config: ApiConfig = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.timeout_ms, 15_000);
    assert_eq!(config.operations.cache_ttl_ms, 30_000);

    let proposals = config.operation_config("proposals");
    assert_eq!(proposals.cache_ttl_ms, 5_000);
    assert_eq!(proposals.retry_attempts, 2);
    assert_eq!(proposals.default_scope, Scope::Team);
    assert!(proposals.required_permissions.contains("proposals:read"));

    // Entities without an override use the client-wide defaults
    let customers = config.operation_config("customers");
    assert_eq!(customers.cache_ttl_ms, 30_000);
  }
}
