//! Runtime server configuration.

use std::path::{Path, PathBuf};

use campus_core::policy::PortalPolicy;
use serde::Deserialize;

/// Deserialised from `config.toml` layered under `CAMPUS_*` environment
/// variables. Nested keys use `__`, e.g. `CAMPUS_POLICY__SICK_LEAVE_DAYS`.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default)]
  pub policy:     PortalPolicy,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("campus.db") }

impl ServerConfig {
  /// Load from an optional TOML file, then the environment.
  pub fn load(file: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(
        config::Environment::with_prefix("CAMPUS")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
