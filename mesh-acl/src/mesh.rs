//! A ready-to-use access control handle backed by the default configuration
//! backend.

use std::path::Path;

use mesh_acl_engine::{AccessRequest, ConfigStore};
use mesh_acl_policy::{Configuration, PolicyConfigError};

/// Access control for one application: the published configuration and the
/// checks evaluated against it.
///
/// Reloads are all-or-nothing. A configuration that fails validation leaves
/// the current snapshot in place.
#[derive(Debug, Default)]
pub struct MeshAcl {
    store: ConfigStore,
}

impl MeshAcl {
    /// Create a handle from a parsed configuration.
    pub fn from_config(config: Configuration) -> Result<Self, PolicyConfigError> {
        Ok(Self {
            store: ConfigStore::new(config.into_snapshot()?),
        })
    }

    /// Create a handle from a YAML string.
    pub fn from_yaml(content: &str) -> Result<Self, PolicyConfigError> {
        Self::from_config(Configuration::parse_yaml(content)?)
    }

    /// Create a handle from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, PolicyConfigError> {
        Self::from_config(Configuration::parse_toml(content)?)
    }

    /// Create a handle from a JSON string.
    pub fn from_json(content: &str) -> Result<Self, PolicyConfigError> {
        Self::from_config(Configuration::parse_json(content)?)
    }

    /// Create a handle from a YAML, JSON or TOML file.
    pub fn from_file(path: &Path) -> Result<Self, PolicyConfigError> {
        Self::from_config(Configuration::from_file(path)?)
    }

    /// No access control and no secret scopes: everything is allowed.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Validates `config` and publishes it as the next generation.
    pub fn reload(&self, config: Configuration) -> Result<(), PolicyConfigError> {
        self.store.publish(config.into_snapshot()?);
        Ok(())
    }

    pub fn reload_file(&self, path: &Path) -> Result<(), PolicyConfigError> {
        self.reload(Configuration::from_file(path)?)
    }

    pub fn is_allowed(&self, request: &AccessRequest<'_>) -> bool {
        self.store.is_allowed(request)
    }

    pub fn is_secret_allowed(&self, store_name: &str, key: &str) -> bool {
        self.store.is_secret_allowed(store_name, key)
    }
}
