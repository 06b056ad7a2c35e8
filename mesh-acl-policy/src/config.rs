//! Configuration documents for the access-control engine.
//!
//! A configuration resource carries an optional access control section and
//! a list of secret scopes. Documents can be written as YAML (the resource
//! format used by the control plane), JSON, or TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validate::ConfigError;

/// Errors from loading a configuration document.
#[derive(Error, Debug)]
pub enum PolicyConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to parse configuration YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to parse configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported configuration file extension: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ConfigError),
}

/// Top-level configuration resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub spec: ConfigurationSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationSpec {
    /// Service invocation access control. Absent means unrestricted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_control: Option<AccessControlSpec>,

    /// Secret-store scopes.
    #[serde(default)]
    pub secrets: SecretsSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretsSpec {
    #[serde(default)]
    pub scopes: Vec<SecretsScopeSpec>,
}

/// Allow/deny lists for one secret store, as written in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretsScopeSpec {
    /// `allow`, `deny` (any case), or empty for the default (`allow`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_access: String,
    pub store_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_secrets: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub denied_secrets: Vec<String>,
}

/// Service invocation access control section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlSpec {
    /// Action for callers without an app policy.
    #[serde(default)]
    pub default_action: String,
    #[serde(default, rename = "policies")]
    pub app_policies: Vec<AppPolicySpec>,
}

/// Policy for one calling app.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppPolicySpec {
    #[serde(rename = "app")]
    pub app_name: String,
    #[serde(default)]
    pub default_action: String,
    /// Trust domain the caller must belong to, or `*`.
    #[serde(default)]
    pub trust_domain: String,
    #[serde(default)]
    pub operations: Vec<AppOperationSpec>,
}

/// Operation rule for one calling app.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppOperationSpec {
    /// Path prefix, e.g. `/orders`.
    #[serde(rename = "name")]
    pub operation: String,
    #[serde(default, rename = "httpVerb")]
    pub http_verbs: Vec<String>,
    #[serde(default)]
    pub action: String,
}

impl Configuration {
    /// Load a configuration file, choosing the format from its extension.
    pub fn from_file(path: &Path) -> Result<Self, PolicyConfigError> {
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("yaml") | Some("yml") => Self::parse_yaml(&content),
            Some("json") => Self::parse_json(&content),
            Some("toml") => Self::parse_toml(&content),
            _ => Err(PolicyConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn parse_yaml(content: &str) -> Result<Self, PolicyConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn parse_json(content: &str) -> Result<Self, PolicyConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn parse_toml(content: &str) -> Result<Self, PolicyConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn access_control(&self) -> Option<&AccessControlSpec> {
        self.spec.access_control.as_ref()
    }

    pub fn secret_scopes(&self) -> &[SecretsScopeSpec] {
        &self.spec.secrets.scopes
    }
}
