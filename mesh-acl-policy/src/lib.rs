//! # Mesh ACL Policy
//!
//! Default configuration backend for the mesh ACL engine.
//!
//! Parses configuration documents (YAML, JSON or TOML), validates secret
//! scopes and access control sections, and translates them into the
//! immutable snapshots the engine evaluates against.

mod config;
mod policy;
mod validate;

pub use config::{
    AccessControlSpec, AppOperationSpec, AppPolicySpec, Configuration, ConfigurationSpec,
    PolicyConfigError, SecretsScopeSpec, SecretsSpec,
};
pub use policy::{
    load_file, load_json, load_snapshot, load_toml, load_yaml, translate_access_control,
};
pub use validate::{
    build_secrets_index, validate_access_control, validate_secrets, ConfigError,
};
