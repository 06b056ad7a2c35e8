//! Translation of configuration documents into engine snapshots.

use std::collections::HashMap;
use std::path::Path;

use mesh_acl_engine::{AccessControlList, AppPolicy, OperationRule, PolicyAction, PolicySnapshot};
use tracing::{info, warn};

use crate::config::{AccessControlSpec, AppPolicySpec, Configuration, PolicyConfigError};
use crate::validate::{build_secrets_index, validate_access_control};

/// Creates the in-memory access control list for fast lookup.
///
/// Performs no validation: when two policies name the same app the later one
/// replaces the earlier one. Action literals are normalized, not checked.
pub fn translate_access_control(spec: &AccessControlSpec) -> AccessControlList {
    let mut policies = HashMap::with_capacity(spec.app_policies.len());

    for app_policy in &spec.app_policies {
        let policy = translate_app_policy(app_policy);
        if policies.insert(policy.app_name.clone(), policy).is_some() {
            warn!(
                app = %app_policy.app_name,
                "access control policy replaced by a later duplicate"
            );
        }
    }

    AccessControlList::new(PolicyAction::from_literal(&spec.default_action), policies)
}

fn translate_app_policy(spec: &AppPolicySpec) -> AppPolicy {
    AppPolicy {
        app_name: spec.app_name.clone(),
        default_action: PolicyAction::from_literal(&spec.default_action),
        trust_domain: spec.trust_domain.clone(),
        operations: spec
            .operations
            .iter()
            .map(|op| {
                OperationRule::new(
                    op.operation.as_str(),
                    op.http_verbs.iter().map(String::as_str),
                    PolicyAction::from_literal(&op.action),
                )
            })
            .collect(),
    }
}

impl Configuration {
    /// Validates and translates this configuration into a snapshot.
    ///
    /// Fails on duplicate store names, invalid default access values and
    /// duplicate app policies; nothing is returned unless every check passes.
    pub fn into_snapshot(self) -> Result<PolicySnapshot, PolicyConfigError> {
        let spec = self.spec;

        let acl = match &spec.access_control {
            Some(access_control) => {
                validate_access_control(access_control)?;
                Some(translate_access_control(access_control))
            }
            None => None,
        };
        let secrets = build_secrets_index(spec.secrets.scopes)?;

        info!(
            access_control = acl.is_some(),
            policies = acl.as_ref().map_or(0, AccessControlList::len),
            scopes = secrets.len(),
            "loaded access control configuration"
        );

        Ok(PolicySnapshot::new(acl, secrets))
    }
}

/// Validates and translates a parsed configuration into a snapshot.
pub fn load_snapshot(config: Configuration) -> Result<PolicySnapshot, PolicyConfigError> {
    config.into_snapshot()
}

/// Load a snapshot from a YAML, JSON or TOML file.
pub fn load_file(path: &Path) -> Result<PolicySnapshot, PolicyConfigError> {
    load_snapshot(Configuration::from_file(path)?)
}

/// Load a snapshot from a YAML string.
pub fn load_yaml(content: &str) -> Result<PolicySnapshot, PolicyConfigError> {
    load_snapshot(Configuration::parse_yaml(content)?)
}

/// Load a snapshot from a TOML string.
pub fn load_toml(content: &str) -> Result<PolicySnapshot, PolicyConfigError> {
    load_snapshot(Configuration::parse_toml(content)?)
}

/// Load a snapshot from a JSON string.
pub fn load_json(content: &str) -> Result<PolicySnapshot, PolicyConfigError> {
    load_snapshot(Configuration::parse_json(content)?)
}
