//! Load-time validation of configuration documents.
//!
//! Any error here fails the whole load, so a partially valid configuration
//! never reaches request handlers.

use std::collections::HashSet;

use mesh_acl_engine::{AccessAction, SecretsScope, SecretsScopeIndex};
use thiserror::Error;

use crate::config::{AccessControlSpec, SecretsScopeSpec};

/// A configuration document that cannot be published.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0:?} storeName is repeated in secrets configuration")]
    DuplicateStoreName(String),

    #[error("defaultAccess {value:?} of store {store_name:?} can be either allow or deny")]
    InvalidDefaultAccess { store_name: String, value: String },

    #[error("{0:?} app has more than one access control policy")]
    DuplicateAppPolicy(String),
}

/// Checks secret scopes and sorts their key lists in place.
///
/// Fails on a repeated store name or on a default access that is neither
/// `allow` nor `deny`. Scopes before the failing one may already be sorted.
pub fn validate_secrets(scopes: &mut [SecretsScopeSpec]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for scope in scopes.iter_mut() {
        check_scope(&mut seen, scope)?;

        scope.allowed_secrets.sort();
        scope.denied_secrets.sort();
    }

    Ok(())
}

/// Rejects access control sections that name the same app twice.
pub fn validate_access_control(spec: &AccessControlSpec) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for policy in &spec.app_policies {
        if !seen.insert(policy.app_name.as_str()) {
            return Err(ConfigError::DuplicateAppPolicy(policy.app_name.clone()));
        }
    }
    Ok(())
}

/// Validates the scopes and builds the lookup index from them.
///
/// Applies the same checks as [`validate_secrets`] in a single pass; the key
/// lists are sorted once, by [`SecretsScope::new`].
pub fn build_secrets_index(
    scopes: Vec<SecretsScopeSpec>,
) -> Result<SecretsScopeIndex, ConfigError> {
    let mut seen = HashSet::new();

    let mut built = Vec::with_capacity(scopes.len());
    for scope in scopes {
        let default_access = check_scope(&mut seen, &scope)?;
        built.push(SecretsScope::new(
            scope.store_name,
            default_access,
            scope.allowed_secrets,
            scope.denied_secrets,
        ));
    }

    Ok(SecretsScopeIndex::new(built))
}

/// Rejects a repeated store name and returns the parsed default access.
fn check_scope(
    seen: &mut HashSet<String>,
    scope: &SecretsScopeSpec,
) -> Result<Option<AccessAction>, ConfigError> {
    if !seen.insert(scope.store_name.clone()) {
        return Err(ConfigError::DuplicateStoreName(scope.store_name.clone()));
    }
    parse_default_access(scope)
}

fn parse_default_access(scope: &SecretsScopeSpec) -> Result<Option<AccessAction>, ConfigError> {
    if scope.default_access.is_empty() {
        return Ok(None);
    }
    scope
        .default_access
        .parse::<AccessAction>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidDefaultAccess {
            store_name: scope.store_name.clone(),
            value: scope.default_access.clone(),
        })
}
