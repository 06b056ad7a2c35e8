//! Secret-store scopes: which secret keys an application may read.

use std::collections::HashMap;

use crate::types::AccessAction;

/// Allow/deny configuration for the keys of one secret store.
///
/// Both key lists are sorted on construction and never change afterward,
/// so membership is a binary search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretsScope {
    store_name: String,
    default_access: Option<AccessAction>,
    allowed_secrets: Vec<String>,
    denied_secrets: Vec<String>,
}

impl SecretsScope {
    pub fn new(
        store_name: impl Into<String>,
        default_access: Option<AccessAction>,
        mut allowed_secrets: Vec<String>,
        mut denied_secrets: Vec<String>,
    ) -> Self {
        allowed_secrets.sort();
        denied_secrets.sort();
        Self {
            store_name: store_name.into(),
            default_access,
            allowed_secrets,
            denied_secrets,
        }
    }

    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    pub fn default_access(&self) -> Option<AccessAction> {
        self.default_access
    }

    pub fn allowed_secrets(&self) -> &[String] {
        &self.allowed_secrets
    }

    pub fn denied_secrets(&self) -> &[String] {
        &self.denied_secrets
    }

    /// Whether `key` may be read from this store.
    ///
    /// A non-empty allow list is authoritative: the deny list and the default
    /// access are not consulted. Otherwise a denied key is refused, and
    /// anything else follows the default access (allow when unset).
    pub fn is_secret_allowed(&self, key: &str) -> bool {
        let baseline = match self.default_access {
            Some(AccessAction::Deny) => AccessAction::Deny,
            _ => AccessAction::Allow,
        };

        if !self.allowed_secrets.is_empty() {
            return contains_key(&self.allowed_secrets, key);
        }

        if contains_key(&self.denied_secrets, key) {
            return false;
        }

        baseline == AccessAction::Allow
    }
}

fn contains_key(sorted: &[String], key: &str) -> bool {
    sorted.binary_search_by(|probe| probe.as_str().cmp(key)).is_ok()
}

/// Secret scopes keyed by store name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretsScopeIndex {
    scopes: HashMap<String, SecretsScope>,
}

impl SecretsScopeIndex {
    /// Builds the index from scopes whose store names were already checked
    /// for uniqueness. A repeated name keeps the last scope.
    pub fn new(scopes: impl IntoIterator<Item = SecretsScope>) -> Self {
        Self {
            scopes: scopes
                .into_iter()
                .map(|scope| (scope.store_name.clone(), scope))
                .collect(),
        }
    }

    pub fn scope(&self, store_name: &str) -> Option<&SecretsScope> {
        self.scopes.get(store_name)
    }

    /// Whether `key` may be read from `store_name`.
    ///
    /// A store without a configured scope is unrestricted.
    pub fn is_secret_allowed(&self, store_name: &str, key: &str) -> bool {
        self.scopes
            .get(store_name)
            .map_or(true, |scope| scope.is_secret_allowed(key))
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}
