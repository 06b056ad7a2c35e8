//! Configuration generations and their publication to request handlers.
//!
//! A [`PolicySnapshot`] is immutable. Reloading builds a new snapshot and
//! swaps it into the [`ConfigStore`]; handlers that already hold the previous
//! `Arc` keep evaluating against it until they drop it.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::engine::{self, AccessDecision, AccessRequest};
use crate::observer::DecisionObserver;
use crate::secrets::SecretsScopeIndex;
use crate::types::AccessControlList;

/// One validated configuration generation.
#[derive(Debug, Clone, Default)]
pub struct PolicySnapshot {
    acl: Option<Arc<AccessControlList>>,
    secrets: SecretsScopeIndex,
}

impl PolicySnapshot {
    pub fn new(acl: Option<AccessControlList>, secrets: SecretsScopeIndex) -> Self {
        Self {
            acl: acl.map(Arc::new),
            secrets,
        }
    }

    /// `None` when no access control is configured.
    pub fn acl(&self) -> Option<&AccessControlList> {
        self.acl.as_deref()
    }

    pub fn secrets(&self) -> &SecretsScopeIndex {
        &self.secrets
    }

    pub fn is_allowed(&self, request: &AccessRequest<'_>) -> bool {
        engine::is_operation_allowed(request, self.acl())
    }

    pub fn evaluate(
        &self,
        request: &AccessRequest<'_>,
        observer: &dyn DecisionObserver,
    ) -> AccessDecision {
        engine::evaluate(request, self.acl(), observer)
    }

    pub fn is_secret_allowed(&self, store_name: &str, key: &str) -> bool {
        self.secrets.is_secret_allowed(store_name, key)
    }
}

/// Holds the current snapshot.
///
/// The lock only guards the pointer swap; evaluation happens on a cloned
/// `Arc` with no lock held.
#[derive(Debug, Default)]
pub struct ConfigStore {
    current: RwLock<Published>,
}

#[derive(Debug, Default)]
struct Published {
    generation: u64,
    snapshot: Arc<PolicySnapshot>,
}

impl ConfigStore {
    pub fn new(snapshot: PolicySnapshot) -> Self {
        Self {
            current: RwLock::new(Published {
                generation: 0,
                snapshot: Arc::new(snapshot),
            }),
        }
    }

    /// The snapshot in effect right now.
    pub fn current(&self) -> Arc<PolicySnapshot> {
        Arc::clone(&self.current.read().snapshot)
    }

    /// Number of snapshots published since construction.
    pub fn generation(&self) -> u64 {
        self.current.read().generation
    }

    /// Replaces the current snapshot, returning the one it superseded.
    pub fn publish(&self, snapshot: PolicySnapshot) -> Arc<PolicySnapshot> {
        let policies = snapshot.acl().map_or(0, AccessControlList::len);
        let scopes = snapshot.secrets().len();
        let next = Arc::new(snapshot);

        let (generation, previous) = {
            let mut current = self.current.write();
            current.generation += 1;
            (
                current.generation,
                std::mem::replace(&mut current.snapshot, next),
            )
        };

        tracing::info!(generation, policies, scopes, "published access control snapshot");
        previous
    }

    pub fn is_allowed(&self, request: &AccessRequest<'_>) -> bool {
        self.current().is_allowed(request)
    }

    pub fn is_secret_allowed(&self, store_name: &str, key: &str) -> bool {
        self.current().is_secret_allowed(store_name, key)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::secrets::SecretsScope;
    use crate::types::{AccessAction, PolicyAction};

    fn deny_all() -> PolicySnapshot {
        PolicySnapshot::new(
            Some(AccessControlList::new(PolicyAction::Deny, HashMap::new())),
            SecretsScopeIndex::new([SecretsScope::new(
                "vault",
                Some(AccessAction::Deny),
                vec![],
                vec![],
            )]),
        )
    }

    #[test]
    fn test_default_store_is_unrestricted() {
        let store = ConfigStore::default();
        assert!(store.is_allowed(&AccessRequest::new("app", "op")));
        assert!(store.is_secret_allowed("vault", "key"));
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn test_publish_swaps_snapshot() {
        let store = ConfigStore::default();
        let held = store.current();

        let previous = store.publish(deny_all());

        assert!(Arc::ptr_eq(&held, &previous));
        assert_eq!(store.generation(), 1);
        assert!(!store.is_allowed(&AccessRequest::new("app", "op")));
        assert!(!store.is_secret_allowed("vault", "key"));
        // A reader holding the old generation is unaffected.
        assert!(held.is_allowed(&AccessRequest::new("app", "op")));
    }

    #[test]
    fn test_concurrent_readers_during_publish() {
        let store = Arc::new(ConfigStore::new(deny_all()));
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        let snapshot = store.current();
                        let request = AccessRequest::new("app", "op");
                        // Each snapshot is internally consistent.
                        assert_eq!(snapshot.is_allowed(&request), snapshot.acl().is_none());
                    }
                })
            })
            .collect();

        for _ in 0..100 {
            store.publish(PolicySnapshot::default());
            store.publish(deny_all());
        }

        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(store.generation(), 200);
    }
}
