//! # Mesh ACL Engine
//!
//! Core access-control engine for service-to-service invocation in a mesh.
//!
//! This crate provides:
//! - `AccessControlList`, the lookup-optimized form of an access control document
//! - the evaluator that allows or denies one inbound call from a caller's
//!   identity, target operation and HTTP verb
//! - `SecretsScope` allow/deny lists deciding which secrets an app may read
//! - `ConfigStore`, which publishes immutable configuration generations to
//!   concurrent request handlers

pub mod engine;
pub mod error;
pub mod identity;
pub mod observer;
pub mod secrets;
pub mod snapshot;
pub mod types;

pub use engine::{evaluate, is_operation_allowed, AccessDecision, AccessRequest};
pub use error::{AccessActionError, HttpVerbError, IdentityError};
pub use identity::{CallerIdentity, IdentityProvider, PeerContext, SpiffeIdentityProvider};
pub use observer::{
    DecisionEvent, DecisionObserver, NoopObserver, RecordingObserver, TracingObserver,
};
pub use secrets::{SecretsScope, SecretsScopeIndex};
pub use snapshot::{ConfigStore, PolicySnapshot};
pub use types::{
    AccessAction, AccessControlList, AppPolicy, HttpVerb, OperationRule, PolicyAction, WILDCARD,
};
