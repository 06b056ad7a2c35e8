//! # Mesh ACL
//!
//! Convenience crate that re-exports the mesh ACL engine with the default
//! configuration backend.
//!
//! [`MeshAcl`] bundles loading, validation and reloads behind one handle.
//! The free functions (`load_yaml`, `load_file`, ...) and [`ConfigStore`]
//! cover callers that manage publication themselves.
//!
//! For a custom configuration source, depend on `mesh-acl-engine` directly
//! and build `AccessControlList`/`SecretsScopeIndex` values yourself.
//!
//! # Quick Start
//!
//! ```rust
//! use mesh_acl::{
//!     load_yaml, AccessRequest, ConfigStore, HttpVerb, IdentityProvider, PeerContext,
//!     SpiffeIdentityProvider,
//! };
//!
//! // Load and validate a configuration generation
//! let snapshot = load_yaml(r#"
//! spec:
//!   accessControl:
//!     defaultAction: deny
//!     policies:
//!       - app: frontend
//!         defaultAction: deny
//!         trustDomain: public
//!         operations:
//!           - name: /orders
//!             httpVerb: ["GET"]
//!             action: allow
//! "#).expect("Failed to parse configuration");
//!
//! // Publish it to request handlers
//! let store = ConfigStore::new(snapshot);
//!
//! // Per request: establish the caller identity from the verified peer
//! let peer = PeerContext::verified(["spiffe://public/ns/default/frontend"]);
//! let identity = SpiffeIdentityProvider.caller_identity(&peer);
//!
//! let request = AccessRequest::new("frontend", "orders/42")
//!     .with_identity(identity.as_ref())
//!     .with_verb(HttpVerb::Get);
//! assert!(store.is_allowed(&request));
//! ```

mod mesh;

pub use mesh::MeshAcl;

// Re-export everything from the engine crate
pub use mesh_acl_engine::*;

// Re-export the default configuration backend
pub use mesh_acl_policy::{
    build_secrets_index, load_file, load_json, load_snapshot, load_toml, load_yaml,
    translate_access_control, validate_access_control, validate_secrets, AccessControlSpec,
    AppOperationSpec, AppPolicySpec, ConfigError, Configuration, ConfigurationSpec,
    PolicyConfigError, SecretsScopeSpec, SecretsSpec,
};
