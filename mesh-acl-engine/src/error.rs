//! Error types for the access-control engine.
//!
//! Evaluation itself never fails; these errors only surface while building
//! engine values from configuration or from transport credentials.

use thiserror::Error;

/// Errors from parsing a caller identity URI.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The identifier has no `<scheme>://` prefix.
    #[error("identity {0:?} is missing a `<scheme>://` prefix")]
    InvalidScheme(String),

    /// A required path segment is absent.
    #[error("identity is missing the {field} segment")]
    MissingSegment { field: &'static str },

    /// A path segment is present but empty.
    #[error("identity has an empty {field} segment")]
    EmptySegment { field: &'static str },

    /// The segment after the trust domain is not the `ns` marker.
    #[error("expected `ns` after the trust domain, found {0:?}")]
    ExpectedNamespaceMarker(String),

    /// The identifier has path segments after the app id.
    #[error("identity has unexpected segments after the app id")]
    ExtraSegments,
}

/// Error from parsing an `allow`/`deny` literal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("access action {0:?} must be either allow or deny")]
pub struct AccessActionError(pub String);

/// Error from parsing an HTTP verb name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown http verb {0:?}")]
pub struct HttpVerbError(pub String);
