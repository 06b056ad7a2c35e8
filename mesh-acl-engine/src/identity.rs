//! Caller identities and the capability that extracts them from a
//! verified transport.
//!
//! Identities are SPIFFE-style URIs:
//! `spiffe://<trust-domain>/ns/<namespace>/<app-id>`.
//! Certificate validation happens upstream; this module only consumes the URI
//! names a completed handshake exposes.

use serde::Serialize;

use crate::error::IdentityError;

const SCHEME_SEPARATOR: &str = "://";
const NAMESPACE_MARKER: &str = "ns";

/// URI scheme accepted by [`SpiffeIdentityProvider`].
pub const SPIFFE_SCHEME: &str = "spiffe";

/// The verified identity of a calling workload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CallerIdentity {
    trust_domain: String,
    namespace: String,
    app_id: String,
}

impl CallerIdentity {
    pub fn new(
        trust_domain: impl Into<String>,
        namespace: impl Into<String>,
        app_id: impl Into<String>,
    ) -> Self {
        Self {
            trust_domain: trust_domain.into(),
            namespace: namespace.into(),
            app_id: app_id.into(),
        }
    }

    /// Parses `<scheme>://<trust-domain>/ns/<namespace>/<app-id>`.
    ///
    /// The scheme is not interpreted here. Every segment must be non-empty and
    /// nothing may follow the app id.
    pub fn parse(input: &str) -> Result<Self, IdentityError> {
        let raw = input.trim();
        let (scheme, path) = raw
            .split_once(SCHEME_SEPARATOR)
            .ok_or_else(|| IdentityError::InvalidScheme(raw.to_string()))?;
        if scheme.is_empty() {
            return Err(IdentityError::InvalidScheme(raw.to_string()));
        }

        let mut segments = path.split('/');

        let trust_domain = next_segment(&mut segments, "trust domain")?;
        let marker = segments.next().ok_or(IdentityError::MissingSegment {
            field: "namespace marker",
        })?;
        if marker != NAMESPACE_MARKER {
            return Err(IdentityError::ExpectedNamespaceMarker(marker.to_string()));
        }
        let namespace = next_segment(&mut segments, "namespace")?;
        let app_id = next_segment(&mut segments, "app id")?;

        if segments.next().is_some() {
            return Err(IdentityError::ExtraSegments);
        }

        Ok(Self::new(trust_domain, namespace, app_id))
    }

    pub fn trust_domain(&self) -> &str {
        &self.trust_domain
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }
}

fn next_segment<'a>(
    segments: &mut impl Iterator<Item = &'a str>,
    field: &'static str,
) -> Result<&'a str, IdentityError> {
    let segment = segments
        .next()
        .ok_or(IdentityError::MissingSegment { field })?;
    if segment.is_empty() {
        return Err(IdentityError::EmptySegment { field });
    }
    Ok(segment)
}

impl std::fmt::Display for CallerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{SPIFFE_SCHEME}://{}/{NAMESPACE_MARKER}/{}/{}",
            self.trust_domain, self.namespace, self.app_id
        )
    }
}

impl std::str::FromStr for CallerIdentity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// What a completed TLS handshake exposes about the peer.
#[derive(Debug, Clone, Default)]
pub struct PeerContext {
    /// Whether the handshake finished and the chain was verified.
    pub handshake_complete: bool,
    /// URI subject alternative names from the verified leaf certificate.
    pub uri_sans: Vec<String>,
}

impl PeerContext {
    pub fn verified(uri_sans: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            handshake_complete: true,
            uri_sans: uri_sans.into_iter().map(Into::into).collect(),
        }
    }
}

/// Extracts a caller identity from a transport security context.
///
/// Failing to establish an identity is not an error for the evaluator; it
/// simply receives `None` and applies the app-level default.
pub trait IdentityProvider: Send + Sync {
    fn caller_identity(&self, peer: &PeerContext) -> Option<CallerIdentity>;
}

/// Reads the first parseable `spiffe://` URI SAN from a verified peer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpiffeIdentityProvider;

impl IdentityProvider for SpiffeIdentityProvider {
    fn caller_identity(&self, peer: &PeerContext) -> Option<CallerIdentity> {
        if !peer.handshake_complete {
            return None;
        }

        peer.uri_sans
            .iter()
            .filter(|san| {
                san.split_once(SCHEME_SEPARATOR)
                    .is_some_and(|(scheme, _)| scheme.eq_ignore_ascii_case(SPIFFE_SCHEME))
            })
            .find_map(|san| CallerIdentity::parse(san).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spiffe_id() {
        let id = CallerIdentity::parse("spiffe://cluster.local/ns/default/frontend").unwrap();
        assert_eq!(id.trust_domain(), "cluster.local");
        assert_eq!(id.namespace(), "default");
        assert_eq!(id.app_id(), "frontend");
    }

    #[test]
    fn test_display_round_trips() {
        let raw = "spiffe://public/ns/prod/checkout";
        let id: CallerIdentity = raw.parse().unwrap();
        assert_eq!(id.to_string(), raw);
    }

    #[test]
    fn test_parse_rejects_missing_scheme() {
        assert!(matches!(
            CallerIdentity::parse("cluster.local/ns/default/frontend"),
            Err(IdentityError::InvalidScheme(_))
        ));
        assert!(matches!(
            CallerIdentity::parse("://cluster.local/ns/default/frontend"),
            Err(IdentityError::InvalidScheme(_))
        ));
    }

    #[test]
    fn test_parse_rejects_wrong_marker() {
        assert_eq!(
            CallerIdentity::parse("spiffe://td/namespace/default/frontend"),
            Err(IdentityError::ExpectedNamespaceMarker("namespace".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_short_and_long_paths() {
        assert_eq!(
            CallerIdentity::parse("spiffe://td/ns/default"),
            Err(IdentityError::MissingSegment { field: "app id" })
        );
        assert_eq!(
            CallerIdentity::parse("spiffe://td/ns/default/frontend/extra"),
            Err(IdentityError::ExtraSegments)
        );
        assert_eq!(
            CallerIdentity::parse("spiffe:///ns/default/frontend"),
            Err(IdentityError::EmptySegment {
                field: "trust domain"
            })
        );
    }

    #[test]
    fn test_provider_requires_completed_handshake() {
        let peer = PeerContext {
            handshake_complete: false,
            uri_sans: vec!["spiffe://td/ns/default/frontend".to_string()],
        };
        assert!(SpiffeIdentityProvider.caller_identity(&peer).is_none());
    }

    #[test]
    fn test_provider_picks_first_spiffe_san() {
        let peer = PeerContext::verified([
            "https://example.com/frontend",
            "spiffe://td/broken",
            "spiffe://td/ns/default/frontend",
            "spiffe://other/ns/default/backend",
        ]);
        let id = SpiffeIdentityProvider.caller_identity(&peer).unwrap();
        assert_eq!(id, CallerIdentity::new("td", "default", "frontend"));
    }

    #[test]
    fn test_provider_without_sans_yields_none() {
        let peer = PeerContext::verified(Vec::<String>::new());
        assert!(SpiffeIdentityProvider.caller_identity(&peer).is_none());
    }
}
