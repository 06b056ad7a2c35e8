//! Core types for the access-control engine.
//!
//! Provides the actions, verbs and the lookup-optimized access control list
//! that the evaluator reads. All of these are immutable once built; a
//! configuration reload produces fresh values instead of editing live ones.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AccessActionError, HttpVerbError};

/// Token that matches any trust domain in an app policy, or any verb in an
/// operation rule.
pub const WILDCARD: &str = "*";

/// Literal for the allow action.
pub const ALLOW: &str = "allow";

/// Literal for the deny action.
pub const DENY: &str = "deny";

/// A strictly parsed allow/deny action.
///
/// Used where configuration must be rejected when the literal is unknown,
/// such as the default access of a secret scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessAction {
    Allow,
    Deny,
}

impl AccessAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessAction::Allow => ALLOW,
            AccessAction::Deny => DENY,
        }
    }
}

impl FromStr for AccessAction {
    type Err = AccessActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case(ALLOW) {
            Ok(AccessAction::Allow)
        } else if s.eq_ignore_ascii_case(DENY) {
            Ok(AccessAction::Deny)
        } else {
            Err(AccessActionError(s.to_string()))
        }
    }
}

impl std::fmt::Display for AccessAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action attached to an access-control default or operation rule.
///
/// Access-control literals are never rejected at load time. Anything other
/// than `allow`/`deny` is kept as `Unrecognized` and evaluates to deny.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PolicyAction {
    Allow,
    Deny,
    /// A literal that is neither `allow` nor `deny`, lower-cased.
    Unrecognized(String),
}

impl PolicyAction {
    /// Normalize a raw action literal. Never fails.
    pub fn from_literal(literal: &str) -> Self {
        let normalized = literal.to_lowercase();
        match normalized.as_str() {
            ALLOW => PolicyAction::Allow,
            DENY => PolicyAction::Deny,
            _ => PolicyAction::Unrecognized(normalized),
        }
    }

    /// Only an explicit `allow` grants access.
    pub fn is_allow(&self) -> bool {
        matches!(self, PolicyAction::Allow)
    }

    pub fn as_str(&self) -> &str {
        match self {
            PolicyAction::Allow => ALLOW,
            PolicyAction::Deny => DENY,
            PolicyAction::Unrecognized(literal) => literal,
        }
    }
}

impl From<AccessAction> for PolicyAction {
    fn from(action: AccessAction) -> Self {
        match action {
            AccessAction::Allow => PolicyAction::Allow,
            AccessAction::Deny => PolicyAction::Deny,
        }
    }
}

impl std::fmt::Display for PolicyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP verb carried by an inbound invocation.
///
/// `None` means the call carried no HTTP semantics (a plain gRPC call).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    #[default]
    None,
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
}

impl HttpVerb {
    /// Canonical upper-case name, as written in policy verb lists.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::None => "NONE",
            HttpVerb::Get => "GET",
            HttpVerb::Head => "HEAD",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Delete => "DELETE",
            HttpVerb::Connect => "CONNECT",
            HttpVerb::Options => "OPTIONS",
            HttpVerb::Trace => "TRACE",
            HttpVerb::Patch => "PATCH",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, HttpVerb::None)
    }
}

impl FromStr for HttpVerb {
    type Err = HttpVerbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let verb = match s.to_ascii_uppercase().as_str() {
            "NONE" | "" => HttpVerb::None,
            "GET" => HttpVerb::Get,
            "HEAD" => HttpVerb::Head,
            "POST" => HttpVerb::Post,
            "PUT" => HttpVerb::Put,
            "DELETE" => HttpVerb::Delete,
            "CONNECT" => HttpVerb::Connect,
            "OPTIONS" => HttpVerb::Options,
            "TRACE" => HttpVerb::Trace,
            "PATCH" => HttpVerb::Patch,
            _ => return Err(HttpVerbError(s.to_string())),
        };
        Ok(verb)
    }
}

impl std::fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path-prefix rule inside an app policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRule {
    /// Matched as a string prefix of `"/" + operation`.
    pub path_prefix: String,
    /// Verb names in declared order; `"*"` matches any verb.
    pub verbs: Vec<String>,
    pub action: PolicyAction,
}

impl OperationRule {
    pub fn new(
        path_prefix: impl Into<String>,
        verbs: impl IntoIterator<Item = impl Into<String>>,
        action: PolicyAction,
    ) -> Self {
        Self {
            path_prefix: path_prefix.into(),
            verbs: verbs.into_iter().map(Into::into).collect(),
            action,
        }
    }

    /// Whether this rule applies to the given `"/" + operation` path.
    pub fn matches_path(&self, operation_path: &str) -> bool {
        operation_path.starts_with(self.path_prefix.as_str())
    }

    /// Whether any listed verb equals `verb` or is the wildcard.
    pub fn matches_verb(&self, verb: HttpVerb) -> bool {
        self.verbs
            .iter()
            .any(|v| v == verb.as_str() || v == WILDCARD)
    }
}

/// Access policy for one calling application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPolicy {
    pub app_name: String,
    pub default_action: PolicyAction,
    /// Trust domain the caller must belong to, or `"*"` for any.
    pub trust_domain: String,
    /// Evaluated in declared order; the last matching rule wins.
    pub operations: Vec<OperationRule>,
}

impl AppPolicy {
    pub fn accepts_trust_domain(&self, trust_domain: &str) -> bool {
        self.trust_domain == WILDCARD || self.trust_domain == trust_domain
    }
}

/// In-memory access control list keyed by caller app id for fast lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessControlList {
    default_action: PolicyAction,
    policies: HashMap<String, AppPolicy>,
}

impl AccessControlList {
    pub fn new(default_action: PolicyAction, policies: HashMap<String, AppPolicy>) -> Self {
        Self {
            default_action,
            policies,
        }
    }

    /// The ACL-wide action for callers without an app policy.
    pub fn default_action(&self) -> &PolicyAction {
        &self.default_action
    }

    pub fn policy(&self, app_id: &str) -> Option<&AppPolicy> {
        self.policies.get(app_id)
    }

    pub fn policies(&self) -> impl Iterator<Item = &AppPolicy> {
        self.policies.values()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
