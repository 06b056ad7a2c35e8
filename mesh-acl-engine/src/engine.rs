//! The authorization evaluator: decides whether one inbound call is allowed.
//!
//! Evaluation is a pure function of the request and an immutable
//! [`AccessControlList`]. It never fails; every missing input resolves
//! through the default chain:
//!
//! 1. no ACL configured: allow
//! 2. caller without an app policy: the ACL default
//! 3. caller without a verified identity: the app default
//! 4. trust domain mismatch: deny
//! 5. otherwise the last matching operation rule, or the app default

use serde::Serialize;

use crate::identity::CallerIdentity;
use crate::observer::{DecisionEvent, DecisionObserver, NoopObserver};
use crate::types::{AccessControlList, HttpVerb, PolicyAction};

/// One inbound invocation to authorize.
#[derive(Debug, Clone, Copy)]
pub struct AccessRequest<'a> {
    /// Verified caller identity, if one could be established.
    pub identity: Option<&'a CallerIdentity>,
    /// App id the caller claims, used to select its app policy.
    pub caller_app_id: &'a str,
    /// Target operation without a leading slash, e.g. `orders/42`.
    pub operation: &'a str,
    pub verb: HttpVerb,
}

impl<'a> AccessRequest<'a> {
    pub fn new(caller_app_id: &'a str, operation: &'a str) -> Self {
        Self {
            identity: None,
            caller_app_id,
            operation,
            verb: HttpVerb::None,
        }
    }

    pub fn with_identity(mut self, identity: Option<&'a CallerIdentity>) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_verb(mut self, verb: HttpVerb) -> Self {
        self.verb = verb;
        self
    }
}

/// Why an access request was allowed or denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AccessDecision {
    /// No access control list is configured.
    NoAccessControlList,
    /// The caller has no app policy; the ACL default applied.
    AclDefault {
        #[serde(serialize_with = "serialize_action")]
        action: PolicyAction,
    },
    /// The app policy default applied (no identity, or no rule matched).
    AppDefault {
        #[serde(serialize_with = "serialize_action")]
        action: PolicyAction,
    },
    /// The caller's trust domain did not satisfy the app policy.
    TrustDomainMismatch { expected: String, actual: String },
    /// The operation rule at `rule_index` was the last one to match.
    OperationRule {
        rule_index: usize,
        #[serde(serialize_with = "serialize_action")]
        action: PolicyAction,
    },
}

fn serialize_action<S>(action: &PolicyAction, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(action.as_str())
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        match self {
            AccessDecision::NoAccessControlList => true,
            AccessDecision::TrustDomainMismatch { .. } => false,
            AccessDecision::AclDefault { action }
            | AccessDecision::AppDefault { action }
            | AccessDecision::OperationRule { action, .. } => action.is_allow(),
        }
    }

    /// The action that governed the outcome, if any.
    pub fn action(&self) -> Option<&PolicyAction> {
        match self {
            AccessDecision::AclDefault { action }
            | AccessDecision::AppDefault { action }
            | AccessDecision::OperationRule { action, .. } => Some(action),
            AccessDecision::NoAccessControlList | AccessDecision::TrustDomainMismatch { .. } => {
                None
            }
        }
    }
}

/// Whether the access control list allows the call.
pub fn is_operation_allowed(request: &AccessRequest<'_>, acl: Option<&AccessControlList>) -> bool {
    evaluate(request, acl, &NoopObserver).is_allowed()
}

/// Evaluates the call and reports each step to `observer`.
///
/// Every evaluation ends with exactly one [`DecisionEvent::Decided`].
pub fn evaluate(
    request: &AccessRequest<'_>,
    acl: Option<&AccessControlList>,
    observer: &dyn DecisionObserver,
) -> AccessDecision {
    let decision = decide(request, acl, observer);
    observer.observe(&DecisionEvent::Decided {
        caller_app_id: request.caller_app_id,
        operation: request.operation,
        verb: request.verb,
        action: decision.action(),
        allowed: decision.is_allowed(),
    });
    decision
}

fn decide(
    request: &AccessRequest<'_>,
    acl: Option<&AccessControlList>,
    observer: &dyn DecisionObserver,
) -> AccessDecision {
    let Some(acl) = acl else {
        observer.observe(&DecisionEvent::NoAccessControlList);
        return AccessDecision::NoAccessControlList;
    };

    let Some(policy) = acl.policy(request.caller_app_id) else {
        observer.observe(&DecisionEvent::NoAppPolicy {
            caller_app_id: request.caller_app_id,
        });
        return AccessDecision::AclDefault {
            action: acl.default_action().clone(),
        };
    };

    let Some(identity) = request.identity else {
        observer.observe(&DecisionEvent::IdentityUnavailable {
            caller_app_id: request.caller_app_id,
        });
        return AccessDecision::AppDefault {
            action: policy.default_action.clone(),
        };
    };

    if !policy.accepts_trust_domain(identity.trust_domain()) {
        observer.observe(&DecisionEvent::TrustDomainMismatch {
            caller_app_id: request.caller_app_id,
            expected: &policy.trust_domain,
            actual: identity.trust_domain(),
        });
        return AccessDecision::TrustDomainMismatch {
            expected: policy.trust_domain.clone(),
            actual: identity.trust_domain().to_string(),
        };
    }

    let operation_path = format!("/{}", request.operation);
    let mut matched = None;

    // No early exit: a later matching rule overrides an earlier one.
    for (index, rule) in policy.operations.iter().enumerate() {
        if !rule.matches_path(&operation_path) {
            continue;
        }
        if !request.verb.is_none() && !rule.matches_verb(request.verb) {
            continue;
        }
        observer.observe(&DecisionEvent::OperationMatched {
            caller_app_id: request.caller_app_id,
            operation: request.operation,
            rule_index: index,
            verb: request.verb,
            action: &rule.action,
        });
        matched = Some((index, rule));
    }

    match matched {
        Some((rule_index, rule)) => AccessDecision::OperationRule {
            rule_index,
            action: rule.action.clone(),
        },
        None => AccessDecision::AppDefault {
            action: policy.default_action.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::observer::RecordingObserver;
    use crate::types::{AppPolicy, OperationRule};

    fn acl_with(policy: AppPolicy) -> AccessControlList {
        let mut policies = HashMap::new();
        policies.insert(policy.app_name.clone(), policy);
        AccessControlList::new(PolicyAction::Deny, policies)
    }

    fn orders_policy(trust_domain: &str) -> AppPolicy {
        AppPolicy {
            app_name: "frontend".to_string(),
            default_action: PolicyAction::Deny,
            trust_domain: trust_domain.to_string(),
            operations: vec![OperationRule::new("/orders", ["GET"], PolicyAction::Allow)],
        }
    }

    #[test]
    fn test_no_acl_allows() {
        let request = AccessRequest::new("anyone", "anything").with_verb(HttpVerb::Delete);
        assert!(is_operation_allowed(&request, None));
        assert_eq!(
            evaluate(&request, None, &NoopObserver),
            AccessDecision::NoAccessControlList
        );
    }

    #[test]
    fn test_unmapped_caller_uses_acl_default() {
        let acl = acl_with(orders_policy("*"));
        let request = AccessRequest::new("stranger", "orders").with_verb(HttpVerb::Get);
        assert_eq!(
            evaluate(&request, Some(&acl), &NoopObserver),
            AccessDecision::AclDefault {
                action: PolicyAction::Deny
            }
        );

        let open = AccessControlList::new(PolicyAction::Allow, HashMap::new());
        assert!(is_operation_allowed(&request, Some(&open)));
    }

    #[test]
    fn test_rule_index_reports_last_match() {
        let mut policy = orders_policy("*");
        policy
            .operations
            .push(OperationRule::new("/orders/", ["*"], PolicyAction::Deny));
        let acl = acl_with(policy);
        let identity = CallerIdentity::new("td", "default", "frontend");
        let request = AccessRequest::new("frontend", "orders/7")
            .with_identity(Some(&identity))
            .with_verb(HttpVerb::Get);

        assert_eq!(
            evaluate(&request, Some(&acl), &NoopObserver),
            AccessDecision::OperationRule {
                rule_index: 1,
                action: PolicyAction::Deny
            }
        );
    }

    #[test]
    fn test_observer_sees_each_step() {
        let acl = acl_with(orders_policy("td1"));
        let identity = CallerIdentity::new("td2", "default", "frontend");
        let request = AccessRequest::new("frontend", "orders")
            .with_identity(Some(&identity))
            .with_verb(HttpVerb::Get);
        let observer = RecordingObserver::new();

        assert!(!evaluate(&request, Some(&acl), &observer).is_allowed());

        let events = observer.events();
        assert_eq!(events.len(), 2);
        assert!(events[0].starts_with("TrustDomainMismatch"));
        assert!(events[1].starts_with("Decided"));
        assert!(events[1].contains("action: None"));
        assert!(events[1].contains("allowed: false"));
    }

    #[test]
    fn test_missing_acl_still_reports_outcome() {
        let request = AccessRequest::new("anyone", "anything");
        let observer = RecordingObserver::new();

        assert!(evaluate(&request, None, &observer).is_allowed());

        let events = observer.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], "NoAccessControlList");
        assert!(events[1].starts_with("Decided"));
        assert!(events[1].contains("allowed: true"));
    }

    #[test]
    fn test_decided_event_carries_outcome() {
        let acl = acl_with(orders_policy("*"));
        let identity = CallerIdentity::new("td", "default", "frontend");
        let request = AccessRequest::new("frontend", "orders")
            .with_identity(Some(&identity))
            .with_verb(HttpVerb::Get);
        let observer = RecordingObserver::new();

        assert!(evaluate(&request, Some(&acl), &observer).is_allowed());

        let events = observer.events();
        assert_eq!(events.len(), 2);
        assert!(events[0].starts_with("OperationMatched"));
        assert!(events[1].starts_with("Decided"));
        assert!(events[1].contains("action: Some(Allow)"));
        assert!(events[1].contains("allowed: true"));
    }

    #[test]
    fn test_decision_serializes_reason() {
        let decision = AccessDecision::OperationRule {
            rule_index: 2,
            action: PolicyAction::Allow,
        };
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"reason": "operation_rule", "rule_index": 2, "action": "allow"})
        );
    }
}
