//! Decision events emitted by the evaluator.
//!
//! The evaluator never logs on its own. Callers that want an audit trail pass
//! a [`DecisionObserver`]; [`TracingObserver`] forwards events to `tracing`.

use tracing::{debug, info, warn};

use crate::types::{HttpVerb, PolicyAction};

/// A step taken while evaluating one access request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionEvent<'a> {
    /// No access control list is configured; the call is allowed.
    NoAccessControlList,
    /// The caller has no app policy; the ACL-wide default applies.
    NoAppPolicy { caller_app_id: &'a str },
    /// No verified identity; the app default applies without refinement.
    IdentityUnavailable { caller_app_id: &'a str },
    /// The caller's trust domain is not the one the policy pins.
    TrustDomainMismatch {
        caller_app_id: &'a str,
        expected: &'a str,
        actual: &'a str,
    },
    /// An operation rule matched and its action now governs.
    OperationMatched {
        caller_app_id: &'a str,
        operation: &'a str,
        rule_index: usize,
        verb: HttpVerb,
        action: &'a PolicyAction,
    },
    /// Final outcome, emitted once per evaluation. `action` is `None` when
    /// no configured action decided (no ACL, trust domain mismatch).
    Decided {
        caller_app_id: &'a str,
        operation: &'a str,
        verb: HttpVerb,
        action: Option<&'a PolicyAction>,
        allowed: bool,
    },
}

/// Receives decision events. Implementations must not block.
pub trait DecisionObserver: Send + Sync {
    fn observe(&self, event: &DecisionEvent<'_>);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DecisionObserver for NoopObserver {
    fn observe(&self, _event: &DecisionEvent<'_>) {}
}

/// Forwards decision events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl DecisionObserver for TracingObserver {
    fn observe(&self, event: &DecisionEvent<'_>) {
        match event {
            DecisionEvent::NoAccessControlList => {
                debug!("no access control list configured, allowing call");
            }
            DecisionEvent::NoAppPolicy { caller_app_id } => {
                debug!(caller_app_id, "no app policy for caller, applying global default");
            }
            DecisionEvent::IdentityUnavailable { caller_app_id } => {
                warn!(
                    caller_app_id,
                    "unable to verify caller identity, applying app default action"
                );
            }
            DecisionEvent::TrustDomainMismatch {
                caller_app_id,
                expected,
                actual,
            } => {
                info!(caller_app_id, expected, actual, "trust domain mismatch, denying call");
            }
            DecisionEvent::OperationMatched {
                caller_app_id,
                operation,
                rule_index,
                verb,
                action,
            } => {
                debug!(
                    caller_app_id,
                    operation,
                    rule_index,
                    verb = %verb,
                    action = %action,
                    "operation rule matched"
                );
            }
            DecisionEvent::Decided {
                caller_app_id,
                operation,
                verb,
                action,
                allowed,
            } => {
                let action = action.map_or("none", |action| action.as_str());
                if *allowed {
                    debug!(caller_app_id, operation, verb = %verb, action, "call allowed");
                } else {
                    info!(caller_app_id, operation, verb = %verb, action, "call denied");
                }
            }
        }
    }
}

/// Records events in memory. Intended for tests and audits.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: parking_lot::Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Debug renderings of every observed event, in order.
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

impl DecisionObserver for RecordingObserver {
    fn observe(&self, event: &DecisionEvent<'_>) {
        self.events.lock().push(format!("{event:?}"));
    }
}
