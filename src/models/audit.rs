//! Audit events emitted once per staking cycle step

use serde::Serialize;
use crate::models::amount::TokenAmount;

/// Structured outcome of a staking cycle, rendered by the audit task
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    /// A job-finished event started a cycle
    StakingStarted {
        job_signature: String,
    },
    /// The stake transaction was confirmed
    StakingSucceeded {
        job_signature: String,
        signature: String,
        amount: TokenAmount,
    },
    /// Dry run: the transaction was built and checked but not sent
    StakingSkipped {
        job_signature: String,
        amount: TokenAmount,
    },
    /// The job's transaction credited nothing to the authority
    NoTokensReceived {
        job_signature: String,
    },
    /// The cycle ended with an error
    StakingFailed {
        job_signature: String,
        reason: String,
        message: String,
    },
}

impl AuditEvent {
    /// Whether this event ends a cycle
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AuditEvent::StakingStarted { .. })
    }

    /// Signature of the job transaction the cycle belongs to
    pub fn job_signature(&self) -> &str {
        match self {
            AuditEvent::StakingStarted { job_signature }
            | AuditEvent::StakingSucceeded { job_signature, .. }
            | AuditEvent::StakingSkipped { job_signature, .. }
            | AuditEvent::NoTokensReceived { job_signature }
            | AuditEvent::StakingFailed { job_signature, .. } => job_signature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_event_tag() {
        let event = AuditEvent::StakingSucceeded {
            job_signature: "job".to_string(),
            signature: "stake".to_string(),
            amount: TokenAmount::from_raw(12_500_000, 6),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "staking_succeeded");
        assert_eq!(json["amount"], "12.5");
        assert!(event.is_terminal());

        let started = AuditEvent::StakingStarted { job_signature: "job".to_string() };
        assert!(!started.is_terminal());
        assert_eq!(started.job_signature(), "job");
    }
}
