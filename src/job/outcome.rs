//! Per-beneficiary outcome and attempt error types.

use serde::Serialize;
use thiserror::Error;

use crate::blockchain::types::ChainError;

/// The result of one submission attempt, as logged and published.
///
/// Not persisted by the core; the event log (when configured) is the
/// durable record.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SubmissionOutcome {
    /// Lower-cased beneficiary identifier.
    pub beneficiary: String,
    #[serde(flatten)]
    pub kind: OutcomeKind,
}

/// Outcome discriminant.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeKind {
    /// The ledger accepted and included the claim.
    Accepted { tx_hash: String },
    /// The attempt failed; the beneficiary will be retried.
    Failed { error: String },
    /// The operator aborted this beneficiary; the run continues.
    Aborted,
}

/// A typed failure for one claim attempt.
///
/// The loop inspects the variant to distinguish build-time from
/// submit-time failures; both are recoverable.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("build failed: {0}")]
    Build(#[source] ChainError),

    #[error("submission failed: {0}")]
    Submit(#[source] ChainError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = SubmissionOutcome {
            beneficiary: "0xaa".to_string(),
            kind: OutcomeKind::Accepted {
                tx_hash: "0x1234".to_string(),
            },
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "accepted");
        assert_eq!(json["tx_hash"], "0x1234");

        let outcome = SubmissionOutcome {
            beneficiary: "0xbb".to_string(),
            kind: OutcomeKind::Aborted,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "aborted");
    }

    #[test]
    fn test_attempt_error_display() {
        let err = AttemptError::Build(ChainError::Rpc("no fee".to_string()));
        assert!(err.to_string().contains("build failed"));
        let err = AttemptError::Submit(ChainError::Rpc("rejected".to_string()));
        assert!(err.to_string().contains("submission failed"));
    }
}
