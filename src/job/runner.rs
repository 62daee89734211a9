//! The disbursement loop.
//!
//! # State Machine
//! ```text
//! Running ──(remaining == 0)──▶ Completed
//!
//! Per beneficiary, while Running:
//!     abort-check → build → submit
//!         success → log hash, advance cursor, remaining -= 1
//!         failure → log typed error, back off, retry SAME beneficiary
//!         aborted → log, publish, advance without submitting
//! ```
//!
//! # Design Decisions
//! - At-least-once, never-skip: a failing beneficiary blocks the run
//!   until it succeeds, is aborted by the operator, or the process stops
//! - Exactly one submission in flight at any time; sequence numbers are
//!   strictly ordered per operator account
//! - Capped exponential backoff between attempts so a stuck beneficiary
//!   does not hammer the network
//! - A shutdown signal interrupts between attempts, never mid-submission

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use alloy::primitives::TxHash;
use tokio::sync::broadcast;

use crate::blockchain::broadcaster::Broadcaster;
use crate::blockchain::builder::ClaimBuilder;
use crate::blockchain::gateway::LedgerGateway;
use crate::config::schema::RetryConfig;
use crate::ingest::record::BeneficiaryRecord;
use crate::integrations::events::OutcomePublisher;
use crate::job::outcome::{AttemptError, OutcomeKind, SubmissionOutcome};
use crate::job::queue::BeneficiaryQueue;
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;

/// Loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Completed,
}

/// Marks individual beneficiaries for abort without stopping the run.
///
/// An operator watching the logs can mark a permanently failing
/// beneficiary; the loop drops it at the next attempt boundary and moves
/// on. This is the one sanctioned exception to the never-skip guarantee.
#[derive(Debug, Clone, Default)]
pub struct AbortRegistry {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl AbortRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a beneficiary for abort. Identifier comparison is
    /// case-insensitive.
    pub fn abort(&self, identifier: &str) {
        self.inner
            .lock()
            .expect("abort registry poisoned")
            .insert(identifier.to_lowercase());
    }

    /// Consume a pending abort mark for this identifier.
    fn take(&self, identifier: &str) -> bool {
        self.inner
            .lock()
            .expect("abort registry poisoned")
            .remove(identifier)
    }
}

/// Final report of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunReport {
    /// Every beneficiary was resolved (claimed or operator-aborted).
    Completed { submitted: usize, aborted: usize },
    /// The process was asked to stop before the queue drained.
    Interrupted {
        submitted: usize,
        aborted: usize,
        remaining: usize,
    },
}

impl RunReport {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunReport::Completed { .. })
    }
}

/// Sequential disbursement over a beneficiary queue.
pub struct DisbursementRun<G> {
    builder: ClaimBuilder<G>,
    broadcaster: Broadcaster<G>,
    retry: RetryConfig,
    aborts: AbortRegistry,
    shutdown: broadcast::Receiver<()>,
}

impl<G: LedgerGateway> DisbursementRun<G> {
    pub fn new(
        builder: ClaimBuilder<G>,
        broadcaster: Broadcaster<G>,
        retry: RetryConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            builder,
            broadcaster,
            retry,
            aborts: AbortRegistry::new(),
            shutdown,
        }
    }

    /// Handle for marking beneficiaries to abort while the run is live.
    pub fn abort_registry(&self) -> AbortRegistry {
        self.aborts.clone()
    }

    /// Drive the queue to completion.
    ///
    /// Consumes the runner: one run per process, front to back. Each
    /// outcome is logged and handed to `publisher`; failed attempts are
    /// published too, one event per attempt.
    pub async fn run(
        mut self,
        queue: &BeneficiaryQueue,
        publisher: &dyn OutcomePublisher,
    ) -> RunReport {
        let mut state = RunState::Running;
        let mut remaining = queue.len();
        let mut submitted = 0usize;
        let mut aborted = 0usize;
        let mut cursor = 0usize;

        tracing::info!(beneficiaries = remaining, "Disbursement loop started");
        metrics::record_remaining(remaining);

        loop {
            if remaining == 0 {
                state = RunState::Completed;
            }
            if state == RunState::Completed {
                break;
            }

            let Some(record) = queue.get(cursor) else {
                // Unreachable while remaining > 0; treat as drained.
                state = RunState::Completed;
                continue;
            };

            let mut attempt: u32 = 0;
            let outcome = loop {
                if self.shutdown_requested() {
                    tracing::warn!(
                        submitted,
                        remaining,
                        "Shutdown requested, stopping before completion"
                    );
                    return RunReport::Interrupted {
                        submitted,
                        aborted,
                        remaining,
                    };
                }

                if self.aborts.take(&record.identifier) {
                    tracing::warn!(
                        beneficiary = %record.identifier,
                        attempts = attempt,
                        "Beneficiary aborted by operator"
                    );
                    break OutcomeKind::Aborted;
                }

                match self.attempt(record).await {
                    Ok(tx_hash) => {
                        tracing::info!(
                            beneficiary = %record.identifier,
                            tx_hash = %tx_hash,
                            attempts = attempt + 1,
                            "Claim accepted"
                        );
                        break OutcomeKind::Accepted {
                            tx_hash: tx_hash.to_string(),
                        };
                    }
                    Err(error) => {
                        attempt = attempt.saturating_add(1);
                        match &error {
                            AttemptError::Build(inner) => tracing::warn!(
                                beneficiary = %record.identifier,
                                attempt,
                                error = %inner,
                                "Claim build failed"
                            ),
                            AttemptError::Submit(inner) => tracing::warn!(
                                beneficiary = %record.identifier,
                                attempt,
                                error = %inner,
                                "Claim submission failed"
                            ),
                        }
                        metrics::record_submission("failed");
                        publisher.publish(&SubmissionOutcome {
                            beneficiary: record.identifier.clone(),
                            kind: OutcomeKind::Failed {
                                error: error.to_string(),
                            },
                        });

                        let delay = calculate_backoff(
                            attempt,
                            self.retry.base_delay_ms,
                            self.retry.max_delay_ms,
                        );
                        tokio::select! {
                            _ = tokio::time::sleep(delay) => {}
                            _ = self.shutdown.recv() => {
                                tracing::warn!(
                                    submitted,
                                    remaining,
                                    "Shutdown requested, stopping before completion"
                                );
                                return RunReport::Interrupted {
                                    submitted,
                                    aborted,
                                    remaining,
                                };
                            }
                        }
                    }
                }
            };

            match &outcome {
                OutcomeKind::Accepted { .. } => {
                    submitted += 1;
                    metrics::record_submission("accepted");
                }
                OutcomeKind::Aborted => {
                    aborted += 1;
                    metrics::record_submission("aborted");
                }
                OutcomeKind::Failed { .. } => {}
            }
            publisher.publish(&SubmissionOutcome {
                beneficiary: record.identifier.clone(),
                kind: outcome,
            });

            cursor += 1;
            remaining -= 1;
            metrics::record_remaining(remaining);
        }

        tracing::info!(submitted, aborted, "Disbursement loop completed");
        RunReport::Completed { submitted, aborted }
    }

    /// One build-then-submit attempt for one beneficiary.
    ///
    /// Everything mutable (fee rate, estimate, sequence number) is
    /// resolved inside this call; nothing carries over between attempts.
    async fn attempt(&self, record: &BeneficiaryRecord) -> Result<TxHash, AttemptError> {
        let claim = self
            .builder
            .build(record)
            .await
            .map_err(AttemptError::Build)?;
        self.broadcaster
            .submit(&claim)
            .await
            .map_err(AttemptError::Submit)
    }

    fn shutdown_requested(&mut self) -> bool {
        match self.shutdown.try_recv() {
            Ok(()) => true,
            Err(broadcast::error::TryRecvError::Lagged(_)) => true,
            Err(_) => false,
        }
    }
}
