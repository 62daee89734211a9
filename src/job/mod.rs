//! The disbursement job subsystem.
//!
//! # Data Flow
//! ```text
//! ingest (ordered records)
//!     → queue.rs (immutable BeneficiaryQueue)
//!     → runner.rs (sequential state machine, retry + backoff + abort)
//!         → blockchain::builder / blockchain::broadcaster per attempt
//!     → outcome.rs (SubmissionOutcome → log + publisher)
//! ```

pub mod outcome;
pub mod queue;
pub mod runner;

pub use outcome::{AttemptError, OutcomeKind, SubmissionOutcome};
pub use queue::BeneficiaryQueue;
pub use runner::{AbortRegistry, DisbursementRun, RunReport, RunState};
