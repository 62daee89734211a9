//! Optional external collaborators.
//!
//! # Data Flow
//! ```text
//! Surrounding service
//!     → queue.rs (push claim work items)         → ingest::drain_work_queue
//! job::runner
//!     → events.rs (publish SubmissionOutcome)    → external consumers
//! ```
//!
//! The core job runs without either collaborator; both are seams a
//! deployment can wire up or ignore.

pub mod events;
pub mod queue;

pub use events::{FileEventLog, NullPublisher, OutcomePublisher};
pub use queue::{FileQueue, WorkQueue};
