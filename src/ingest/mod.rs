//! Beneficiary ingestion subsystem.
//!
//! # Data Flow
//! ```text
//! CSV file or durable queue
//!     → reader.rs (streaming read, lower-case normalization)
//!     → dedup against a caller-owned identity-key set
//!     → Vec<BeneficiaryRecord> (ordered, first occurrences only)
//!     → job::BeneficiaryQueue
//! ```
//!
//! # Design Decisions
//! - Duplicates are skipped and logged, never fatal; malformed input is
//!   fatal before any submission happens
//! - The identity key is the lower-cased identifier, so case-variant
//!   spellings of one account collapse to a single entry
//! - No network or cryptographic side effects; identifier *format* is not
//!   validated here — a malformed identifier surfaces as a build failure

pub mod reader;
pub mod record;

pub use reader::{
    drain_work_queue, load_beneficiaries, load_beneficiaries_from_path, IngestError,
};
pub use record::{AmountPolicy, BeneficiaryRecord, InvalidAmount, QueuedClaim};
