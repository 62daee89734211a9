//! Batch vesting disbursement job.
//!
//! Submits one `claim` transaction per beneficiary to a vesting contract,
//! guaranteeing every beneficiary is attempted, duplicates are dropped,
//! and transient failures never abort the run.
//!
//! # Architecture Overview
//!
//! ```text
//!   wallets.csv / work queue          keystore / env
//!            │                              │
//!            ▼                              ▼
//!       ┌─────────┐                  ┌────────────┐
//!       │ ingest  │                  │  wallet    │
//!       │ dedup   │                  │ (operator) │
//!       └────┬────┘                  └─────┬──────┘
//!            ▼                             │
//!   ┌─────────────────┐                    │
//!   │ BeneficiaryQueue│                    │
//!   └────────┬────────┘                    │
//!            ▼                             ▼
//!   ┌─────────────────┐   build    ┌──────────────┐
//!   │ disbursement    │──────────▶ │ claim builder│──┐
//!   │ loop (runner)   │            └──────────────┘  │ fee / estimate /
//!   │  retry+backoff  │   submit   ┌──────────────┐  │ sequence / send
//!   │  abort+shutdown │──────────▶ │ broadcaster  │──┤
//!   └────────┬────────┘            └──────────────┘  ▼
//!            │                                ┌─────────────┐
//!            ▼                                │ ChainClient │──▶ JSON-RPC
//!   log + outcome events                      │  (failover) │
//!                                             └─────────────┘
//! ```

// Core subsystems
pub mod blockchain;
pub mod config;
pub mod ingest;
pub mod job;

// Cross-cutting concerns
pub mod integrations;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::JobConfig;
pub use job::runner::{DisbursementRun, RunReport};
pub use lifecycle::Shutdown;
