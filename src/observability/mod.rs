//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters and gauges via the metrics facade)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (optional Prometheus scrape)
//! ```
//!
//! The log is the operator's primary window into a run: a stuck
//! beneficiary is visible only as repeating attempt failures.

pub mod logging;
pub mod metrics;
