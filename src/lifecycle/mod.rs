//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Logging/metrics → Wallet → Client →
//!     Ingest → Run loop
//!
//! Shutdown (shutdown.rs):
//!     Signal received → finish in-flight submission → report → exit
//!
//! Signals (signals.rs):
//!     SIGINT → trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, before the first submission
//! - Exit code 0 only when the queue fully drained

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::spawn_signal_listener;
