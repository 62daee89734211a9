//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! Keystore file / environment (private key)
//!     → wallet.rs (key loading, local signing)
//! BeneficiaryRecord
//!     → builder.rs (encode claim, resolve fee/estimate/sequence)
//!     → broadcaster.rs (sign, broadcast, await inclusion)
//!     → client.rs (RPC with failover and per-request timeouts)
//! ```
//!
//! # Security Constraints
//! - Private keys only from the keystore file or environment variables
//! - Never log private keys or raw signing material
//! - All RPC calls have configurable timeouts
//!
//! The [`gateway::LedgerGateway`] trait is the seam between the job logic
//! and the network; `client::ChainClient` is its production
//! implementation.

pub mod broadcaster;
pub mod builder;
pub mod client;
pub mod gateway;
pub mod types;
pub mod wallet;

pub use broadcaster::Broadcaster;
pub use builder::{ClaimBuilder, PendingClaim};
pub use client::ChainClient;
pub use gateway::LedgerGateway;
pub use types::{ChainError, ChainId, ChainResult};
pub use wallet::OperatorWallet;
