//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! disbursement job. All types derive Serde traits for deserialization from
//! config files.

use serde::{Deserialize, Serialize};

/// Root configuration for a disbursement run.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct JobConfig {
    /// Ledger network settings (RPC endpoints, chain ID, gas policy).
    pub chain: ChainConfig,

    /// Target vesting contract.
    pub contract: ContractConfig,

    /// Operator credential source.
    pub credentials: CredentialConfig,

    /// Beneficiary input source.
    pub input: InputConfig,

    /// Claim amount applied to rows that carry no explicit amount.
    pub amount: AmountConfig,

    /// Backoff between attempts on a failing beneficiary.
    pub retry: RetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Optional outcome event log.
    pub events: EventConfig,
}

/// Ledger network configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// Chain ID (e.g., 1 for Ethereum mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Number of block confirmations required for finality.
    pub confirmation_blocks: u32,

    /// Maximum time to wait for a broadcast transaction to be included,
    /// in seconds. Expiry is a submission failure, not a fatal error.
    pub inclusion_timeout_secs: u64,

    /// Gas price multiplier (1.0 = estimated, 1.2 = 20% buffer).
    pub gas_price_multiplier: f64,

    /// Maximum gas price in gwei (protection against spikes).
    pub max_gas_price_gwei: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 1,
            rpc_timeout_secs: 10,
            confirmation_blocks: 3,
            inclusion_timeout_secs: 180,
            gas_price_multiplier: 1.2,
            max_gas_price_gwei: 500,
        }
    }
}

/// Target contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ContractConfig {
    /// Address of the vesting contract exposing `claim(address,int256)`.
    pub address: String,
}

/// Operator credential configuration.
///
/// The private key itself is never part of the config file; only the path
/// to a keystore file. When no path is set, the key is read from the
/// `DISBURSER_PRIVATE_KEY` environment variable.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CredentialConfig {
    /// Path to a JSON keystore file: `{ "address": ..., "private_key": ... }`.
    pub keystore_path: Option<String>,
}

/// Beneficiary input source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    /// Where beneficiaries come from.
    pub mode: InputMode,

    /// Path of the CSV file (mode = "csv") or queue file (mode = "queue").
    pub path: String,

    /// Name of the identifier column in the CSV header.
    pub column: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            mode: InputMode::Csv,
            path: "wallets.csv".to_string(),
            column: "wallet".to_string(),
        }
    }
}

/// Input source kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Row-per-record CSV file.
    #[default]
    Csv,
    /// Durable FIFO work queue (see `integrations::queue`).
    Queue,
}

/// Default claim amount policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AmountConfig {
    /// Either a decimal token amount or the sentinel "claim-all" (aka "-1"),
    /// which asks the contract for the full entitlement.
    pub policy: String,
}

impl Default for AmountConfig {
    fn default() -> Self {
        Self {
            policy: "claim-all".to_string(),
        }
    }
}

/// Backoff configuration for the per-beneficiary retry loop.
///
/// There is no attempt cap: a failing beneficiary is retried until it
/// succeeds, is aborted by the operator, or the process is stopped.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 500,
            max_delay_ms: 30_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Outcome event log configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EventConfig {
    /// When set, every submission outcome is appended as a JSON line to
    /// this file in addition to the structured log.
    pub log_path: Option<String>,
}
