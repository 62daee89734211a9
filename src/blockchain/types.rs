//! Chain-specific types and error definitions.

use thiserror::Error;

pub use crate::config::schema::ChainConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Broadcast transaction was not included within the inclusion window.
    #[error("transaction {tx_hash} not included after {waited_secs} seconds")]
    InclusionTimeout { tx_hash: String, waited_secs: u64 },

    /// Transaction was included but reverted on-chain.
    #[error("transaction reverted: {0}")]
    Reverted(String),

    /// Invalid key material or keystore contents.
    #[error("wallet error: {0}")]
    Wallet(String),

    /// Local signing failed.
    #[error("signing error: {0}")]
    Signing(String),

    /// Fee rate exceeded the configured maximum.
    #[error("fee rate {current_gwei} gwei exceeds maximum {max_gwei} gwei")]
    FeeTooHigh { current_gwei: u64, max_gwei: u64 },

    /// Chain configuration mismatch.
    #[error("chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Beneficiary identifier is not a valid ledger account reference.
    #[error("invalid beneficiary identifier: {0}")]
    InvalidBeneficiary(String),

    /// Fixed claim amount cannot be represented in the call signature.
    #[error("claim amount out of range: {0}")]
    AmountOverflow(String),
}

/// Result type for ledger operations.
pub type ChainResult<T> = Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_conversion() {
        let chain_id = ChainId::from(1u64);
        assert_eq!(chain_id.0, 1);
        assert_eq!(u64::from(chain_id), 1);
    }

    #[test]
    fn test_error_display() {
        let err = ChainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = ChainError::FeeTooHigh {
            current_gwei: 600,
            max_gwei: 500,
        };
        assert!(err.to_string().contains("600"));

        let err = ChainError::InclusionTimeout {
            tx_hash: "0xabc".to_string(),
            waited_secs: 180,
        };
        assert!(err.to_string().contains("0xabc"));
    }
}
