//! Beneficiary record types.

use std::str::FromStr;

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Spelling of the claim-all sentinel accepted in config and input rows.
pub const CLAIM_ALL_SENTINEL: &str = "claim-all";

/// How much a beneficiary claims.
///
/// `ClaimAll` is forwarded to the contract as `int256(-1)`; the ledger
/// resolves the actual entitlement. The job never computes entitlements
/// locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountPolicy {
    /// Claim the full entitlement as determined by the contract.
    ClaimAll,
    /// Claim a fixed token amount.
    Fixed(U256),
}

/// Amount string that is neither a decimal amount nor the sentinel.
#[derive(Debug, Clone, Error)]
#[error("invalid amount '{0}': expected a decimal amount, '-1', or 'claim-all'")]
pub struct InvalidAmount(pub String);

impl FromStr for AmountPolicy {
    type Err = InvalidAmount;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(CLAIM_ALL_SENTINEL) || s == "-1" {
            return Ok(AmountPolicy::ClaimAll);
        }
        U256::from_str(s)
            .map(AmountPolicy::Fixed)
            .map_err(|_| InvalidAmount(s.to_string()))
    }
}

impl std::fmt::Display for AmountPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AmountPolicy::ClaimAll => f.write_str(CLAIM_ALL_SENTINEL),
            AmountPolicy::Fixed(v) => write!(f, "{}", v),
        }
    }
}

/// One beneficiary to disburse to.
///
/// The identifier is stored in its lower-cased submission form; the raw
/// spelling from the input only appears in skip logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeneficiaryRecord {
    /// Ledger account reference, lower-cased.
    pub identifier: String,
    /// Claim amount for this beneficiary.
    pub amount: AmountPolicy,
}

/// A work item as carried by the durable queue (see `integrations::queue`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueuedClaim {
    /// Raw beneficiary identifier.
    pub wallet: String,
    /// Optional per-item amount; falls back to the job default.
    #[serde(default)]
    pub amount: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_policy_parsing() {
        assert_eq!(
            AmountPolicy::from_str("claim-all").unwrap(),
            AmountPolicy::ClaimAll
        );
        assert_eq!(AmountPolicy::from_str("-1").unwrap(), AmountPolicy::ClaimAll);
        assert_eq!(
            AmountPolicy::from_str("500").unwrap(),
            AmountPolicy::Fixed(U256::from(500u64))
        );
        assert!(AmountPolicy::from_str("lots").is_err());
        assert!(AmountPolicy::from_str("-2").is_err());
    }

    #[test]
    fn test_amount_policy_display() {
        assert_eq!(AmountPolicy::ClaimAll.to_string(), "claim-all");
        assert_eq!(AmountPolicy::Fixed(U256::from(7u64)).to_string(), "7");
    }

    #[test]
    fn test_queued_claim_serde() {
        let item: QueuedClaim = serde_json::from_str(r#"{"wallet":"0xAB"}"#).unwrap();
        assert_eq!(item.wallet, "0xAB");
        assert!(item.amount.is_none());
    }
}
