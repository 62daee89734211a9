//! Per-attempt claim assembly.
//!
//! # Responsibilities
//! - Encode the `claim(address,int256)` call for one beneficiary
//! - Resolve the current fee rate (multiplier and hard cap applied)
//! - Estimate compute cost (a simulated revert is a build failure)
//! - Fetch the operator's current sequence number
//!
//! Everything mutable is re-queried on every call; a claim is never
//! rebuilt from stale numbers.

use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::{Address, Bytes, I256};
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::blockchain::gateway::LedgerGateway;
use crate::blockchain::types::{ChainConfig, ChainError, ChainResult};
use crate::ingest::record::{AmountPolicy, BeneficiaryRecord};

sol! {
    /// Vesting claim entry point on the target contract. An amount of -1
    /// claims the beneficiary's full entitlement.
    function claim(address wallet, int256 amount);
}

/// A fully resolved claim, ready to sign and broadcast.
///
/// Constructed fresh for every attempt; fee rate, compute limit, and
/// sequence number are only valid for the attempt they were resolved for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingClaim {
    /// The beneficiary being disbursed to.
    pub beneficiary: Address,
    /// Target contract.
    pub to: Address,
    /// ABI-encoded call data.
    pub input: Bytes,
    /// Gas price in wei, multiplier applied.
    pub fee_rate: u128,
    /// Gas limit from the node's estimate.
    pub compute_limit: u64,
    /// Operator sequence number for this attempt.
    pub sequence: u64,
    /// Chain ID for replay protection.
    pub chain_id: u64,
}

/// Assembles one claim per beneficiary per attempt.
pub struct ClaimBuilder<G> {
    gateway: Arc<G>,
    contract: Address,
    operator: Address,
    chain_id: u64,
    gas_price_multiplier: f64,
    max_gas_price_gwei: u64,
}

impl<G: LedgerGateway> ClaimBuilder<G> {
    pub fn new(gateway: Arc<G>, contract: Address, operator: Address, chain: &ChainConfig) -> Self {
        Self {
            gateway,
            contract,
            operator,
            chain_id: chain.chain_id,
            gas_price_multiplier: chain.gas_price_multiplier,
            max_gas_price_gwei: chain.max_gas_price_gwei,
        }
    }

    /// Build a claim for one beneficiary.
    ///
    /// Any failure here (malformed identifier, fee spike, estimation
    /// revert, sequence query failure) is recoverable from the loop's
    /// point of view: the beneficiary is retried with a fresh build.
    pub async fn build(&self, record: &BeneficiaryRecord) -> ChainResult<PendingClaim> {
        let beneficiary = Address::from_str(&record.identifier)
            .map_err(|e| ChainError::InvalidBeneficiary(format!("{}: {}", record.identifier, e)))?;

        let input = encode_claim(beneficiary, &record.amount)?;

        let fee_rate = self.resolve_fee_rate().await?;

        // Estimated against the node; a revert here aborts the attempt
        // before anything is signed.
        let compute_limit = self
            .gateway
            .estimate_compute(self.operator, self.contract, input.clone())
            .await?;

        // Re-read every attempt: an earlier broadcast may have consumed a
        // sequence number even if its acknowledgment never arrived.
        let sequence = self.gateway.sequence_number(self.operator).await?;

        Ok(PendingClaim {
            beneficiary,
            to: self.contract,
            input,
            fee_rate,
            compute_limit,
            sequence,
            chain_id: self.chain_id,
        })
    }

    async fn resolve_fee_rate(&self) -> ChainResult<u128> {
        let fee_rate = self.gateway.fee_rate().await?;

        let fee_gwei = fee_rate / 1_000_000_000;
        if fee_gwei > self.max_gas_price_gwei as u128 {
            return Err(ChainError::FeeTooHigh {
                current_gwei: fee_gwei as u64,
                max_gwei: self.max_gas_price_gwei,
            });
        }

        Ok((fee_rate as f64 * self.gas_price_multiplier) as u128)
    }
}

/// Encode the claim call data.
///
/// The claim-all sentinel goes on the wire verbatim as `int256(-1)`; the
/// entitlement is resolved by the contract, never substituted locally.
pub fn encode_claim(beneficiary: Address, amount: &AmountPolicy) -> ChainResult<Bytes> {
    let amount = match amount {
        AmountPolicy::ClaimAll => I256::MINUS_ONE,
        AmountPolicy::Fixed(value) => I256::try_from(*value)
            .map_err(|_| ChainError::AmountOverflow(value.to_string()))?,
    };

    let call = claimCall {
        wallet: beneficiary,
        amount,
    };
    Ok(call.abi_encode().into())
}
