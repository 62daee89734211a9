//! The ledger seam.
//!
//! Everything the job needs from the ledger network, as one narrow trait:
//! read the fee rate, read the operator's sequence number, estimate the
//! compute cost of a prospective call, and submit a signed payload. The
//! production implementation is [`crate::blockchain::ChainClient`]; tests
//! script their own.

use alloy::primitives::{Address, Bytes, TxHash};

use crate::blockchain::types::ChainResult;

#[allow(async_fn_in_trait)]
pub trait LedgerGateway {
    /// Current recommended fee rate in wei.
    async fn fee_rate(&self) -> ChainResult<u128>;

    /// The account's next sequence number.
    ///
    /// Queried fresh for every build attempt; a prior broadcast may have
    /// consumed a number even if its acknowledgment was lost.
    async fn sequence_number(&self, account: Address) -> ChainResult<u64>;

    /// Compute-cost estimate for a prospective call.
    ///
    /// A node-side simulated revert surfaces as an error and must
    /// propagate to the caller unchanged in substance.
    async fn estimate_compute(
        &self,
        from: Address,
        to: Address,
        input: Bytes,
    ) -> ChainResult<u64>;

    /// Submit a signed payload and wait for inclusion.
    ///
    /// Returns the transaction hash on acceptance. Inclusion timeout and
    /// on-chain revert are errors, feeding the caller's retry path.
    async fn submit_signed(&self, raw: Vec<u8>) -> ChainResult<TxHash>;
}
