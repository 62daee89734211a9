//! Signing and broadcast.
//!
//! The only step with an irreversible external side effect: once the
//! ledger accepts a signed claim, nothing here can take it back.

use std::sync::Arc;

use alloy::eips::eip2718::Encodable2718;
use alloy::network::TransactionBuilder;
use alloy::primitives::{TxHash, U256};
use alloy::rpc::types::TransactionRequest;

use crate::blockchain::builder::PendingClaim;
use crate::blockchain::gateway::LedgerGateway;
use crate::blockchain::types::{ChainError, ChainResult};
use crate::blockchain::wallet::OperatorWallet;

/// Signs assembled claims and submits them for inclusion.
pub struct Broadcaster<G> {
    gateway: Arc<G>,
    wallet: OperatorWallet,
}

impl<G: LedgerGateway> Broadcaster<G> {
    pub fn new(gateway: Arc<G>, wallet: OperatorWallet) -> Self {
        Self { gateway, wallet }
    }

    /// The operator address submissions originate from.
    pub fn operator(&self) -> alloy::primitives::Address {
        self.wallet.address()
    }

    /// Sign a claim locally and submit it, waiting for inclusion.
    ///
    /// The private key never leaves this step. Returns the transaction
    /// hash on acceptance; all failures (broadcast rejection, inclusion
    /// timeout, on-chain revert) are recoverable submission failures.
    pub async fn submit(&self, claim: &PendingClaim) -> ChainResult<TxHash> {
        let request = TransactionRequest::default()
            .with_from(self.wallet.address())
            .with_to(claim.to)
            .with_value(U256::ZERO)
            .with_input(claim.input.clone())
            .with_nonce(claim.sequence)
            .with_gas_price(claim.fee_rate)
            .with_gas_limit(claim.compute_limit)
            .with_chain_id(claim.chain_id);

        let envelope = request
            .build(&self.wallet.network_wallet())
            .await
            .map_err(|e| ChainError::Signing(e.to_string()))?;

        self.gateway.submit_signed(envelope.encoded_2718()).await
    }
}
