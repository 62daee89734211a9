//! Ledger RPC client with timeout and failover handling.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoints (primary + failovers)
//! - Read chain state: fee rate, sequence numbers, receipts
//! - Estimate compute cost for prospective calls
//! - Broadcast signed payloads and wait for inclusion

use std::sync::Arc;
use std::time::Duration;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use tokio::time::{interval, timeout};

use crate::blockchain::gateway::LedgerGateway;
use crate::blockchain::types::{ChainConfig, ChainError, ChainId, ChainResult};

/// How often receipt polling probes the network while waiting for
/// inclusion.
const INCLUSION_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Ledger RPC client wrapper with failover support.
#[derive(Clone)]
pub struct ChainClient {
    /// List of providers (primary + failovers).
    providers: Vec<Arc<dyn Provider + Send + Sync>>,
    /// Configuration.
    config: ChainConfig,
    /// Per-request timeout duration.
    timeout_duration: Duration,
}

impl ChainClient {
    /// Create a new ledger client and verify the chain ID.
    ///
    /// Chain verification failure is logged but not fatal; the RPC may be
    /// temporarily unreachable and every later call re-checks reachability
    /// by virtue of failing recoverably.
    pub async fn new(config: ChainConfig) -> ChainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            ChainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(
            Arc::new(ProviderBuilder::new().connect_http(primary_url))
                as Arc<dyn Provider + Send + Sync>,
        );

        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(
                    Arc::new(ProviderBuilder::new().connect_http(url))
                        as Arc<dyn Provider + Send + Sync>,
                );
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        let client = Self {
            providers,
            config: config.clone(),
            timeout_duration,
        };

        match client.verify_chain_id().await {
            Ok(()) => {
                tracing::info!(
                    rpc_url = %config.rpc_url,
                    chain_id = config.chain_id,
                    "Ledger client initialized"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Ledger client initialized but chain verification failed"
                );
            }
        }

        Ok(client)
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> ChainResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.config.chain_id {
            return Err(ChainError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> ChainResult<ChainId> {
        let mut last_error = String::new();
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_chain_id();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(ChainId(result)),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, error = %e, "RPC error, trying next provider");
                    last_error = e.to_string();
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, "RPC timeout, trying next provider");
                    last_error = "timeout".to_string();
                }
            }
        }
        Err(ChainError::Rpc(format!(
            "All providers failed to get chain ID: {}",
            last_error
        )))
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> ChainResult<u64> {
        let mut last_error = String::new();
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_block_number();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, error = %e, "RPC error");
                    last_error = e.to_string();
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, "RPC timeout");
                    last_error = "timeout".to_string();
                }
            }
        }
        Err(ChainError::Rpc(format!(
            "All providers failed to get block number: {}",
            last_error
        )))
    }

    /// Get the current gas price in wei.
    pub async fn get_gas_price(&self) -> ChainResult<u128> {
        let mut last_error = String::new();
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_gas_price();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, error = %e, "RPC error");
                    last_error = e.to_string();
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, "RPC timeout");
                    last_error = "timeout".to_string();
                }
            }
        }
        Err(ChainError::Rpc(format!(
            "All providers failed to get gas price: {}",
            last_error
        )))
    }

    /// Get the transaction count (next sequence number) for an address.
    pub async fn get_transaction_count(&self, address: Address) -> ChainResult<u64> {
        let mut last_error = String::new();
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_transaction_count(address);
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, error = %e, "RPC error");
                    last_error = e.to_string();
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, "RPC timeout");
                    last_error = "timeout".to_string();
                }
            }
        }
        Err(ChainError::Rpc(format!(
            "All providers failed to get transaction count: {}",
            last_error
        )))
    }

    /// Estimate gas for a prospective call.
    ///
    /// A node-side revert during estimation comes back as the provider's
    /// error and is preserved in the returned message.
    pub async fn estimate_gas(&self, request: TransactionRequest) -> ChainResult<u64> {
        let mut last_error = String::new();
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.estimate_gas(request.clone());
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, error = %e, "Gas estimation failed");
                    last_error = e.to_string();
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, "RPC timeout");
                    last_error = "timeout".to_string();
                }
            }
        }
        Err(ChainError::Rpc(format!(
            "All providers failed to estimate gas: {}",
            last_error
        )))
    }

    /// Get a transaction receipt by hash.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> ChainResult<Option<TransactionReceipt>> {
        let mut last_error = String::new();
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_transaction_receipt(tx_hash);
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, error = %e, "RPC error");
                    last_error = e.to_string();
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, "RPC timeout");
                    last_error = "timeout".to_string();
                }
            }
        }
        Err(ChainError::Rpc(format!(
            "All providers failed to get receipt: {}",
            last_error
        )))
    }

    /// Broadcast a signed payload, returning its hash without waiting for
    /// inclusion.
    ///
    /// The same signed bytes may safely hit several providers; the ledger
    /// dedups by hash.
    pub async fn send_raw(&self, raw: &[u8]) -> ChainResult<TxHash> {
        let mut last_error = String::new();
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.send_raw_transaction(raw);
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(pending)) => return Ok(*pending.tx_hash()),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, error = %e, "Broadcast failed");
                    last_error = e.to_string();
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, "RPC timeout");
                    last_error = "timeout".to_string();
                }
            }
        }
        Err(ChainError::Rpc(format!(
            "All providers failed to broadcast: {}",
            last_error
        )))
    }

    /// Wait for a broadcast transaction to reach the configured
    /// confirmation depth.
    ///
    /// Returns the inclusion block number, or an error on revert or when
    /// the inclusion window elapses.
    pub async fn wait_for_inclusion(&self, tx_hash: TxHash) -> ChainResult<u64> {
        let required_confirmations = self.config.confirmation_blocks;
        let timeout_duration = Duration::from_secs(self.config.inclusion_timeout_secs);

        let result = timeout(timeout_duration, async {
            let mut ticker = interval(INCLUSION_POLL_INTERVAL);

            loop {
                ticker.tick().await;

                let receipt = match self.get_transaction_receipt(tx_hash).await? {
                    Some(r) => r,
                    None => {
                        tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                        continue;
                    }
                };

                if !receipt.status() {
                    return Err(ChainError::Reverted(format!(
                        "transaction {} reverted on-chain",
                        tx_hash
                    )));
                }

                let current_block = self.get_block_number().await?;
                let tx_block = receipt.block_number.unwrap_or(current_block);
                let confirmations = current_block.saturating_sub(tx_block) as u32;

                if confirmations >= required_confirmations {
                    return Ok(tx_block);
                }

                tracing::debug!(
                    tx_hash = %tx_hash,
                    confirmations = confirmations,
                    required = required_confirmations,
                    "Waiting for confirmations"
                );
            }
        })
        .await;

        match result {
            Ok(inner) => inner,
            Err(_) => Err(ChainError::InclusionTimeout {
                tx_hash: tx_hash.to_string(),
                waited_secs: self.config.inclusion_timeout_secs,
            }),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }
}

impl LedgerGateway for ChainClient {
    async fn fee_rate(&self) -> ChainResult<u128> {
        self.get_gas_price().await
    }

    async fn sequence_number(&self, account: Address) -> ChainResult<u64> {
        self.get_transaction_count(account).await
    }

    async fn estimate_compute(
        &self,
        from: Address,
        to: Address,
        input: Bytes,
    ) -> ChainResult<u64> {
        let request = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_input(input);
        self.estimate_gas(request).await
    }

    async fn submit_signed(&self, raw: Vec<u8>) -> ChainResult<TxHash> {
        let tx_hash = self.send_raw(&raw).await?;
        let block = self.wait_for_inclusion(tx_hash).await?;
        tracing::debug!(tx_hash = %tx_hash, block, "Transaction included");
        Ok(tx_hash)
    }
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
