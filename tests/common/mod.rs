//! Shared utilities for integration testing the disbursement flow.

use std::collections::{HashSet, VecDeque};
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::sol_types::SolCall;

use vesting_disburser::blockchain::builder::claimCall;
use vesting_disburser::blockchain::types::{ChainConfig, ChainError, ChainResult};
use vesting_disburser::blockchain::{
    Broadcaster, ClaimBuilder, LedgerGateway, OperatorWallet,
};
use vesting_disburser::config::RetryConfig;
use vesting_disburser::ingest::{AmountPolicy, BeneficiaryRecord};
use vesting_disburser::integrations::OutcomePublisher;
use vesting_disburser::job::{DisbursementRun, SubmissionOutcome};

// Anvil's first account
pub const TEST_PRIVATE_KEY: &str =
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const CONTRACT: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

/// A scripted in-memory ledger.
///
/// Estimation can be failed per beneficiary (decoded from the call data)
/// or from a global front-to-back script; submission failures come from a
/// script. Unscripted calls succeed. The in-flight counter records the
/// maximum number of concurrent submissions ever observed.
#[derive(Default)]
pub struct ScriptedLedger {
    pub sequence_calls: AtomicU64,
    pub submit_count: AtomicU64,
    pub max_in_flight: AtomicU32,
    in_flight: AtomicU32,
    pub fail_estimates_for: Mutex<HashSet<Address>>,
    pub estimate_script: Mutex<VecDeque<Result<u64, String>>>,
    pub submit_script: Mutex<VecDeque<Result<(), String>>>,
    pub last_input: Mutex<Option<Bytes>>,
}

impl ScriptedLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl LedgerGateway for ScriptedLedger {
    async fn fee_rate(&self) -> ChainResult<u128> {
        Ok(1_000_000_000)
    }

    async fn sequence_number(&self, _account: Address) -> ChainResult<u64> {
        Ok(self.sequence_calls.fetch_add(1, Ordering::SeqCst))
    }

    async fn estimate_compute(
        &self,
        _from: Address,
        _to: Address,
        input: Bytes,
    ) -> ChainResult<u64> {
        self.last_input.lock().unwrap().replace(input.clone());

        let decoded = claimCall::abi_decode(&input)
            .map_err(|e| ChainError::Rpc(format!("undecodable call data: {}", e)))?;
        if self
            .fail_estimates_for
            .lock()
            .unwrap()
            .contains(&decoded.wallet)
        {
            return Err(ChainError::Rpc("execution reverted: nothing vested".to_string()));
        }

        match self.estimate_script.lock().unwrap().pop_front() {
            Some(Ok(gas)) => Ok(gas),
            Some(Err(msg)) => Err(ChainError::Rpc(msg)),
            None => Ok(60_000),
        }
    }

    async fn submit_signed(&self, _raw: Vec<u8>) -> ChainResult<TxHash> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        // Give an overlapping submission a chance to show up
        tokio::time::sleep(Duration::from_millis(2)).await;

        let result = self.submit_script.lock().unwrap().pop_front();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match result {
            Some(Err(msg)) => Err(ChainError::Rpc(msg)),
            _ => {
                let n = self.submit_count.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(TxHash::from(U256::from(n)))
            }
        }
    }
}

/// Publisher that collects outcomes for assertions.
#[derive(Default)]
pub struct CollectingPublisher {
    outcomes: Mutex<Vec<SubmissionOutcome>>,
}

impl CollectingPublisher {
    pub fn snapshot(&self) -> Vec<SubmissionOutcome> {
        self.outcomes.lock().unwrap().clone()
    }
}

impl OutcomePublisher for CollectingPublisher {
    fn publish(&self, outcome: &SubmissionOutcome) {
        self.outcomes.lock().unwrap().push(outcome.clone());
    }
}

/// Build a runner over the scripted ledger with near-zero backoff.
pub fn test_runner(
    gateway: Arc<ScriptedLedger>,
    shutdown: tokio::sync::broadcast::Receiver<()>,
) -> DisbursementRun<ScriptedLedger> {
    let chain = ChainConfig {
        chain_id: 31337,
        gas_price_multiplier: 1.0,
        max_gas_price_gwei: 500,
        ..ChainConfig::default()
    };
    let wallet = OperatorWallet::from_private_key(TEST_PRIVATE_KEY, 31337).unwrap();
    let contract = Address::from_str(CONTRACT).unwrap();

    let builder = ClaimBuilder::new(gateway.clone(), contract, wallet.address(), &chain);
    let broadcaster = Broadcaster::new(gateway, wallet);

    DisbursementRun::new(
        builder,
        broadcaster,
        RetryConfig {
            base_delay_ms: 1,
            max_delay_ms: 2,
        },
        shutdown,
    )
}

pub fn record(identifier: &str) -> BeneficiaryRecord {
    BeneficiaryRecord {
        identifier: identifier.to_string(),
        amount: AmountPolicy::ClaimAll,
    }
}

pub fn beneficiary(n: u8) -> String {
    format!("0x{}", hex_address(n))
}

fn hex_address(n: u8) -> String {
    let mut bytes = [0u8; 20];
    bytes[19] = n;
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn address_of(identifier: &str) -> Address {
    Address::from_str(identifier).unwrap()
}
