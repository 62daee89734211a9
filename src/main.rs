//! Batch vesting disbursement job entry point.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::Address;
use clap::Parser;
use tracing::Instrument;
use uuid::Uuid;

use vesting_disburser::blockchain::{Broadcaster, ChainClient, ClaimBuilder, OperatorWallet};
use vesting_disburser::config::{load_config, InputMode};
use vesting_disburser::ingest::{
    drain_work_queue, load_beneficiaries_from_path, AmountPolicy,
};
use vesting_disburser::integrations::{FileEventLog, FileQueue, NullPublisher, OutcomePublisher};
use vesting_disburser::job::{BeneficiaryQueue, DisbursementRun, RunReport};
use vesting_disburser::lifecycle::{spawn_signal_listener, Shutdown};
use vesting_disburser::observability;

#[derive(Parser)]
#[command(name = "vesting-disburser")]
#[command(about = "Submit one vesting claim per beneficiary", long_about = None)]
struct Cli {
    /// Path to the job configuration file.
    #[arg(short, long, default_value = "disburser.toml")]
    config: PathBuf,

    /// Override the configured input path.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Override the configured log level.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(input) = cli.input {
        config.input.path = input.display().to_string();
    }
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }

    observability::logging::init_logging(&config.observability.log_level);

    let run_id = Uuid::new_v4();
    tracing::info!(
        %run_id,
        config = %cli.config.display(),
        input = %config.input.path,
        chain_id = config.chain.chain_id,
        "vesting-disburser v0.1.0 starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => observability::metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Everything from here to the first submission is fail-fast: an
    // unreadable credential or input source exits non-zero before any
    // state-changing call.
    let default_amount = AmountPolicy::from_str(&config.amount.policy)?;
    let wallet = OperatorWallet::load(&config.credentials, config.chain.chain_id)?;
    let contract = Address::from_str(&config.contract.address)
        .map_err(|e| format!("invalid contract address: {}", e))?;
    let client = ChainClient::new(config.chain.clone()).await?;

    let mut seen = HashSet::new();
    let records = match config.input.mode {
        InputMode::Csv => load_beneficiaries_from_path(
            Path::new(&config.input.path),
            &config.input.column,
            &default_amount,
            &mut seen,
        )?,
        InputMode::Queue => drain_work_queue(
            &FileQueue::new(&config.input.path),
            &default_amount,
            &mut seen,
        )?,
    };

    tracing::info!(beneficiaries = records.len(), "Input loaded");

    let queue = BeneficiaryQueue::new(records);
    if queue.is_empty() {
        tracing::warn!("No beneficiaries to disburse");
        return Ok(());
    }

    let gateway = Arc::new(client);
    let builder = ClaimBuilder::new(gateway.clone(), contract, wallet.address(), &config.chain);
    let broadcaster = Broadcaster::new(gateway, wallet);

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    let runner = DisbursementRun::new(
        builder,
        broadcaster,
        config.retry.clone(),
        shutdown.subscribe(),
    );

    let publisher: Box<dyn OutcomePublisher> = match &config.events.log_path {
        Some(path) => Box::new(FileEventLog::new(path)),
        None => Box::new(NullPublisher),
    };

    let span = tracing::info_span!("disbursement", %run_id);
    let report = runner.run(&queue, publisher.as_ref()).instrument(span).await;

    match report {
        RunReport::Completed { submitted, aborted } => {
            tracing::info!(submitted, aborted, "Disbursement completed");
            Ok(())
        }
        RunReport::Interrupted {
            submitted,
            remaining,
            ..
        } => {
            tracing::error!(submitted, remaining, "Disbursement interrupted");
            Err("disbursement interrupted before completion".into())
        }
    }
}
