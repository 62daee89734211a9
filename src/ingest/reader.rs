//! Streaming beneficiary ingestion with duplicate suppression.
//!
//! # Responsibilities
//! - Read records one at a time (the source is never materialized up front)
//! - Lower-case identifiers to their submission form
//! - Skip-and-log duplicates without failing the run
//! - Surface malformed input as a fatal error before any submission
//!
//! The dedup set is owned by the caller and passed in explicitly, so a
//! surrounding service can carry it across several ingestion calls.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::ingest::record::{AmountPolicy, BeneficiaryRecord, InvalidAmount};
use crate::integrations::queue::WorkQueue;
use crate::observability::metrics;

/// Name of the optional per-row amount column.
const AMOUNT_COLUMN: &str = "amount";

/// Errors surfaced by ingestion. All of these are fatal to the run.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Input source could not be opened or read.
    #[error("input IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input is not well-formed CSV.
    #[error("input parse error: {0}")]
    Csv(#[from] csv::Error),

    /// The configured identifier column is absent from the header.
    #[error("input is missing the '{column}' column")]
    MissingColumn { column: String },

    /// A row carries no identifier.
    #[error("empty identifier on line {line}")]
    EmptyIdentifier { line: u64 },

    /// A row carries an unparseable amount.
    #[error("line {line}: {source}")]
    Amount {
        line: u64,
        #[source]
        source: InvalidAmount,
    },
}

/// Load beneficiaries from a CSV source, deduplicating by identity key.
///
/// The identity key is the lower-cased identifier, which is also the
/// submission form. A row whose key is already in `seen` is dropped and
/// logged with its raw spelling; it never fails the run. `seen` is owned by
/// the caller and updated in place.
pub fn load_beneficiaries<R: Read>(
    source: R,
    column: &str,
    default_amount: &AmountPolicy,
    seen: &mut HashSet<String>,
) -> Result<Vec<BeneficiaryRecord>, IngestError> {
    let mut reader = csv::Reader::from_reader(source);

    let headers = reader.headers()?.clone();
    let id_idx = headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| IngestError::MissingColumn {
            column: column.to_string(),
        })?;
    let amount_idx = headers.iter().position(|h| h.trim() == AMOUNT_COLUMN);

    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        let raw = row.get(id_idx).unwrap_or_default().trim();
        if raw.is_empty() {
            return Err(IngestError::EmptyIdentifier { line });
        }

        let key = raw.to_lowercase();
        if !seen.insert(key.clone()) {
            tracing::warn!(identifier = raw, line, "Duplicate beneficiary skipped");
            metrics::record_duplicate_skip();
            continue;
        }

        let amount = match amount_idx.and_then(|i| row.get(i)).map(str::trim) {
            Some(s) if !s.is_empty() => AmountPolicy::from_str(s)
                .map_err(|source| IngestError::Amount { line, source })?,
            _ => default_amount.clone(),
        };

        records.push(BeneficiaryRecord {
            identifier: key,
            amount,
        });
    }

    Ok(records)
}

/// Load beneficiaries from a CSV file on disk.
pub fn load_beneficiaries_from_path(
    path: &Path,
    column: &str,
    default_amount: &AmountPolicy,
    seen: &mut HashSet<String>,
) -> Result<Vec<BeneficiaryRecord>, IngestError> {
    let file = File::open(path)?;
    load_beneficiaries(file, column, default_amount, seen)
}

/// Drain a durable work queue into an ordered beneficiary list.
///
/// Items run through the same normalization and dedup path as CSV rows.
/// Draining stops at the first empty pop.
pub fn drain_work_queue<Q: WorkQueue>(
    queue: &Q,
    default_amount: &AmountPolicy,
    seen: &mut HashSet<String>,
) -> Result<Vec<BeneficiaryRecord>, IngestError> {
    let mut records = Vec::new();

    while let Some(item) = queue.pop()? {
        let raw = item.wallet.trim();
        if raw.is_empty() {
            return Err(IngestError::EmptyIdentifier { line: 0 });
        }

        let key = raw.to_lowercase();
        if !seen.insert(key.clone()) {
            tracing::warn!(identifier = raw, "Duplicate beneficiary skipped");
            metrics::record_duplicate_skip();
            continue;
        }

        let amount = match item.amount.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => AmountPolicy::from_str(s)
                .map_err(|source| IngestError::Amount { line: 0, source })?,
            _ => default_amount.clone(),
        };

        records.push(BeneficiaryRecord {
            identifier: key,
            amount,
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;

    fn load(csv: &str) -> Result<Vec<BeneficiaryRecord>, IngestError> {
        let mut seen = HashSet::new();
        load_beneficiaries(csv.as_bytes(), "wallet", &AmountPolicy::ClaimAll, &mut seen)
    }

    #[test]
    fn test_case_variant_duplicate_dropped() {
        // Second row is the same account in different case; it is dropped
        // and only the first occurrence survives, in input order.
        let records = load("wallet\n0xAAa1\n0xaaA1\n0xBBb2\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].identifier, "0xaaa1");
        assert_eq!(records[1].identifier, "0xbbb2");
    }

    #[test]
    fn test_exact_duplicates_counted_out() {
        let csv = "wallet\n0x01\n0x02\n0x01\n0x03\n0x02\n";
        let records = load(csv).unwrap();
        // N=5 rows, K=2 duplicates → 3 entries, order preserved
        let ids: Vec<_> = records.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(ids, vec!["0x01", "0x02", "0x03"]);
    }

    #[test]
    fn test_ingestion_is_idempotent() {
        let csv = "wallet\n0xFF01\n0xff02\n0xFF01\n";
        let mut seen_a = HashSet::new();
        let mut seen_b = HashSet::new();
        let a =
            load_beneficiaries(csv.as_bytes(), "wallet", &AmountPolicy::ClaimAll, &mut seen_a)
                .unwrap();
        let b =
            load_beneficiaries(csv.as_bytes(), "wallet", &AmountPolicy::ClaimAll, &mut seen_b)
                .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_caller_owned_set_spans_calls() {
        let mut seen = HashSet::new();
        let first =
            load_beneficiaries("wallet\n0x01\n".as_bytes(), "wallet", &AmountPolicy::ClaimAll, &mut seen)
                .unwrap();
        assert_eq!(first.len(), 1);

        // The same identifier in a later batch is a duplicate because the
        // caller kept the set.
        let second =
            load_beneficiaries("wallet\n0x01\n0x02\n".as_bytes(), "wallet", &AmountPolicy::ClaimAll, &mut seen)
                .unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].identifier, "0x02");
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let result = load("address\n0x01\n");
        assert!(matches!(
            result,
            Err(IngestError::MissingColumn { column }) if column == "wallet"
        ));
    }

    #[test]
    fn test_empty_identifier_is_fatal() {
        let result = load("wallet,amount\n0x01,5\n,7\n");
        assert!(matches!(result, Err(IngestError::EmptyIdentifier { .. })));
    }

    #[test]
    fn test_per_row_amount_overrides_default() {
        let mut seen = HashSet::new();
        let records = load_beneficiaries(
            "wallet,amount\n0x01,500\n0x02,\n0x03,claim-all\n".as_bytes(),
            "wallet",
            &AmountPolicy::Fixed(U256::from(9u64)),
            &mut seen,
        )
        .unwrap();
        assert_eq!(records[0].amount, AmountPolicy::Fixed(U256::from(500u64)));
        assert_eq!(records[1].amount, AmountPolicy::Fixed(U256::from(9u64)));
        assert_eq!(records[2].amount, AmountPolicy::ClaimAll);
    }

    #[test]
    fn test_bad_amount_is_fatal() {
        let result = load("wallet,amount\n0x01,banana\n");
        assert!(matches!(result, Err(IngestError::Amount { .. })));
    }

    #[test]
    fn test_drain_work_queue_dedups() {
        use crate::ingest::record::QueuedClaim;
        use crate::integrations::queue::FileQueue;

        let path = std::env::temp_dir().join("disburser_ingest_queue.jsonl");
        std::fs::remove_file(&path).unwrap_or_default();
        let queue = FileQueue::new(&path);
        queue
            .push(&QueuedClaim {
                wallet: "0xAB".to_string(),
                amount: None,
            })
            .unwrap();
        queue
            .push(&QueuedClaim {
                wallet: "0xab".to_string(),
                amount: None,
            })
            .unwrap();
        queue
            .push(&QueuedClaim {
                wallet: "0xCD".to_string(),
                amount: Some("12".to_string()),
            })
            .unwrap();

        let mut seen = HashSet::new();
        let records = drain_work_queue(&queue, &AmountPolicy::ClaimAll, &mut seen).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].identifier, "0xab");
        assert_eq!(records[1].identifier, "0xcd");
        assert_eq!(records[1].amount, AmountPolicy::Fixed(U256::from(12u64)));

        std::fs::remove_file(&path).unwrap_or_default();
    }
}
