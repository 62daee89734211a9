//! Configuration validation.
//!
//! Semantic checks on top of serde's syntactic ones: address formats,
//! value ranges, cross-field consistency. All errors are collected and
//! returned together rather than failing on the first.

use std::str::FromStr;

use alloy::primitives::Address;

use crate::config::schema::JobConfig;
use crate::ingest::AmountPolicy;

/// A single semantic validation failure.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `contract.address`.
    pub field: String,
    /// Human-readable description.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a loaded configuration, returning every error found.
pub fn validate_config(config: &JobConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut err = |field: &str, message: String| {
        errors.push(ValidationError {
            field: field.to_string(),
            message,
        });
    };

    if config.chain.rpc_url.is_empty() {
        err("chain.rpc_url", "must not be empty".to_string());
    } else if let Err(e) = url::Url::parse(&config.chain.rpc_url) {
        err("chain.rpc_url", format!("not a valid URL: {}", e));
    }

    for (i, u) in config.chain.failover_urls.iter().enumerate() {
        if url::Url::parse(u).is_err() {
            err(
                &format!("chain.failover_urls[{}]", i),
                format!("not a valid URL: {}", u),
            );
        }
    }

    if config.chain.chain_id == 0 {
        err("chain.chain_id", "must be non-zero".to_string());
    }
    if config.chain.rpc_timeout_secs == 0 {
        err("chain.rpc_timeout_secs", "must be non-zero".to_string());
    }
    if config.chain.inclusion_timeout_secs == 0 {
        err("chain.inclusion_timeout_secs", "must be non-zero".to_string());
    }
    if config.chain.gas_price_multiplier < 1.0 {
        err(
            "chain.gas_price_multiplier",
            "must be at least 1.0".to_string(),
        );
    }
    if config.chain.max_gas_price_gwei == 0 {
        err("chain.max_gas_price_gwei", "must be non-zero".to_string());
    }

    if Address::from_str(&config.contract.address).is_err() {
        err(
            "contract.address",
            format!("not a valid address: '{}'", config.contract.address),
        );
    }

    if config.input.path.is_empty() {
        err("input.path", "must not be empty".to_string());
    }
    if config.input.column.is_empty() {
        err("input.column", "must not be empty".to_string());
    }

    if let Err(e) = AmountPolicy::from_str(&config.amount.policy) {
        err("amount.policy", e.to_string());
    }

    if config.retry.base_delay_ms == 0 {
        err("retry.base_delay_ms", "must be non-zero".to_string());
    }
    if config.retry.max_delay_ms < config.retry.base_delay_ms {
        err(
            "retry.max_delay_ms",
            "must be >= retry.base_delay_ms".to_string(),
        );
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        err(
            "observability.metrics_address",
            format!(
                "not a valid socket address: '{}'",
                config.observability.metrics_address
            ),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> JobConfig {
        let mut config = JobConfig::default();
        config.contract.address = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".to_string();
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_all_errors_collected() {
        let mut config = valid_config();
        config.contract.address = "not-an-address".to_string();
        config.chain.chain_id = 0;
        config.retry.base_delay_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.field == "contract.address"));
        assert!(errors.iter().any(|e| e.field == "chain.chain_id"));
        assert!(errors.iter().any(|e| e.field == "retry.base_delay_ms"));
    }

    #[test]
    fn test_bad_amount_policy() {
        let mut config = valid_config();
        config.amount.policy = "lots".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "amount.policy"));
    }

    #[test]
    fn test_backoff_range_check() {
        let mut config = valid_config();
        config.retry.base_delay_ms = 1000;
        config.retry.max_delay_ms = 100;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "retry.max_delay_ms"));
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = valid_config();
        config.observability.metrics_address = "nonsense".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
