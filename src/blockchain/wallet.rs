//! Operator credential handling and transaction signing.
//!
//! # Security
//! - Private keys are loaded once, from a keystore file or environment
//!   variable, and never touched again
//! - Keys are never logged or serialized
//! - Signing happens entirely locally

use std::path::Path;
use std::str::FromStr;

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use serde::Deserialize;

use crate::blockchain::types::{ChainError, ChainResult};
use crate::config::schema::CredentialConfig;

/// Environment variable consulted when no keystore path is configured.
pub const PRIVATE_KEY_ENV_VAR: &str = "DISBURSER_PRIVATE_KEY";

/// On-disk keystore format: the operator's address and key material.
#[derive(Deserialize)]
struct KeystoreFile {
    address: String,
    private_key: String,
}

/// The operator's signing credential.
///
/// Exclusively owned by the process and read-only after construction.
/// There is deliberately no cached sequence number here: the builder
/// re-queries it from the ledger on every attempt.
pub struct OperatorWallet {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
    /// Chain ID for EIP-155 replay protection.
    chain_id: u64,
}

impl OperatorWallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Security
    /// The private key is parsed and stored securely. It is never logged.
    pub fn from_private_key(private_key_hex: &str, chain_id: u64) -> ChainResult<Self> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| ChainError::Wallet(format!("Invalid private key format: {}", e)))?;

        tracing::info!(
            address = %signer.address(),
            chain_id = chain_id,
            "Operator wallet initialized"
        );

        Ok(Self { signer, chain_id })
    }

    /// Load the wallet from a JSON keystore file.
    ///
    /// The declared address must match the one derived from the key; a
    /// mismatch means the wrong key file and is fatal.
    pub fn from_keystore_file(path: &Path, chain_id: u64) -> ChainResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ChainError::Wallet(format!("Cannot read keystore '{}': {}", path.display(), e))
        })?;
        let keystore: KeystoreFile = serde_json::from_str(&content)
            .map_err(|e| ChainError::Wallet(format!("Malformed keystore: {}", e)))?;

        let wallet = Self::from_private_key(&keystore.private_key, chain_id)?;

        let declared = Address::from_str(keystore.address.trim()).map_err(|e| {
            ChainError::Wallet(format!("Keystore address is invalid: {}", e))
        })?;
        if declared != wallet.address() {
            return Err(ChainError::Wallet(format!(
                "Keystore address {} does not match key-derived address {}",
                declared,
                wallet.address()
            )));
        }

        Ok(wallet)
    }

    /// Load the wallet from the `DISBURSER_PRIVATE_KEY` environment
    /// variable.
    pub fn from_env(chain_id: u64) -> ChainResult<Self> {
        let private_key = std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            ChainError::Wallet(format!(
                "Environment variable {} not set",
                PRIVATE_KEY_ENV_VAR
            ))
        })?;

        Self::from_private_key(&private_key, chain_id)
    }

    /// Load the wallet as configured: keystore file when a path is set,
    /// environment variable otherwise.
    pub fn load(config: &CredentialConfig, chain_id: u64) -> ChainResult<Self> {
        match &config.keystore_path {
            Some(path) => Self::from_keystore_file(Path::new(path), chain_id),
            None => Self::from_env(chain_id),
        }
    }

    /// Get the operator's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Get the chain ID this wallet is configured for.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Network wallet for signing transaction requests.
    pub fn network_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

impl Clone for OperatorWallet {
    fn clone(&self) -> Self {
        Self {
            signer: self.signer.clone(),
            chain_id: self.chain_id,
        }
    }
}

impl std::fmt::Debug for OperatorWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorWallet")
            .field("address", &self.signer.address())
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    #[test]
    fn test_wallet_from_private_key() {
        let wallet = OperatorWallet::from_private_key(TEST_PRIVATE_KEY, 1).unwrap();
        assert_eq!(wallet.address().to_string().to_lowercase(), TEST_ADDRESS);
    }

    #[test]
    fn test_wallet_with_0x_prefix() {
        let wallet =
            OperatorWallet::from_private_key(&format!("0x{}", TEST_PRIVATE_KEY), 1).unwrap();
        assert_eq!(wallet.address().to_string().to_lowercase(), TEST_ADDRESS);
    }

    #[test]
    fn test_invalid_private_key() {
        let result = OperatorWallet::from_private_key("invalid_key", 1);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid private key"));
    }

    #[test]
    fn test_keystore_roundtrip() {
        let path = std::env::temp_dir().join("disburser_keystore_ok.json");
        std::fs::write(
            &path,
            format!(
                r#"{{"address": "{}", "private_key": "0x{}"}}"#,
                TEST_ADDRESS, TEST_PRIVATE_KEY
            ),
        )
        .unwrap();

        let wallet = OperatorWallet::from_keystore_file(&path, 31337).unwrap();
        assert_eq!(wallet.address().to_string().to_lowercase(), TEST_ADDRESS);
        assert_eq!(wallet.chain_id(), 31337);

        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_keystore_address_mismatch_is_fatal() {
        let path = std::env::temp_dir().join("disburser_keystore_mismatch.json");
        std::fs::write(
            &path,
            format!(
                // Anvil's second account address, first account's key
                r#"{{"address": "0x70997970C51812dc3A010C7d01b50e0d17dc79C8", "private_key": "{}"}}"#,
                TEST_PRIVATE_KEY
            ),
        )
        .unwrap();

        let result = OperatorWallet::from_keystore_file(&path, 1);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("does not match"));

        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_debug_never_exposes_key() {
        let wallet = OperatorWallet::from_private_key(TEST_PRIVATE_KEY, 1).unwrap();
        let debug = format!("{:?}", wallet);
        assert!(!debug.contains(TEST_PRIVATE_KEY));
    }
}
