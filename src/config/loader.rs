//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::JobConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<JobConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: JobConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_valid_file() {
        let path = std::env::temp_dir().join("disburser_loader_ok.toml");
        fs::write(
            &path,
            r#"
            [contract]
            address = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
            "#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.chain.chain_id, 1);
        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_config(Path::new("/nonexistent/disburser.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let path = std::env::temp_dir().join("disburser_loader_bad.toml");
        fs::write(&path, "this is not toml = [").unwrap();
        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_semantic_failure_is_validation_error() {
        let path = std::env::temp_dir().join("disburser_loader_invalid.toml");
        fs::write(
            &path,
            r#"
            [contract]
            address = "nope"
            "#,
        )
        .unwrap();
        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
        fs::remove_file(&path).unwrap_or_default();
    }
}
