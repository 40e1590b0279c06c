//! # Configuration
//!
//! [`FulfillmentConfig`] is read from TOML. Every section and key is optional and falls back to
//! the defaults below; `${VAR}` placeholders are replaced from the environment before parsing.
//!
//! ```toml
//! [store]
//! buffer_size = 32
//! call_timeout_ms = 10000
//! best_effort_timeout_ms = 5000
//!
//! [retry]
//! max_attempts = 3
//! base_delay_ms = 100
//! max_delay_ms = 2000
//!
//! [guard]
//! claim_ttl_ms = 30000
//!
//! [inventory]
//! low_stock_threshold = 10
//!
//! [receipts]
//! prefix = "${RECEIPT_PREFIX}"
//!
//! [log]
//! format = "json"   # or "compact"
//! ```

use regex::{Captures, Regex};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid placeholder pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FulfillmentConfig {
    pub store: StoreConfig,
    pub retry: RetryConfig,
    pub guard: GuardConfig,
    pub inventory: InventoryConfig,
    pub receipts: ReceiptConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Channel capacity of each record-set actor.
    pub buffer_size: usize,
    /// Deadline for interactive calls.
    pub call_timeout_ms: u64,
    /// Deadline for calls whose failure is only logged.
    pub best_effort_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            buffer_size: 32,
            call_timeout_ms: 10_000,
            best_effort_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Age after which an unfinished claim may be taken over by a retry.
    pub claim_ttl_ms: u64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self { claim_ttl_ms: 30_000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub low_stock_threshold: Decimal,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: Decimal::TEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptConfig {
    pub prefix: String,
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        Self {
            prefix: "LND".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
}

impl FulfillmentConfig {
    /// Loads and validates a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let processed = substitute_env_vars(content)?;
        let config: Self = toml::from_str(&processed)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: &str| ConfigError::Invalid {
            field,
            reason: reason.to_string(),
        };
        if self.store.buffer_size == 0 {
            return Err(invalid("store.buffer_size", "must be at least 1"));
        }
        if self.store.call_timeout_ms == 0 {
            return Err(invalid("store.call_timeout_ms", "must be positive"));
        }
        if self.store.best_effort_timeout_ms == 0 {
            return Err(invalid("store.best_effort_timeout_ms", "must be positive"));
        }
        if self.retry.max_attempts == 0 {
            return Err(invalid("retry.max_attempts", "must be at least 1"));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(invalid("retry.base_delay_ms", "must not exceed retry.max_delay_ms"));
        }
        if self.inventory.low_stock_threshold < Decimal::ZERO {
            return Err(invalid("inventory.low_stock_threshold", "must not be negative"));
        }
        if self.receipts.prefix.trim().is_empty() {
            return Err(invalid("receipts.prefix", "must not be empty"));
        }
        Ok(())
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.store.call_timeout_ms)
    }

    pub fn best_effort_timeout(&self) -> Duration {
        Duration::from_millis(self.store.best_effort_timeout_ms)
    }

    pub fn claim_ttl(&self) -> Duration {
        Duration::from_millis(self.guard.claim_ttl_ms)
    }
}

/// Replaces `${VAR}` with the variable's value. Unset variables are left as written.
fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([^}]+)\}")?;
    let result = re.replace_all(content, |caps: &Captures| {
        let name = &caps[1];
        std::env::var(name).unwrap_or_else(|_| format!("${{{name}}}"))
    });
    Ok(result.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = FulfillmentConfig::from_toml_str("").unwrap();
        assert_eq!(config, FulfillmentConfig::default());
        assert_eq!(config.call_timeout(), Duration::from_secs(10));
        assert_eq!(config.best_effort_timeout(), Duration::from_secs(5));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.receipts.prefix, "LND");
    }

    #[test]
    fn test_partial_sections() {
        let config = FulfillmentConfig::from_toml_str(
            r#"
[retry]
max_attempts = 5

[inventory]
low_stock_threshold = 2.5
"#,
        )
        .unwrap();
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_ms, 100);
        assert_eq!(config.inventory.low_stock_threshold, dec!(2.5));
        assert_eq!(config.store.buffer_size, 32);
    }

    #[test]
    fn test_log_format() {
        assert_eq!(FulfillmentConfig::default().log.format, LogFormat::Compact);
        let config = FulfillmentConfig::from_toml_str("[log]\nformat = \"json\"\n").unwrap();
        assert_eq!(config.log.format, LogFormat::Json);
        assert!(matches!(
            FulfillmentConfig::from_toml_str("[log]\nformat = \"xml\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("LAUNDRY_TEST_RECEIPT_PREFIX", "WSH");
        let config = FulfillmentConfig::from_toml_str(
            r#"
[receipts]
prefix = "${LAUNDRY_TEST_RECEIPT_PREFIX}"
"#,
        )
        .unwrap();
        assert_eq!(config.receipts.prefix, "WSH");
        std::env::remove_var("LAUNDRY_TEST_RECEIPT_PREFIX");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let err = FulfillmentConfig::from_toml_str("[retry]\nmax_attempts = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "retry.max_attempts", .. }));

        let err = FulfillmentConfig::from_toml_str(
            "[retry]\nbase_delay_ms = 5000\nmax_delay_ms = 100\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "retry.base_delay_ms", .. }));

        let err = FulfillmentConfig::from_toml_str("[store]\ncall_timeout_ms = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        assert!(matches!(
            FulfillmentConfig::from_toml_str("[store\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[guard]\nclaim_ttl_ms = 1000").unwrap();

        let config = FulfillmentConfig::from_file(file.path()).unwrap();
        assert_eq!(config.claim_ttl(), Duration::from_secs(1));

        assert!(matches!(
            FulfillmentConfig::from_file("/nonexistent/laundry.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
