//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files and
//! every field has a default, so an empty file is a valid local setup.

use serde::{Deserialize, Serialize};

/// Root configuration for the bank client.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Node connection and confirmation settings.
    pub chain: ChainConfig,

    /// The bank contract to talk to.
    pub contract: ContractConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Chain connection settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Chain ID (e.g., 1 for Ethereum mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// Timeout for reads and receipt polls, in seconds. The confirmation
    /// wait as a whole is unbounded.
    pub rpc_timeout_secs: u64,

    /// Receipt polling cadence in milliseconds.
    pub poll_interval_ms: u64,

    /// Number of blocks (inclusion block included) before a transaction
    /// counts as confirmed.
    pub confirmation_blocks: u32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: 31337,
            rpc_timeout_secs: 10,
            poll_interval_ms: 2000,
            confirmation_blocks: 1,
        }
    }
}

/// Bank contract location.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ContractConfig {
    /// Deployed contract address (hex).
    pub address: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: "0x913C3FCF7340d9Df6BCFA063f363d5aA58226dA7".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_format: LogFormat,

    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            log_filter: "bank_client=info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.chain.chain_id, 31337);
        assert_eq!(config.chain.rpc_timeout_secs, 10);
        assert_eq!(config.chain.confirmation_blocks, 1);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [chain]
            rpc_url = "https://rpc.example.org"
            confirmation_blocks = 3

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.chain.rpc_url, "https://rpc.example.org");
        assert_eq!(config.chain.confirmation_blocks, 3);
        assert_eq!(config.chain.poll_interval_ms, 2000);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.contract, ContractConfig::default());
    }
}
