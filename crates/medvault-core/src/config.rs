use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{MedvaultError, MedvaultResult};
use crate::types::Network;

/// Top-level configuration (loaded from medvault.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MedvaultConfig {
    pub logging: LoggingConfig,
    pub crypto: CryptoConfig,
    pub ledger: LedgerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive (default: info). RUST_LOG takes precedence.
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

/// Passphrase KDF configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// KDF algorithm: "pbkdf2-sha256" (default) or "argon2id"
    pub kdf: String,
    /// PBKDF2-HMAC-SHA256 iterations (default: 100000)
    pub pbkdf2_iterations: u32,
    /// Argon2id memory cost in KiB (default: 65536 = 64 MiB)
    pub argon2_mem_cost_kib: u32,
    /// Argon2id time cost (iterations, default: 3)
    pub argon2_time_cost: u32,
    /// Argon2id parallelism (default: 4)
    pub argon2_parallelism: u32,
}

/// Ledger client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Network fingerprints are anchored on
    pub network: Network,
    /// Ledger gateway endpoint for the Polygon network
    pub polygon_rpc_url: String,
    /// Ledger gateway endpoint for the Ethereum network
    pub ethereum_rpc_url: String,
    /// Deadline in milliseconds for each ledger step, retries included
    pub timeout_ms: u64,
    /// Retry limit for network failures (rejections are never retried)
    pub max_retries: u32,
    /// Initial retry backoff in milliseconds, doubled per attempt
    pub retry_backoff_ms: u64,
}

impl LedgerConfig {
    /// Endpoint for the selected network
    pub fn rpc_url(&self) -> &str {
        match self.network {
            Network::Polygon => &self.polygon_rpc_url,
            Network::Ethereum => &self.ethereum_rpc_url,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            kdf: "pbkdf2-sha256".into(),
            pbkdf2_iterations: 100_000,
            argon2_mem_cost_kib: 65536,
            argon2_time_cost: 3,
            argon2_parallelism: 4,
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            network: Network::Polygon,
            polygon_rpc_url: "http://127.0.0.1:8545".into(),
            ethereum_rpc_url: "http://127.0.0.1:8546".into(),
            timeout_ms: 10_000,
            max_retries: 2,
            retry_backoff_ms: 250,
        }
    }
}

impl MedvaultConfig {
    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub async fn load(path: &Path) -> MedvaultResult<Self> {
        if !path.exists() {
            tracing::warn!("config file not found: {}  (using defaults)", path.display());
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&content)
            .map_err(|e| MedvaultError::Config(format!("parsing config {}: {e}", path.display())))
    }

    pub fn from_toml(content: &str) -> MedvaultResult<Self> {
        toml::from_str(content).map_err(|e| MedvaultError::Config(e.to_string()))
    }

    /// Apply overrides from `lookup` (normally the process environment):
    ///
    /// - `MEDVAULT_LEDGER_NETWORK`: `polygon` or `ethereum`
    /// - `POLYGON_RPC_URL`, `ETHEREUM_RPC_URL`: ledger gateway endpoints
    /// - `MEDVAULT_LOG`: log filter directive
    pub fn apply_overrides<F>(&mut self, lookup: F) -> MedvaultResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(network) = lookup("MEDVAULT_LEDGER_NETWORK") {
            self.ledger.network = network
                .parse()
                .map_err(|e| MedvaultError::Config(format!("MEDVAULT_LEDGER_NETWORK: {e}")))?;
        }
        if let Some(url) = lookup("POLYGON_RPC_URL") {
            self.ledger.polygon_rpc_url = url;
        }
        if let Some(url) = lookup("ETHEREUM_RPC_URL") {
            self.ledger.ethereum_rpc_url = url;
        }
        if let Some(level) = lookup("MEDVAULT_LOG") {
            self.logging.level = level;
        }
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) -> MedvaultResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }
}
