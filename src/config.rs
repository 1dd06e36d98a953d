//! API server configuration

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use eyre::{eyre, Result, WrapErr};
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Deployed bridge contract on the demo network
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x68F7B6b2c9776F97Ff08584d79fBf2296a3C5328";

fn default_port() -> u16 {
    3000
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_rpc_url() -> String {
    "http://localhost:8545".to_string()
}

fn default_gas_buffer_percent() -> u64 {
    120
}

fn default_poll_interval_ms() -> u64 {
    4000
}

fn default_max_block_range() -> u64 {
    2000
}

/// Event watcher configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherConfig {
    pub enabled: bool,
    pub poll_interval: Duration,
    /// Maximum block range per eth_getLogs query
    pub max_block_range: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval: Duration::from_millis(default_poll_interval_ms()),
            max_block_range: default_max_block_range(),
        }
    }
}

/// API server configuration
#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub bind_address: String,
    /// EVM JSON-RPC endpoint
    pub rpc_url: String,
    /// Bridge contract address
    pub contract_address: Address,
    /// Signer key for bridge and admin transactions
    pub private_key: Option<String>,
    /// Gas limit is `estimate * gas_buffer_percent / 100`
    pub gas_buffer_percent: u64,
    pub watcher: WatcherConfig,
}

/// Custom Debug that redacts private_key to prevent accidental log leakage.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("bind_address", &self.bind_address)
            .field("rpc_url", &self.rpc_url)
            .field("contract_address", &self.contract_address)
            .field(
                "private_key",
                &self.private_key.as_ref().map(|_| "<redacted>"),
            )
            .field("gas_buffer_percent", &self.gas_buffer_percent)
            .field("watcher", &self.watcher)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment
    pub fn load() -> Result<Self> {
        // Try to load .env file
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded .env from {:?}", path);
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match var("PORT") {
            Some(v) => v.parse().wrap_err("PORT must be a valid u16")?,
            None => default_port(),
        };

        let contract_raw = var("CONTRACT_ADDRESS").unwrap_or_else(|| DEFAULT_CONTRACT_ADDRESS.to_string());
        let contract_address = Address::from_str(&contract_raw)
            .map_err(|e| eyre!("Invalid CONTRACT_ADDRESS {}: {}", contract_raw, e))?;

        let gas_buffer_percent = match var("GAS_BUFFER_PERCENT") {
            Some(v) => v.parse().wrap_err("GAS_BUFFER_PERCENT must be a valid u64")?,
            None => default_gas_buffer_percent(),
        };

        let poll_interval_ms = match var("EVENT_POLL_INTERVAL_MS") {
            Some(v) => v.parse().wrap_err("EVENT_POLL_INTERVAL_MS must be a valid u64")?,
            None => default_poll_interval_ms(),
        };

        let max_block_range = match var("EVENT_MAX_BLOCK_RANGE") {
            Some(v) => v.parse().wrap_err("EVENT_MAX_BLOCK_RANGE must be a valid u64")?,
            None => default_max_block_range(),
        };

        let watcher_enabled = match var("EVENT_WATCHER_ENABLED") {
            Some(v) => v
                .parse()
                .wrap_err("EVENT_WATCHER_ENABLED must be true or false")?,
            None => true,
        };

        let config = Config {
            port,
            bind_address: var("BIND_ADDRESS").unwrap_or_else(default_bind_address),
            rpc_url: var("RPC_URL").unwrap_or_else(default_rpc_url),
            contract_address,
            private_key: var("PRIVATE_KEY"),
            gas_buffer_percent,
            watcher: WatcherConfig {
                enabled: watcher_enabled,
                poll_interval: Duration::from_millis(poll_interval_ms),
                max_block_range,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.rpc_url)
            .map_err(|e| eyre!("RPC_URL is not a valid URL: {}", e))?;

        if let Some(key) = &self.private_key {
            // Never include the key or the parser message in the error
            PrivateKeySigner::from_str(key)
                .map_err(|_| eyre!("PRIVATE_KEY is not a valid secp256k1 private key"))?;
        }

        if self.gas_buffer_percent < 100 {
            return Err(eyre!(
                "GAS_BUFFER_PERCENT must be at least 100, got {}",
                self.gas_buffer_percent
            ));
        }

        if self.watcher.max_block_range == 0 {
            return Err(eyre!("EVENT_MAX_BLOCK_RANGE must be greater than 0"));
        }

        if self.watcher.poll_interval.is_zero() {
            return Err(eyre!("EVENT_POLL_INTERVAL_MS must be greater than 0"));
        }

        self.socket_addr()?;
        Ok(())
    }

    /// Address the HTTP server binds to
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|e| eyre!("Invalid bind address {}:{}: {}", self.bind_address, self.port, e))
    }
}
