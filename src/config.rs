use std::path::PathBuf;

use alloy::primitives::Address;
use alloy::transports::http::reqwest::Url;
use anyhow::{anyhow, Context, Result};
use config::{self, Environment, File};
use serde::Deserialize;

use crate::constants::{
    CONFIG_ENV_PREFIX, DEFAULT_EXPLORER_TX_URL, DEFAULT_GAS_POLL_INTERVAL_SEC,
    DEFAULT_KEYS_FILE, DEFAULT_RECEIPT_POLL_INTERVAL_SEC, DEFAULT_SUCCESS_LOG_FILE,
};

pub struct ConfigManager {
    path: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub app: AppInfo,
    pub ethereum: EthereumConfig,
    pub contracts: ContractsConfig,
    #[serde(default)]
    pub files: FilesConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EthereumConfig {
    pub rpc: String,
    #[serde(default = "default_explorer_tx_url")]
    pub explorer_tx_url: String,
    pub delays: Delays,
    pub workflow: WorkflowConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Delays {
    pub wallet: Window,
    pub block: Window,
}

/// Inclusive lower and exclusive upper bound for random draws. `min == max`
/// pins the draw to `min`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
pub struct Window {
    pub min: u64,
    pub max: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct WorkflowConfig {
    /// Gas price ceiling in gwei.
    pub gwei_limit: u64,
    pub work_amount_range_percent: Window,
    #[serde(default = "default_gas_poll_interval")]
    pub gas_poll_interval_secs: u64,
    #[serde(default = "default_receipt_poll_interval")]
    pub receipt_poll_interval_secs: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ContractsConfig {
    pub staking: ContractConfig,
    pub vault_supervisor: ContractConfig,
    pub vault: Address,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ContractConfig {
    pub address: Address,
    /// Path to the JSON ABI, relative to the config file's directory.
    pub abi: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FilesConfig {
    #[serde(default = "default_keys_file")]
    pub keys: PathBuf,
    #[serde(default = "default_success_log_file")]
    pub success_log: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            keys: default_keys_file(),
            success_log: default_success_log_file(),
        }
    }
}

fn default_explorer_tx_url() -> String {
    DEFAULT_EXPLORER_TX_URL.to_string()
}

fn default_gas_poll_interval() -> u64 {
    DEFAULT_GAS_POLL_INTERVAL_SEC
}

fn default_receipt_poll_interval() -> u64 {
    DEFAULT_RECEIPT_POLL_INTERVAL_SEC
}

fn default_keys_file() -> PathBuf {
    PathBuf::from(DEFAULT_KEYS_FILE)
}

fn default_success_log_file() -> PathBuf {
    PathBuf::from(DEFAULT_SUCCESS_LOG_FILE)
}

impl ConfigManager {
    pub fn new(path: &str) -> ConfigManager {
        ConfigManager {
            path: path.to_string(),
        }
    }

    pub fn load_config(&self) -> Result<Config> {
        let settings = config::Config::builder()
            .add_source(File::with_name(self.path.as_str()))
            .add_source(Environment::with_prefix(CONFIG_ENV_PREFIX).separator("__"))
            .build()
            .with_context(|| format!("Failed to read config file {}", self.path))?;
        let config: Config = settings
            .try_deserialize()
            .context("Failed to decode config")?;
        config.validate()?;
        Ok(config)
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        verify_rpc_url(&self.ethereum.rpc)?;

        let delays = &self.ethereum.delays;
        check_window("ethereum.delays.wallet", delays.wallet)?;
        check_window("ethereum.delays.block", delays.block)?;

        let percent = self.ethereum.workflow.work_amount_range_percent;
        check_window("ethereum.workflow.work_amount_range_percent", percent)?;
        if percent.max > 100 {
            return Err(anyhow!(
                "ethereum.workflow.work_amount_range_percent.max must be at most 100, got {}",
                percent.max
            ));
        }
        Ok(())
    }
}

fn check_window(name: &str, window: Window) -> Result<()> {
    if window.min > window.max {
        return Err(anyhow!(
            "{}: min ({}) must not exceed max ({})",
            name,
            window.min,
            window.max
        ));
    }
    Ok(())
}

pub fn verify_rpc_url(rpc_url: &str) -> Result<()> {
    let url = Url::parse(rpc_url).context(format!("Failed to parse the RPC {:?}", rpc_url))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(anyhow!(
            "Invalid RPC URL: {:?}. URL must start with http or https",
            rpc_url
        ));
    }
    Ok(())
}
