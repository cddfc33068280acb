pub const SMALLEST_UNIT_SCALE: f64 = 1e18;
pub const INTERMEDIATE_UNIT_SCALE: f64 = 1e9;
pub const WEI_PER_GWEI: u128 = 1_000_000_000;

pub const SLIPPAGE_PERCENT: u64 = 1;

pub const DEFAULT_GAS_POLL_INTERVAL_SEC: u64 = 30;
pub const DEFAULT_RECEIPT_POLL_INTERVAL_SEC: u64 = 1;
pub const DEFAULT_EXPLORER_TX_URL: &str = "https://etherscan.io/tx/";
pub const DEFAULT_KEYS_FILE: &str = "keys.txt";
pub const DEFAULT_SUCCESS_LOG_FILE: &str = "success.log";

pub(crate) const BALANCE_FETCH_RETRIES: usize = 3;
// 500ms, 1s, 2s before jitter
pub(crate) const BALANCE_FETCH_BACKOFF_BASE_MS: u64 = 2;
pub(crate) const BALANCE_FETCH_BACKOFF_FACTOR: u64 = 250;

pub const STAKE_DEPOSIT_FUNCTION: &str = "depositETH";
pub const APPROVE_FUNCTION: &str = "approve";
pub const BALANCE_OF_FUNCTION: &str = "balanceOf";
pub const VAULT_DEPOSIT_FUNCTION: &str = "deposit";

pub const CONFIG_ENV_PREFIX: &str = "RESTAKE";
