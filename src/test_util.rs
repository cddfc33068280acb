use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use alloy::consensus::TxEnvelope;
use alloy::dyn_abi::DynSolValue;
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{address, keccak256, Address, Bytes, B256, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;

use crate::contract::Contract;
use crate::errors::NodeError;
use crate::logging::SuccessSink;
use crate::models::TxnReceipt;
use crate::provider::ChainClient;

pub const MOCK_CHAIN_ID: u64 = 1;
pub const MOCK_FIRST_BLOCK: u64 = 19_000_000;

pub const WALLET_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
pub const WALLET_ADDRESS: Address = address!("70997970c51812dc3a010c7d01b50e0d17dc79c8");
pub const SECOND_WALLET_KEY: &str =
    "5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a";

pub const STAKING_ADDRESS: Address = address!("d9a442856c234a39a81a089c06451ebaa4306a72");
pub const VAULT_SUPERVISOR_ADDRESS: Address = address!("54e44dbb92dba848ace27f44c0cb4268981ef1cc");
pub const VAULT_ADDRESS: Address = address!("68754d29f2e97b837cb622ccff325adac27e9977");

pub const STAKING_ABI: &str = include_str!("../abis/staking.json");
pub const VAULT_SUPERVISOR_ABI: &str = include_str!("../abis/vault_supervisor.json");

pub fn gwei(amount: u64) -> u128 {
    amount as u128 * 1_000_000_000
}

pub fn test_signer() -> PrivateKeySigner {
    WALLET_KEY.parse().unwrap()
}

pub fn second_signer() -> PrivateKeySigner {
    SECOND_WALLET_KEY.parse().unwrap()
}

pub fn staking_contract() -> Contract {
    Contract::from_json("staking", STAKING_ADDRESS, STAKING_ABI).unwrap()
}

pub fn vault_supervisor_contract() -> Contract {
    Contract::from_json("vault_supervisor", VAULT_SUPERVISOR_ADDRESS, VAULT_SUPERVISOR_ABI)
        .unwrap()
}

struct MockState {
    default_balance: U256,
    balances: HashMap<Address, U256>,
    balance_failures: usize,
    nonce: u64,
    nonce_unreachable: bool,
    gas_prices: VecDeque<u128>,
    last_gas_price: u128,
    gas_price_unreachable: bool,
    gas_price_polls: usize,
    gas_estimate: u64,
    token_balance: U256,
    receipt_misses: usize,
    receipt_polls: usize,
    reverting: bool,
    broadcasts: Vec<Vec<u8>>,
}

/// In-memory node. Gas prices are served in order and the last one repeats.
/// Every broadcast is mined in its own block.
pub struct MockChain {
    state: Mutex<MockState>,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                default_balance: U256::ZERO,
                balances: HashMap::new(),
                balance_failures: 0,
                nonce: 0,
                nonce_unreachable: false,
                gas_prices: VecDeque::new(),
                last_gas_price: 1,
                gas_price_unreachable: false,
                gas_price_polls: 0,
                gas_estimate: 21_000,
                token_balance: U256::ZERO,
                receipt_misses: 0,
                receipt_polls: 0,
                reverting: false,
                broadcasts: Vec::new(),
            }),
        }
    }

    fn update(self, f: impl FnOnce(&mut MockState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    /// Native balance for every address without an explicit entry.
    pub fn with_balance(self, balance: U256) -> Self {
        self.update(|state| state.default_balance = balance)
    }

    pub fn with_balance_of(self, address: Address, balance: U256) -> Self {
        self.update(|state| {
            state.balances.insert(address, balance);
        })
    }

    /// The first `count` balance requests fail as unreachable.
    pub fn with_balance_failures(self, count: usize) -> Self {
        self.update(|state| state.balance_failures = count)
    }

    pub fn with_nonce(self, nonce: u64) -> Self {
        self.update(|state| state.nonce = nonce)
    }

    pub fn with_unreachable_nonce(self) -> Self {
        self.update(|state| state.nonce_unreachable = true)
    }

    pub fn with_gas_prices(self, prices: Vec<u128>) -> Self {
        self.update(|state| state.gas_prices = prices.into())
    }

    pub fn with_unreachable_gas_price(self) -> Self {
        self.update(|state| state.gas_price_unreachable = true)
    }

    pub fn with_gas_estimate(self, gas: u64) -> Self {
        self.update(|state| state.gas_estimate = gas)
    }

    /// Value returned by every `balanceOf` style view call.
    pub fn with_token_balance(self, balance: U256) -> Self {
        self.update(|state| state.token_balance = balance)
    }

    pub fn with_receipt_misses(self, misses: usize) -> Self {
        self.update(|state| state.receipt_misses = misses)
    }

    pub fn with_reverting_receipts(self) -> Self {
        self.update(|state| state.reverting = true)
    }

    pub fn gas_price_polls(&self) -> usize {
        self.state.lock().unwrap().gas_price_polls
    }

    pub fn receipt_polls(&self) -> usize {
        self.state.lock().unwrap().receipt_polls
    }

    pub fn broadcast_hashes(&self) -> Vec<B256> {
        self.state
            .lock()
            .unwrap()
            .broadcasts
            .iter()
            .map(keccak256)
            .collect()
    }

    pub fn decoded_broadcasts(&self) -> Vec<TxEnvelope> {
        self.state
            .lock()
            .unwrap()
            .broadcasts
            .iter()
            .map(|raw| TxEnvelope::decode_2718(&mut raw.as_slice()).unwrap())
            .collect()
    }
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainClient for MockChain {
    async fn balance(&self, address: Address) -> Result<U256, NodeError> {
        let mut state = self.state.lock().unwrap();
        if state.balance_failures > 0 {
            state.balance_failures -= 1;
            return Err(NodeError::Unreachable("connection refused".to_string()));
        }
        Ok(state
            .balances
            .get(&address)
            .copied()
            .unwrap_or(state.default_balance))
    }

    async fn pending_nonce(&self, _address: Address) -> Result<u64, NodeError> {
        let state = self.state.lock().unwrap();
        if state.nonce_unreachable {
            return Err(NodeError::Unreachable("connection refused".to_string()));
        }
        Ok(state.nonce + state.broadcasts.len() as u64)
    }

    async fn gas_price(&self) -> Result<u128, NodeError> {
        let mut state = self.state.lock().unwrap();
        if state.gas_price_unreachable {
            return Err(NodeError::Unreachable("connection refused".to_string()));
        }
        state.gas_price_polls += 1;
        if let Some(price) = state.gas_prices.pop_front() {
            state.last_gas_price = price;
        }
        Ok(state.last_gas_price)
    }

    async fn chain_id(&self) -> Result<u64, NodeError> {
        Ok(MOCK_CHAIN_ID)
    }

    async fn estimate_gas(&self, _request: &TransactionRequest) -> Result<u64, NodeError> {
        Ok(self.state.lock().unwrap().gas_estimate)
    }

    async fn call(&self, _request: &TransactionRequest) -> Result<Bytes, NodeError> {
        let balance = self.state.lock().unwrap().token_balance;
        Ok(DynSolValue::Uint(balance, 256).abi_encode().into())
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, NodeError> {
        self.state.lock().unwrap().broadcasts.push(raw.to_vec());
        Ok(keccak256(raw))
    }

    async fn transaction_receipt(&self, hash: B256) -> Result<Option<TxnReceipt>, NodeError> {
        let mut state = self.state.lock().unwrap();
        state.receipt_polls += 1;
        if state.receipt_misses > 0 {
            state.receipt_misses -= 1;
            return Ok(None);
        }

        let position = state
            .broadcasts
            .iter()
            .position(|raw| keccak256(raw) == hash);
        Ok(position.map(|index| TxnReceipt {
            hash,
            block_number: Some(MOCK_FIRST_BLOCK + index as u64),
            success: !state.reverting,
        }))
    }
}

/// Success sink that keeps every line in memory.
#[derive(Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl SuccessSink for RecordingSink {
    fn record(&self, message: &str) -> anyhow::Result<()> {
        self.lines.lock().unwrap().push(message.to_string());
        Ok(())
    }
}
