use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{B256, U256};

use crate::contract::Contract;

/// Mined transaction as reported by the node.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TxnReceipt {
    pub hash: B256,
    pub block_number: Option<u64>,
    pub success: bool,
}

/// A state changing call the pipeline should sign and broadcast.
#[derive(Clone, Debug)]
pub struct ContractCall<'a> {
    pub contract: &'a Contract,
    pub function: &'a str,
    pub args: Vec<DynSolValue>,
    pub value: U256,
}

impl<'a> ContractCall<'a> {
    pub fn new(contract: &'a Contract, function: &'a str, args: Vec<DynSolValue>) -> Self {
        Self {
            contract,
            function,
            args,
            value: U256::ZERO,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

#[derive(Clone, Debug)]
pub struct ConfirmedTxn {
    pub hash: B256,
    pub block_number: Option<u64>,
    pub explorer_link: String,
}

#[derive(Clone, Debug, Default)]
pub struct WalletReport {
    pub deposited: U256,
    pub derivative_balance: U256,
    pub stake_deposit_link: String,
    pub approve_link: String,
    pub vault_deposit_link: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}
