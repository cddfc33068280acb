use alloy::primitives::{Address, B256, U256};
use thiserror::Error;

/// Failure reported by the remote node for a single request.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Node unreachable. Error: {0}")]
    Unreachable(String),
    #[error("Request rejected by node. Error: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum TxnError {
    #[error("Node unreachable while {step}. Error: {reason}")]
    NodeUnreachable { step: &'static str, reason: String },
    #[error("Node rejected {step}. Error: {reason}")]
    NodeRejected { step: &'static str, reason: String },
    #[error("Insufficient balance in wallet. Required: {required}, available: {available}")]
    InsufficientBalance { required: U256, available: U256 },
    #[error("Abi encoding failed. Error: {0}")]
    AbiEncoding(String),
    #[error("Abi decoding failed. Error: {0}")]
    AbiDecoding(String),
    #[error("Signing failed. Error: {0}")]
    Signing(String),
    #[error("Transaction {hash} reverted in block {block_number:?}")]
    Reverted {
        hash: B256,
        block_number: Option<u64>,
    },
}

impl TxnError {
    /// Tags a node failure with the pipeline step that issued the request.
    pub fn from_node(step: &'static str, err: NodeError) -> Self {
        match err {
            NodeError::Unreachable(reason) => TxnError::NodeUnreachable { step, reason },
            NodeError::Rejected(reason) => TxnError::NodeRejected { step, reason },
        }
    }

    pub fn is_node_unreachable(&self) -> bool {
        matches!(self, TxnError::NodeUnreachable { .. })
    }
}

/// A failure that ends the current wallet's sequence but not the batch.
#[derive(Debug, Error)]
#[error("Wallet {wallet} failed at step '{step}'. Error: {source}")]
pub struct StepFailure {
    pub wallet: Address,
    pub step: WorkflowStep,
    #[source]
    pub source: StepError,
}

#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Txn(#[from] TxnError),
    #[error("{0}")]
    NothingToDeposit(String),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WorkflowStep {
    NativeBalance,
    StakeDeposit,
    DerivativeBalance,
    Approve,
    VaultDeposit,
}

impl WorkflowStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStep::NativeBalance => "native balance",
            WorkflowStep::StakeDeposit => "stake deposit",
            WorkflowStep::DerivativeBalance => "derivative balance",
            WorkflowStep::Approve => "approve",
            WorkflowStep::VaultDeposit => "vault deposit",
        }
    }
}

impl std::fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
