use std::future::Future;

use alloy::network::Ethereum;
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{Provider, RootProvider};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::http::reqwest::{Client, Url};
use alloy::transports::http::Http;
use alloy::transports::{RpcError, TransportError};
use anyhow::{Context, Result};

use crate::config::verify_rpc_url;
use crate::errors::NodeError;
use crate::models::TxnReceipt;

pub type HttpProvider = RootProvider<Http<Client>, Ethereum>;

/// The node operations the depositor depends on. Every call is one
/// round-trip; none of them retry.
pub trait ChainClient {
    fn balance(&self, address: Address) -> impl Future<Output = Result<U256, NodeError>>;

    fn pending_nonce(&self, address: Address) -> impl Future<Output = Result<u64, NodeError>>;

    fn gas_price(&self) -> impl Future<Output = Result<u128, NodeError>>;

    fn chain_id(&self) -> impl Future<Output = Result<u64, NodeError>>;

    fn estimate_gas(
        &self,
        request: &TransactionRequest,
    ) -> impl Future<Output = Result<u64, NodeError>>;

    fn call(&self, request: &TransactionRequest) -> impl Future<Output = Result<Bytes, NodeError>>;

    fn send_raw_transaction(&self, raw: &[u8]) -> impl Future<Output = Result<B256, NodeError>>;

    /// `Ok(None)` while the transaction is not mined yet.
    fn transaction_receipt(
        &self,
        hash: B256,
    ) -> impl Future<Output = Result<Option<TxnReceipt>, NodeError>>;
}

pub struct RpcClient {
    provider: HttpProvider,
}

impl RpcClient {
    pub fn new(rpc_url: &str) -> Result<Self> {
        verify_rpc_url(rpc_url)?;
        let url = Url::parse(rpc_url).context("Failed to parse RPC URL")?;
        Ok(Self {
            provider: RootProvider::new_http(url),
        })
    }
}

fn node_error(err: TransportError) -> NodeError {
    match err {
        RpcError::ErrorResp(payload) => NodeError::Rejected(payload.to_string()),
        err => NodeError::Unreachable(err.to_string()),
    }
}

impl ChainClient for RpcClient {
    async fn balance(&self, address: Address) -> Result<U256, NodeError> {
        self.provider.get_balance(address).await.map_err(node_error)
    }

    async fn pending_nonce(&self, address: Address) -> Result<u64, NodeError> {
        self.provider
            .get_transaction_count(address)
            .pending()
            .await
            .map_err(node_error)
    }

    async fn gas_price(&self) -> Result<u128, NodeError> {
        self.provider.get_gas_price().await.map_err(node_error)
    }

    async fn chain_id(&self) -> Result<u64, NodeError> {
        self.provider.get_chain_id().await.map_err(node_error)
    }

    async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64, NodeError> {
        self.provider.estimate_gas(request).await.map_err(node_error)
    }

    async fn call(&self, request: &TransactionRequest) -> Result<Bytes, NodeError> {
        self.provider.call(request).await.map_err(node_error)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, NodeError> {
        let pending_txn = self
            .provider
            .send_raw_transaction(raw)
            .await
            .map_err(node_error)?;
        Ok(*pending_txn.tx_hash())
    }

    async fn transaction_receipt(&self, hash: B256) -> Result<Option<TxnReceipt>, NodeError> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(node_error)?;

        Ok(receipt.map(|receipt| TxnReceipt {
            hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            success: receipt.status(),
        }))
    }
}
