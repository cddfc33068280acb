use std::time::Duration;

use alloy::dyn_abi::DynSolValue;
use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, B256, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::EthereumConfig;
use crate::contract::Contract;
use crate::conversion::{to_display_unit, to_intermediate_unit, transaction_cost};
use crate::errors::TxnError;
use crate::gas::GasPriceGate;
use crate::models::{ConfirmedTxn, ContractCall, TxnReceipt};
use crate::provider::ChainClient;

/// Builds, signs, broadcasts and confirms contract calls one at a time.
///
/// Every call goes through the same sequence:
/// - fetch the pending nonce, the suggested gas price and the chain id
/// - ABI encode the call data
/// - wait for the gas price gate
/// - estimate the gas limit and check the sender can pay for it
/// - sign an EIP-1559 transaction bound to the chain id and broadcast it
/// - poll for the receipt until the transaction is mined
///
/// Nonces are fetched fresh for every call and never tracked locally, so a
/// second process sending from the same key can race it.
pub struct TxnPipeline<'a, C> {
    client: &'a C,
    gas_gate: GasPriceGate,
    receipt_poll_interval: Duration,
    explorer_tx_url: String,
}

impl<'a, C: ChainClient> TxnPipeline<'a, C> {
    pub fn new(
        client: &'a C,
        gas_gate: GasPriceGate,
        receipt_poll_interval: Duration,
        explorer_tx_url: String,
    ) -> Self {
        Self {
            client,
            gas_gate,
            receipt_poll_interval,
            explorer_tx_url,
        }
    }

    pub fn from_config(client: &'a C, ethereum: &EthereumConfig) -> Self {
        let workflow = &ethereum.workflow;
        Self::new(
            client,
            GasPriceGate::new(
                workflow.gwei_limit,
                Duration::from_secs(workflow.gas_poll_interval_secs),
            ),
            Duration::from_secs(workflow.receipt_poll_interval_secs),
            ethereum.explorer_tx_url.clone(),
        )
    }

    pub fn client(&self) -> &'a C {
        self.client
    }

    pub fn explorer_link(&self, hash: B256) -> String {
        format!("{}{}", self.explorer_tx_url, hash)
    }

    /// Submits `call` from `signer` and waits until it is mined.
    ///
    /// # Errors
    /// * `TxnError::NodeUnreachable` / `TxnError::NodeRejected` - A node request failed
    /// * `TxnError::AbiEncoding` - The arguments do not fit the function
    /// * `TxnError::InsufficientBalance` - Value plus gas exceeds the balance; nothing is broadcast
    /// * `TxnError::Signing` - The transaction could not be signed
    /// * `TxnError::Reverted` - The transaction was mined with a failed status
    pub async fn submit_contract_call(
        &self,
        signer: &PrivateKeySigner,
        call: &ContractCall<'_>,
    ) -> Result<ConfirmedTxn, TxnError> {
        let sender = signer.address();

        let nonce = self
            .client
            .pending_nonce(sender)
            .await
            .map_err(|err| TxnError::from_node("fetching nonce", err))?;
        let quoted_gas_price = self
            .client
            .gas_price()
            .await
            .map_err(|err| TxnError::from_node("fetching gas price", err))?;
        let chain_id = self
            .client
            .chain_id()
            .await
            .map_err(|err| TxnError::from_node("fetching chain id", err))?;

        let input = call.contract.encode_call(call.function, &call.args)?;

        let gas_price = self.gas_gate.wait_for_acceptable(self.client).await?;
        if gas_price != quoted_gas_price {
            debug!(
                "Gas price moved from {} to {} wei while waiting",
                quoted_gas_price, gas_price
            );
        }

        let transaction_request = TransactionRequest::default()
            .with_from(sender)
            .with_to(call.contract.address)
            .with_value(call.value)
            .with_input(input);

        let gas_limit = self
            .client
            .estimate_gas(&transaction_request)
            .await
            .map_err(|err| TxnError::from_node("estimating gas", err))?;

        let balance = self
            .client
            .balance(sender)
            .await
            .map_err(|err| TxnError::from_node("fetching balance", err))?;

        let (total_cost, affordable) = transaction_cost(gas_limit, gas_price, call.value, balance);
        if !affordable {
            return Err(TxnError::InsufficientBalance {
                required: total_cost,
                available: balance,
            });
        }

        // Same price for tip and fee cap.
        let transaction_request = transaction_request
            .with_nonce(nonce)
            .with_chain_id(chain_id)
            .with_gas_limit(gas_limit)
            .with_max_fee_per_gas(gas_price)
            .with_max_priority_fee_per_gas(gas_price);

        debug!(
            "Signing {}.{} nonce={} gas_limit={} gas_price={:.2} Gwei cost={:.6} ETH",
            call.contract.name,
            call.function,
            nonce,
            gas_limit,
            to_intermediate_unit(U256::from(gas_price)),
            to_display_unit(total_cost)
        );

        let raw_txn = sign_transaction(signer, chain_id, transaction_request).await?;

        let txn_hash = self
            .client
            .send_raw_transaction(&raw_txn)
            .await
            .map_err(|err| TxnError::from_node("broadcasting transaction", err))?;
        info!("Transaction sent: {}", txn_hash);

        let receipt = self.wait_for_receipt(txn_hash).await?;
        if !receipt.success {
            return Err(TxnError::Reverted {
                hash: txn_hash,
                block_number: receipt.block_number,
            });
        }

        match receipt.block_number {
            Some(block_number) => info!("Transaction confirmed in block: {}", block_number),
            None => info!("Transaction confirmed"),
        }

        Ok(ConfirmedTxn {
            hash: txn_hash,
            block_number: receipt.block_number,
            explorer_link: self.explorer_link(txn_hash),
        })
    }

    /// Polls until the node returns a receipt. A missing receipt is not an
    /// error; a failed request is.
    pub async fn wait_for_receipt(&self, txn_hash: B256) -> Result<TxnReceipt, TxnError> {
        loop {
            let receipt = self
                .client
                .transaction_receipt(txn_hash)
                .await
                .map_err(|err| TxnError::from_node("polling receipt", err))?;

            match receipt {
                Some(receipt) => return Ok(receipt),
                None => sleep(self.receipt_poll_interval).await,
            }
        }
    }

    pub async fn native_balance(&self, address: Address) -> Result<U256, TxnError> {
        self.client
            .balance(address)
            .await
            .map_err(|err| TxnError::from_node("fetching balance", err))
    }

    /// Read-only call returning a single `uint256`, e.g. `balanceOf`.
    pub async fn read_uint(
        &self,
        contract: &Contract,
        function: &str,
        args: Vec<DynSolValue>,
    ) -> Result<U256, TxnError> {
        let input = contract.encode_call(function, &args)?;
        let transaction_request = TransactionRequest::default()
            .with_to(contract.address)
            .with_input(input);

        let output = self
            .client
            .call(&transaction_request)
            .await
            .map_err(|err| TxnError::from_node("calling contract", err))?;

        let values = contract.decode_output(function, args.len(), &output)?;
        values
            .first()
            .and_then(|value| value.as_uint())
            .map(|(value, _)| value)
            .ok_or_else(|| {
                TxnError::AbiDecoding(format!(
                    "{}.{} did not return a uint",
                    contract.name, function
                ))
            })
    }
}

async fn sign_transaction(
    signer: &PrivateKeySigner,
    chain_id: u64,
    transaction_request: TransactionRequest,
) -> Result<Vec<u8>, TxnError> {
    let signer = signer.clone().with_chain_id(Some(chain_id));
    let wallet = EthereumWallet::from(signer);

    let envelope = transaction_request
        .build(&wallet)
        .await
        .map_err(|err| TxnError::Signing(err.to_string()))?;

    Ok(envelope.encoded_2718())
}
