use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;
use rand::Rng;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::{error, info, warn};

use crate::config::{Delays, EthereumConfig, Window};
use crate::constants::{
    APPROVE_FUNCTION, BALANCE_FETCH_BACKOFF_BASE_MS, BALANCE_FETCH_BACKOFF_FACTOR,
    BALANCE_FETCH_RETRIES, BALANCE_OF_FUNCTION, STAKE_DEPOSIT_FUNCTION, VAULT_DEPOSIT_FUNCTION,
};
use crate::contract::Contract;
use crate::conversion::{apply_slippage, deposit_amount, to_display_unit};
use crate::delay::{delay, draw};
use crate::errors::{StepError, StepFailure, TxnError, WorkflowStep};
use crate::logging::SuccessSink;
use crate::models::{BatchSummary, ContractCall, WalletReport};
use crate::provider::ChainClient;
use crate::transaction::TxnPipeline;

/// The contracts a wallet's sequence talks to.
#[derive(Clone, Debug)]
pub struct Contracts {
    /// Accepts native deposits and is the derivative token itself.
    pub staking: Contract,
    pub vault_supervisor: Contract,
    /// Approved spender and target vault of the final deposit.
    pub vault: Address,
}

pub struct Workflow<'a, C, S, R> {
    pipeline: TxnPipeline<'a, C>,
    delays: Delays,
    work_amount_range_percent: Window,
    contracts: &'a Contracts,
    success_log: &'a S,
    rng: R,
}

fn failed_at(wallet: Address, step: WorkflowStep) -> impl Fn(TxnError) -> StepFailure {
    move |err| StepFailure {
        wallet,
        step,
        source: StepError::Txn(err),
    }
}

impl<'a, C, S, R> Workflow<'a, C, S, R>
where
    C: ChainClient,
    S: SuccessSink,
    R: Rng,
{
    pub fn new(
        client: &'a C,
        ethereum: &EthereumConfig,
        contracts: &'a Contracts,
        success_log: &'a S,
        rng: R,
    ) -> Self {
        Self {
            pipeline: TxnPipeline::from_config(client, ethereum),
            delays: ethereum.delays.clone(),
            work_amount_range_percent: ethereum.workflow.work_amount_range_percent,
            contracts,
            success_log,
            rng,
        }
    }

    /// Runs every wallet in order. A failed wallet is logged and skipped; the
    /// wallet delay follows every wallet either way.
    pub async fn run(&mut self, wallets: &[PrivateKeySigner]) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for (index, wallet) in wallets.iter().enumerate() {
            info!(
                "Processing wallet {}/{}: {}",
                index + 1,
                wallets.len(),
                wallet.address()
            );

            match self.process_wallet(wallet).await {
                Ok(report) => {
                    summary.succeeded += 1;
                    info!(
                        "Wallet {} done: staked {:.6} ETH, restaked {:.6} tokens",
                        wallet.address(),
                        to_display_unit(report.deposited),
                        to_display_unit(report.derivative_balance)
                    );
                }
                Err(failure) => {
                    summary.failed += 1;
                    error!("{}", failure);
                }
            }

            delay(&mut self.rng, self.delays.wallet, "wallet").await;
        }

        summary
    }

    /// stake deposit, block delay, approve, block delay, vault deposit
    pub async fn process_wallet(
        &mut self,
        wallet: &PrivateKeySigner,
    ) -> Result<WalletReport, StepFailure> {
        let address = wallet.address();
        let contracts = self.contracts;
        let mut report = WalletReport::default();

        let balance = self
            .native_balance(address)
            .await
            .map_err(failed_at(address, WorkflowStep::NativeBalance))?;

        let percent = draw(&mut self.rng, self.work_amount_range_percent);
        let amount = deposit_amount(balance, percent);
        if amount.is_zero() {
            return Err(StepFailure {
                wallet: address,
                step: WorkflowStep::NativeBalance,
                source: StepError::NothingToDeposit(format!(
                    "{}% of {:.6} ETH rounds to zero",
                    percent,
                    to_display_unit(balance)
                )),
            });
        }
        info!(
            "Balance {:.6} ETH, depositing {}%: {:.6} ETH",
            to_display_unit(balance),
            percent,
            to_display_unit(amount)
        );

        let stake_deposit = ContractCall::new(
            &contracts.staking,
            STAKE_DEPOSIT_FUNCTION,
            vec![DynSolValue::Address(address)],
        )
        .with_value(amount);
        let confirmed = self
            .pipeline
            .submit_contract_call(wallet, &stake_deposit)
            .await
            .map_err(failed_at(address, WorkflowStep::StakeDeposit))?;
        self.record_success(format!(
            "{} deposited {:.6} ETH into {}: {}",
            address,
            to_display_unit(amount),
            contracts.staking.name,
            confirmed.explorer_link
        ));
        report.deposited = amount;
        report.stake_deposit_link = confirmed.explorer_link;

        delay(&mut self.rng, self.delays.block, "block").await;

        let derivative_balance = self
            .pipeline
            .read_uint(
                &contracts.staking,
                BALANCE_OF_FUNCTION,
                vec![DynSolValue::Address(address)],
            )
            .await
            .map_err(failed_at(address, WorkflowStep::DerivativeBalance))?;
        if derivative_balance.is_zero() {
            return Err(StepFailure {
                wallet: address,
                step: WorkflowStep::DerivativeBalance,
                source: StepError::NothingToDeposit(format!(
                    "{} balance is zero after the deposit",
                    contracts.staking.name
                )),
            });
        }
        self.record_success(format!(
            "{} holds {:.6} {} tokens",
            address,
            to_display_unit(derivative_balance),
            contracts.staking.name
        ));
        report.derivative_balance = derivative_balance;

        let approve = ContractCall::new(
            &contracts.staking,
            APPROVE_FUNCTION,
            vec![
                DynSolValue::Address(contracts.vault),
                DynSolValue::Uint(derivative_balance, 256),
            ],
        );
        let confirmed = self
            .pipeline
            .submit_contract_call(wallet, &approve)
            .await
            .map_err(failed_at(address, WorkflowStep::Approve))?;
        self.record_success(format!(
            "{} approved {:.6} tokens for vault {}: {}",
            address,
            to_display_unit(derivative_balance),
            contracts.vault,
            confirmed.explorer_link
        ));
        report.approve_link = confirmed.explorer_link;

        delay(&mut self.rng, self.delays.block, "block").await;

        let vault_deposit = ContractCall::new(
            &contracts.vault_supervisor,
            VAULT_DEPOSIT_FUNCTION,
            vault_deposit_args(contracts.vault, derivative_balance),
        );
        let confirmed = self
            .pipeline
            .submit_contract_call(wallet, &vault_deposit)
            .await
            .map_err(failed_at(address, WorkflowStep::VaultDeposit))?;
        self.record_success(format!(
            "{} deposited {:.6} tokens into vault {}: {}",
            address,
            to_display_unit(derivative_balance),
            contracts.vault,
            confirmed.explorer_link
        ));
        report.vault_deposit_link = confirmed.explorer_link;

        Ok(report)
    }

    /// Retries only while the node is unreachable.
    async fn native_balance(&self, address: Address) -> Result<U256, TxnError> {
        let retry_strategy = ExponentialBackoff::from_millis(BALANCE_FETCH_BACKOFF_BASE_MS)
            .factor(BALANCE_FETCH_BACKOFF_FACTOR)
            .map(jitter)
            .take(BALANCE_FETCH_RETRIES);

        RetryIf::spawn(
            retry_strategy,
            || self.pipeline.native_balance(address),
            |err: &TxnError| {
                if err.is_node_unreachable() {
                    warn!("Balance fetch for {} failed, retrying: {}", address, err);
                    true
                } else {
                    false
                }
            },
        )
        .await
    }

    fn record_success(&self, message: String) {
        info!("{}", message);
        if let Err(err) = self.success_log.record(&message) {
            warn!("Failed to write success log: {:#}", err);
        }
    }
}

/// `deposit(vault, amount, minSharesOut)` with the slippage floor applied.
fn vault_deposit_args(vault: Address, amount: U256) -> Vec<DynSolValue> {
    vec![
        DynSolValue::Address(vault),
        DynSolValue::Uint(amount, 256),
        DynSolValue::Uint(apply_slippage(amount), 256),
    ]
}
