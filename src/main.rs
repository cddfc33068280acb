use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};

use restake_depositor::args::Args;
use restake_depositor::config::{Config, ConfigManager};
use restake_depositor::contract::Contract;
use restake_depositor::keys::load_wallets;
use restake_depositor::logging::{setup_logging, FileSuccessLog};
use restake_depositor::provider::RpcClient;
use restake_depositor::workflow::{Contracts, Workflow};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(&args.log_level);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = ConfigManager::new(&args.config).load_config()?;
    print_banner(&config);

    // ABI paths in the config are relative to the config file.
    let base_dir = Path::new(&args.config)
        .parent()
        .unwrap_or_else(|| Path::new(""));
    let contracts = Contracts {
        staking: Contract::load("staking", &config.contracts.staking, base_dir)?,
        vault_supervisor: Contract::load(
            "vault_supervisor",
            &config.contracts.vault_supervisor,
            base_dir,
        )?,
        vault: config.contracts.vault,
    };

    let keys_path = args.keys.unwrap_or_else(|| config.files.keys.clone());
    let wallets = load_wallets(&keys_path)?;
    info!("Loaded {} wallets from {}", wallets.len(), keys_path.display());

    let success_log = FileSuccessLog::new(
        args.success_log
            .unwrap_or_else(|| config.files.success_log.clone()),
    );
    let client = RpcClient::new(&config.ethereum.rpc).context("Failed to create RPC client")?;

    let mut workflow = Workflow::new(
        &client,
        &config.ethereum,
        &contracts,
        &success_log,
        StdRng::from_entropy(),
    );
    let summary = workflow.run(&wallets).await;

    info!(
        "Finished: {} wallets succeeded, {} failed",
        summary.succeeded, summary.failed
    );
    Ok(())
}

fn print_banner(config: &Config) {
    let ethereum = &config.ethereum;
    info!("{} v{}", config.app.name, config.app.version);
    info!("RPC: {}", ethereum.rpc);
    info!(
        "Wallet delay: {}-{}s, block delay: {}-{}s",
        ethereum.delays.wallet.min,
        ethereum.delays.wallet.max,
        ethereum.delays.block.min,
        ethereum.delays.block.max
    );
    info!(
        "Deposit size: {}-{}% of balance, gas limit: {} Gwei",
        ethereum.workflow.work_amount_range_percent.min,
        ethereum.workflow.work_amount_range_percent.max,
        ethereum.workflow.gwei_limit
    );
}
