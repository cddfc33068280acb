use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Stakes, approves and restakes ETH for a list of wallets")]
pub struct Args {
    /// Config file, with or without the .yaml extension
    #[clap(short, long, default_value = "config")]
    pub config: String,

    /// Private key file, one key per line (overrides files.keys)
    #[clap(short, long)]
    pub keys: Option<PathBuf>,

    /// Success log file (overrides files.success_log)
    #[clap(long)]
    pub success_log: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[clap(long, default_value = "info")]
    pub log_level: String,
}
