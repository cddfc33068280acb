use std::fs;
use std::path::Path;

use alloy::primitives::FixedBytes;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{anyhow, Context, Result};

/// Parses a hex private key, with or without a `0x` prefix.
pub fn parse_key(key: &str) -> Result<PrivateKeySigner> {
    let key = key.trim();
    let key = key.strip_prefix("0x").unwrap_or(key);

    let bytes = hex::decode(key).context("Failed to decode private key")?;
    if bytes.len() != 32 {
        return Err(anyhow!(
            "Private key must be 32 bytes, got {}",
            bytes.len()
        ));
    }

    let private_key = FixedBytes::<32>::from_slice(&bytes);
    PrivateKeySigner::from_bytes(&private_key)
        .context("Failed to create signer from private key")
}

/// One key per line, blank lines skipped. Any malformed line fails the whole
/// file, naming its 1-based line number but never its contents.
pub fn parse_keys(contents: &str) -> Result<Vec<PrivateKeySigner>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            parse_key(line).with_context(|| format!("Invalid private key on line {}", index + 1))
        })
        .collect()
}

pub fn load_wallets(path: &Path) -> Result<Vec<PrivateKeySigner>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read private key file {}", path.display()))?;
    parse_keys(&contents).with_context(|| format!("Failed to load wallets from {}", path.display()))
}
