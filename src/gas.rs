use std::time::Duration;

use alloy::primitives::U256;
use tokio::time::sleep;
use tracing::info;

use crate::constants::WEI_PER_GWEI;
use crate::conversion::to_intermediate_unit;
use crate::errors::TxnError;
use crate::provider::ChainClient;

/// Blocks until the node's suggested gas price is at or below a ceiling.
#[derive(Clone, Debug)]
pub struct GasPriceGate {
    pub ceiling_gwei: u64,
    pub poll_interval: Duration,
}

impl GasPriceGate {
    pub fn new(ceiling_gwei: u64, poll_interval: Duration) -> Self {
        Self {
            ceiling_gwei,
            poll_interval,
        }
    }

    /// Gwei is floored before comparing, so 20.9 gwei passes a ceiling of 20.
    pub fn accepts(&self, gas_price_wei: u128) -> bool {
        gas_price_wei / WEI_PER_GWEI <= self.ceiling_gwei as u128
    }

    /// Polls indefinitely and returns the accepted price in wei. A failed poll
    /// ends the wait with `TxnError::NodeUnreachable`.
    pub async fn wait_for_acceptable<C: ChainClient>(&self, client: &C) -> Result<u128, TxnError> {
        loop {
            let gas_price = client
                .gas_price()
                .await
                .map_err(|err| TxnError::from_node("polling gas price", err))?;

            info!(
                "Current gas price: {:.2} Gwei (limit {} Gwei)",
                to_intermediate_unit(U256::from(gas_price)),
                self.ceiling_gwei
            );

            if self.accepts(gas_price) {
                info!("Gas price is within the limit, proceeding...");
                return Ok(gas_price);
            }

            info!(
                "Gas price is too high, waiting {}s...",
                self.poll_interval.as_secs()
            );
            sleep(self.poll_interval).await;
        }
    }
}
