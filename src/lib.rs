pub mod args;
pub mod config;
pub mod constants;
pub mod contract;
pub mod conversion;
pub mod delay;
pub mod errors;
pub mod gas;
pub mod keys;
pub mod logging;
pub mod models;
pub mod provider;
pub mod transaction;
pub mod workflow;

#[cfg(test)]
mod test_util;
