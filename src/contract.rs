use std::fs;
use std::path::Path;

use alloy::dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy::json_abi::{Function, JsonAbi};
use alloy::primitives::{Address, Bytes};
use anyhow::{Context, Result};

use crate::config::ContractConfig;
use crate::errors::TxnError;

/// A deployed contract together with the interface used to talk to it.
#[derive(Clone, Debug)]
pub struct Contract {
    pub name: String,
    pub address: Address,
    pub abi: JsonAbi,
}

impl Contract {
    pub fn new(name: impl Into<String>, address: Address, abi: JsonAbi) -> Self {
        Self {
            name: name.into(),
            address,
            abi,
        }
    }

    pub fn from_json(name: impl Into<String>, address: Address, abi_json: &str) -> Result<Self> {
        let abi: JsonAbi =
            serde_json::from_str(abi_json).context("Failed to parse contract ABI")?;
        Ok(Self::new(name, address, abi))
    }

    /// Loads the ABI file referenced by the config entry. Relative ABI paths
    /// resolve against `base_dir`.
    pub fn load(name: &str, contract_config: &ContractConfig, base_dir: &Path) -> Result<Self> {
        let abi_path = base_dir.join(&contract_config.abi);
        let abi_json = fs::read_to_string(&abi_path)
            .with_context(|| format!("Failed to read {} ABI at {}", name, abi_path.display()))?;
        Self::from_json(name, contract_config.address, &abi_json)
            .with_context(|| format!("Invalid ABI for {} contract", name))
    }

    fn function(&self, function_name: &str, arity: usize) -> Result<&Function, String> {
        self.abi
            .function(function_name)
            .and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == arity))
            .ok_or_else(|| {
                format!(
                    "{} has no function {}({} args)",
                    self.name, function_name, arity
                )
            })
    }

    /// Selector followed by the ABI encoded arguments.
    pub fn encode_call(&self, function_name: &str, args: &[DynSolValue]) -> Result<Bytes, TxnError> {
        let function = self
            .function(function_name, args.len())
            .map_err(TxnError::AbiEncoding)?;
        function
            .abi_encode_input(args)
            .map(Bytes::from)
            .map_err(|err| TxnError::AbiEncoding(format!("{}: {}", function.signature(), err)))
    }

    pub fn decode_output(
        &self,
        function_name: &str,
        arity: usize,
        data: &[u8],
    ) -> Result<Vec<DynSolValue>, TxnError> {
        let function = self
            .function(function_name, arity)
            .map_err(TxnError::AbiDecoding)?;
        function
            .abi_decode_output(data, true)
            .map_err(|err| TxnError::AbiDecoding(format!("{}: {}", function.signature(), err)))
    }
}
