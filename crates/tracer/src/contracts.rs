use std::{path::Path, str::FromStr};

use eyre::{eyre, Result};
use ledger_sim_common::ToLowerHex;
use revm_primitives::{Address, Bytecode, Bytes, HashMap};
use serde_json::Value;

/// Lookup of the code deployed at an account.
pub trait AccountCode {
    /// Returns the bytecode deployed at `address`, if any.
    fn code(&self, address: &Address) -> Option<Bytecode>;

    /// True if `address` holds non-empty code.
    fn has_code(&self, address: &Address) -> bool {
        self.code(address).is_some_and(|code| !code.is_empty())
    }
}

/// A map of addresses to the bytecode deployed at them during the simulation.
#[derive(Clone, Debug, Default)]
pub struct DeployedContracts {
    contracts: HashMap<Address, Bytecode>,
}

impl TryFrom<Value> for DeployedContracts {
    type Error = eyre::Error;

    fn try_from(value: Value) -> Result<Self> {
        let mut deployed = Self::default();
        for (address, bytecode) in value
            .as_object()
            .ok_or_else(|| eyre!("contract configuration must be an object"))?
        {
            let address = Address::from_str(address).map_err(|e| {
                eyre!("contract configuration invalid at {address}: invalid address: {e}",)
            })?;
            let bytecode = Bytes::from_str(bytecode.as_str().ok_or_else(|| {
                eyre!(
                    "contract configuration invalid at {}: bytecode must be a string",
                    address.to_lower_hex()
                )
            })?)
            .map_err(|e| {
                eyre!(
                    "contract configuration invalid at {}: invalid bytecode: {e}",
                    address.to_lower_hex()
                )
            })?;
            deployed.deploy(address, Bytecode::new_raw(bytecode));
        }
        Ok(deployed)
    }
}

impl DeployedContracts {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the table from a JSON file mapping addresses to hex bytecode.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: Value =
            serde_json::from_str(&std::fs::read_to_string(path).map_err(|e| {
                eyre!("failed to read contract configuration `{}`: {}", path.display(), e)
            })?)
            .map_err(|e| eyre!("failed to parse `{}`: {}", path.display(), e))?;

        Self::try_from(config)
    }

    /// Records `bytecode` as deployed at `address`, replacing earlier code.
    pub fn deploy(&mut self, address: Address, bytecode: Bytecode) {
        let _ = self.contracts.insert(address, bytecode);
    }

    /// Returns the number of deployed contracts.
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// True if nothing is deployed.
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

impl AccountCode for DeployedContracts {
    fn code(&self, address: &Address) -> Option<Bytecode> {
        self.contracts.get(address).cloned()
    }
}

#[cfg(test)]
mod tests {
    use revm_primitives::address;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_load_configuration() {
        let contracts = DeployedContracts::try_from(json!({
            "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2": "0x6080604052",
            "0x0fbc0a9be1e87391ed2c7d2bb275bec02f53241f": "0x"
        }))
        .unwrap();

        let weth = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
        let empty = address!("0fbc0a9be1e87391ed2c7d2bb275bec02f53241f");

        assert_eq!(contracts.len(), 2);
        assert!(contracts.has_code(&weth));
        assert!(!contracts.has_code(&empty));
        assert!(!contracts.has_code(&Address::ZERO));
        assert_eq!(
            contracts.code(&weth).map(|code| code.original_bytes()),
            Some(Bytes::from_static(&[0x60, 0x80, 0x60, 0x40, 0x52]))
        );
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(DeployedContracts::try_from(json!(["0x00"])).is_err());

        let err = DeployedContracts::try_from(json!({ "0xnotanaddress": "0x00" })).unwrap_err();
        assert!(err.to_string().contains("invalid address"));

        let err = DeployedContracts::try_from(json!({
            "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2": 1
        }))
        .unwrap_err();
        assert!(err.to_string().contains("bytecode must be a string"));

        let err = DeployedContracts::try_from(json!({
            "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2": "0xzz"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("invalid bytecode"));
    }

    #[test]
    fn test_missing_configuration_file() {
        let err = DeployedContracts::from_file("/nonexistent/ledger-sim.json").unwrap_err();
        assert!(err.to_string().contains("failed to read contract configuration"));
    }
}
