use std::{fmt::Display, fs, path::Path, str::FromStr};

use eyre::WrapErr;

/// An EVM account address, kept in its `0x`-prefixed lowercase hex form
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Address {
    type Err = eyre::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let digits = value
            .strip_prefix("0x")
            .or_else(|| value.strip_prefix("0X"))
            .ok_or(eyre::eyre!("address must start with 0x: {value}"))?;
        let bytes = hex::decode(digits).wrap_err_with(|| format!("invalid address: {value}"))?;
        if bytes.len() != 20 {
            return Err(eyre::eyre!("address must be 20 bytes long: {value}"));
        }
        Ok(Address(format!("0x{}", hex::encode(bytes))))
    }
}

impl TryFrom<String> for Address {
    type Error = eyre::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

/// Parse a JSON-RPC hex quantity such as `0x1b4`
pub fn parse_quantity(value: &str) -> eyre::Result<u64> {
    let digits = value
        .strip_prefix("0x")
        .ok_or(eyre::eyre!("quantity must start with 0x: {value}"))?;
    if digits.is_empty() {
        return Err(eyre::eyre!("empty quantity"));
    }
    u64::from_str_radix(digits, 16).wrap_err_with(|| format!("invalid quantity: {value}"))
}

pub fn format_quantity(value: u64) -> String {
    format!("{value:#x}")
}

/// Compiled contract as emitted into `build/contracts/<Name>.json`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    pub contract_name: String,
    #[serde(default)]
    pub abi: serde_json::Value,
    pub bytecode: String,
}

impl ContractArtifact {
    pub fn load(artifacts_dir: &Path, contract_name: &str) -> eyre::Result<Self> {
        let path = artifacts_dir.join(format!("{contract_name}.json"));
        let content = fs::read(&path)
            .map_err(|e| eyre::eyre!("{e}:{}", path.to_string_lossy()))?;
        let artifact: ContractArtifact = serde_json::from_slice(&content)
            .wrap_err_with(|| format!("malformed artifact {}", path.to_string_lossy()))?;
        if artifact.contract_name != contract_name {
            return Err(eyre::eyre!(
                "artifact {} holds contract {}",
                path.to_string_lossy(),
                artifact.contract_name
            ));
        }
        artifact.creation_code()?;
        Ok(artifact)
    }

    /// Raw creation bytecode, validated from the artifact's hex string
    pub fn creation_code(&self) -> eyre::Result<Vec<u8>> {
        let digits = self.bytecode.strip_prefix("0x").unwrap_or(&self.bytecode);
        let code = hex::decode(digits)
            .wrap_err_with(|| format!("invalid bytecode in artifact {}", self.contract_name))?;
        if code.is_empty() {
            return Err(eyre::eyre!(
                "artifact {} has no bytecode, is it an interface or abstract contract?",
                self.contract_name
            ));
        }
        Ok(code)
    }
}

/// A contract published by one migration run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub contract_name: String,
    pub tx_hash: String,
    pub contract_address: Address,
    pub deployer: Address,
    pub block_number: u64,
    pub gas_used: u64,
    pub bytecode_size: usize,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Default)]
pub struct DeploymentRecord {
    pub name: String,
    pub date: String,
    pub operation: String,
    pub network: String,
    pub tx_hash: String,
    pub contract_address: String,
    pub deployer: String,
    pub block_number: u64,
    pub gas_used: u64,
    pub bytecode_size: usize,
    // This field is not required, so you can edit in your <contract>.json file to add comment for cooperations
    #[serde(default)]
    pub comment: Option<String>,
}

impl DeploymentRecord {
    pub fn from_deployment(network: &str, deployment: Deployment) -> Self {
        DeploymentRecord {
            name: deployment.contract_name,
            date: chrono::Utc::now().to_rfc3339(),
            operation: "deploy".to_string(),
            network: network.to_string(),
            tx_hash: deployment.tx_hash,
            contract_address: deployment.contract_address.into(),
            deployer: deployment.deployer.into(),
            block_number: deployment.block_number,
            gas_used: deployment.gas_used,
            bytecode_size: deployment.bytecode_size,
            comment: None,
        }
    }
}
