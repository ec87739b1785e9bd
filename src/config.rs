use std::{collections::BTreeMap, fs, path::Path};

use eyre::WrapErr;
use reqwest::Url;
use serde::{Deserialize, Deserializer};

/// Connection settings of one named network
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NetworkConfig {
    pub host: String,
    pub port: u16,
    /// Network id the endpoint is expected to report, `*` matches any
    #[serde(default, deserialize_with = "deserialize_network_id")]
    pub network_id: Option<String>,
    /// Gas limit attached to deployment transactions
    #[serde(default)]
    pub gas: Option<u64>,
    /// Gas price in wei attached to deployment transactions
    #[serde(default)]
    pub gas_price: Option<u64>,
}

// Network ids are written either as numbers or as strings, `*` included
#[derive(Deserialize)]
#[serde(untagged)]
enum NetworkId {
    Number(u64),
    Text(String),
}

fn deserialize_network_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<NetworkId>::deserialize(deserializer)?.map(|id| match id {
            NetworkId::Number(number) => number.to_string(),
            NetworkId::Text(text) => text,
        }),
    )
}

impl NetworkConfig {
    /// The network id to enforce, `None` when absent or a wildcard
    pub fn pinned_network_id(&self) -> Option<&str> {
        self.network_id.as_deref().filter(|id| *id != "*")
    }

    pub fn endpoint(&self) -> eyre::Result<Url> {
        let url = format!("http://{}:{}", self.host, self.port);
        url.parse::<Url>()
            .wrap_err_with(|| format!("invalid endpoint {url}"))
    }
}

/// The network table of a project, keyed by network name
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkConfig>,
}

impl ProjectConfig {
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("{e}:{}", path.to_string_lossy()))?;
        content
            .parse::<ProjectConfig>()
            .wrap_err_with(|| format!("malformed config {}", path.to_string_lossy()))
    }

    pub fn network(&self, name: &str) -> eyre::Result<&NetworkConfig> {
        self.networks
            .get(name)
            .ok_or(eyre::eyre!("network '{name}' not found in configuration"))
    }
}

impl std::str::FromStr for ProjectConfig {
    type Err = eyre::Error;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let config: ProjectConfig = toml::from_str(content)?;
        if let Some((name, _)) = config
            .networks
            .iter()
            .find(|(_, network)| network.host.trim().is_empty())
        {
            return Err(eyre::eyre!("network '{name}' has an empty host"));
        }
        Ok(config)
    }
}
