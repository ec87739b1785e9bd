pub mod command;
pub mod config;
pub mod handle;
pub mod instruction;
pub mod migration;
pub mod object;
pub mod operation;
pub mod rpc;
pub mod simulation;

use std::path::Path;

pub use config::{NetworkConfig, ProjectConfig};
pub use handle::migrate_with;
pub use object::{Address, ContractArtifact, DeploymentRecord};

/// Load the latest contract deployment record from the local migration directory
pub fn load_latest_contract_deployment(
    record_dir: &Path,
    network: &str,
    contract_name: &str,
) -> eyre::Result<DeploymentRecord> {
    let path = handle::deployment_record_path(record_dir, network, contract_name);
    handle::load_deployment_record(&path)
}
