use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    config::{NetworkConfig, ProjectConfig},
    instruction::MigrationExecutor,
    migration::build_initial_migration,
    object::{ContractArtifact, DeploymentRecord},
    operation::ReceiptPolling,
    rpc::{RpcClient, RPC},
};

pub(crate) fn deployment_record_path(
    record_dir: &Path,
    network: &str,
    contract_name: &str,
) -> PathBuf {
    record_dir
        .join(network)
        .join(format!("{contract_name}.json"))
}

pub(crate) fn save_deployment_record(path: &Path, record: DeploymentRecord) -> eyre::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut records: Vec<DeploymentRecord> = if path.exists() {
        let content = fs::read(path)?;
        serde_json::from_slice(&content)?
    } else {
        Vec::new()
    };
    records.push(record);
    let new_content = serde_json::to_string_pretty(&records)?;
    fs::write(path, new_content)?;
    Ok(())
}

pub(crate) fn load_deployment_record(path: &Path) -> eyre::Result<DeploymentRecord> {
    let file = fs::File::open(path).map_err(|e| eyre::eyre!("{e}:{}", path.to_string_lossy()))?;
    let records: Vec<DeploymentRecord> = serde_json::from_reader(file)?;
    records.last().cloned().ok_or(eyre::eyre!("empty record"))
}

fn create_rpc_from_network(network: &NetworkConfig) -> eyre::Result<RpcClient> {
    Ok(RpcClient::new(network.endpoint()?))
}

/// Run the initial migration against `rpc` and persist what it deployed
pub async fn migrate_with<T: RPC>(
    rpc: T,
    network_name: &str,
    network: &NetworkConfig,
    artifact: ContractArtifact,
    record_dir: &Path,
    polling: ReceiptPolling,
) -> eyre::Result<Vec<DeploymentRecord>> {
    let initial_migration = build_initial_migration(artifact, network, polling);
    let context = MigrationExecutor::new(rpc, vec![initial_migration])
        .run(network_name)
        .await?;
    let mut records = Vec::with_capacity(context.deployments.len());
    for deployment in context.deployments {
        let path = deployment_record_path(record_dir, network_name, &deployment.contract_name);
        let record = DeploymentRecord::from_deployment(network_name, deployment);
        save_deployment_record(&path, record.clone())?;
        records.push(record);
    }
    Ok(records)
}

pub async fn initial_migration(
    network_name: String,
    config_path: PathBuf,
    record_dir: PathBuf,
    artifacts_dir: PathBuf,
    contract_name: String,
) -> eyre::Result<()> {
    let config = ProjectConfig::load(&config_path)?;
    let network = config.network(&network_name)?;
    let rpc = create_rpc_from_network(network)?;
    tracing::info!(network = %network_name, endpoint = %rpc.url(), "connecting");
    let artifact = ContractArtifact::load(&artifacts_dir, &contract_name)?;
    let records = migrate_with(
        rpc,
        &network_name,
        network,
        artifact,
        &record_dir,
        ReceiptPolling::default(),
    )
    .await?;
    for record in records {
        println!("Transaction hash: {}", record.tx_hash);
        println!("Contract address: {}", record.contract_address);
    }
    Ok(())
}

pub fn show_deployment(
    network: String,
    record_dir: PathBuf,
    contract_name: String,
) -> eyre::Result<()> {
    let path = deployment_record_path(&record_dir, &network, &contract_name);
    if !path.exists() {
        return Err(eyre::eyre!(
            "record file does not exist: {}",
            path.to_string_lossy()
        ));
    }
    let record = load_deployment_record(&path)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

pub fn list_networks(config_path: PathBuf) -> eyre::Result<()> {
    let config = ProjectConfig::load(&config_path)?;
    for (name, network) in &config.networks {
        println!("{name}: {}", network.endpoint()?);
    }
    Ok(())
}
