use std::time::Duration;

use crate::{
    instruction::{MigrationContext, Operation},
    object::{format_quantity, parse_quantity, ContractArtifact, Deployment},
    rpc::{TransactionReceipt, TransactionRequest, RPC},
};

/// Make sure the endpoint serves the network the config expects
pub struct CheckNetworkId {
    pub expected: String,
}

#[async_trait::async_trait]
impl<T: RPC> Operation<T> for CheckNetworkId {
    async fn run(self: Box<Self>, rpc: &T, context: &mut MigrationContext) -> eyre::Result<()> {
        let actual = rpc.network_id().await?;
        if actual != self.expected {
            return Err(eyre::eyre!(
                "network '{}' expects network id {}, endpoint reports {actual}",
                context.network,
                self.expected
            ));
        }
        Ok(())
    }
}

/// Resolve the endpoint's coinbase account into the context
pub struct LoadCoinbase {}

#[async_trait::async_trait]
impl<T: RPC> Operation<T> for LoadCoinbase {
    async fn run(self: Box<Self>, rpc: &T, context: &mut MigrationContext) -> eyre::Result<()> {
        let coinbase = rpc
            .coinbase()
            .await?
            .ok_or(eyre::eyre!("endpoint reports no coinbase account"))?;
        tracing::debug!(%coinbase, "coinbase loaded");
        context.coinbase = Some(coinbase);
        Ok(())
    }
}

/// Unlock the loaded coinbase account for `duration` seconds
pub struct UnlockCoinbase {
    pub passphrase: String,
    pub duration: u64,
}

#[async_trait::async_trait]
impl<T: RPC> Operation<T> for UnlockCoinbase {
    async fn run(self: Box<Self>, rpc: &T, context: &mut MigrationContext) -> eyre::Result<()> {
        let coinbase = context.coinbase()?;
        tracing::info!(">> Unlocking account {coinbase}");
        let unlocked = rpc
            .unlock_account(coinbase, &self.passphrase, self.duration)
            .await?;
        if !unlocked {
            return Err(eyre::eyre!("endpoint refused to unlock account {coinbase}"));
        }
        Ok(())
    }
}

/// How long to wait for a transaction to be mined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptPolling {
    pub interval: Duration,
    pub attempts: usize,
}

impl Default for ReceiptPolling {
    fn default() -> Self {
        ReceiptPolling {
            interval: Duration::from_secs(1),
            attempts: 120,
        }
    }
}

pub async fn wait_for_receipt<T: RPC>(
    rpc: &T,
    tx_hash: &str,
    polling: ReceiptPolling,
) -> eyre::Result<TransactionReceipt> {
    for attempt in 0..polling.attempts {
        if let Some(receipt) = rpc.transaction_receipt(tx_hash).await? {
            return Ok(receipt);
        }
        if attempt + 1 < polling.attempts {
            tokio::time::sleep(polling.interval).await;
        }
    }
    Err(eyre::eyre!(
        "transaction {tx_hash} not mined after {} receipt queries",
        polling.attempts
    ))
}

/// Publish a compiled contract from the loaded coinbase account
pub struct DeployContract {
    pub artifact: ContractArtifact,
    pub gas: Option<u64>,
    pub gas_price: Option<u64>,
    pub polling: ReceiptPolling,
}

#[async_trait::async_trait]
impl<T: RPC> Operation<T> for DeployContract {
    async fn run(self: Box<Self>, rpc: &T, context: &mut MigrationContext) -> eyre::Result<()> {
        let DeployContract {
            artifact,
            gas,
            gas_price,
            polling,
        } = *self;
        let deployer = context.coinbase()?.clone();
        let code = artifact.creation_code()?;
        let contract_name = artifact.contract_name;
        tracing::info!(contract = %contract_name, from = %deployer, "deploying");
        let transaction = TransactionRequest {
            from: deployer.clone(),
            to: None,
            data: format!("0x{}", hex::encode(&code)),
            gas: gas.map(format_quantity),
            gas_price: gas_price.map(format_quantity),
        };
        let tx_hash = rpc.send_transaction(transaction).await?;
        tracing::info!(contract = %contract_name, %tx_hash, "deployment sent");
        let receipt = wait_for_receipt(rpc, &tx_hash, polling).await?;
        if receipt.is_reverted() {
            return Err(eyre::eyre!(
                "deployment of {contract_name} reverted in transaction {tx_hash}"
            ));
        }
        let contract_address = receipt.contract_address.ok_or(eyre::eyre!(
            "receipt of {tx_hash} carries no contract address"
        ))?;
        let deployment = Deployment {
            contract_name,
            tx_hash,
            contract_address,
            deployer,
            block_number: parse_quantity(&receipt.block_number)?,
            gas_used: parse_quantity(&receipt.gas_used)?,
            bytecode_size: code.len(),
        };
        tracing::info!(
            contract = %deployment.contract_name,
            address = %deployment.contract_address,
            block = deployment.block_number,
            "deployed"
        );
        context.deployments.push(deployment);
        Ok(())
    }
}
