use std::{fs, path::Path, time::Duration};

use migration_runner::{
    instruction::MigrationExecutor,
    load_latest_contract_deployment,
    migrate_with,
    migration::{build_initial_migration, ADMIN_PASSPHRASE, UNLOCK_DURATION_SECS},
    operation::ReceiptPolling,
    simulation::{
        FakeReceipt, FakeRpcClient, RpcCall, FAKE_COINBASE, FAKE_CONTRACT_ADDRESS,
        FAKE_NETWORK_ID, FAKE_TX_HASH,
    },
    ContractArtifact, NetworkConfig, ProjectConfig,
};

const CONFIG: &str = r#"
[networks.development]
host = "127.0.0.1"
port = 8545

[networks.kyc]
host = "127.0.0.1"
port = 22000
gas = 4500000
gas_price = 0

[networks.ganache]
host = "127.0.0.1"
port = 7545
network_id = "5777"

[networks.goerli]
host = "127.0.0.1"
port = 7545
network_id = "5"
"#;

fn migrations_artifact() -> ContractArtifact {
    ContractArtifact {
        contract_name: "Migrations".to_string(),
        abi: serde_json::json!([]),
        bytecode: "0x608060405234801561001057600080fd5b50".to_string(),
    }
}

fn network(name: &str) -> NetworkConfig {
    let config: ProjectConfig = CONFIG.parse().expect("config");
    config.network(name).expect("network").clone()
}

fn fast_polling() -> ReceiptPolling {
    ReceiptPolling {
        interval: Duration::from_millis(1),
        attempts: 5,
    }
}

fn sent_transactions(calls: &[RpcCall]) -> usize {
    calls
        .iter()
        .filter(|call| matches!(call, RpcCall::SendTransaction(_)))
        .count()
}

#[tokio::test]
async fn test_initial_migration_call_order() {
    let record_dir = tempfile::tempdir().expect("tempdir");
    let rpc = FakeRpcClient::default();
    let records = migrate_with(
        rpc.clone(),
        "development",
        &network("development"),
        migrations_artifact(),
        record_dir.path(),
        fast_polling(),
    )
    .await
    .expect("migrate");

    let coinbase = FAKE_COINBASE.parse().expect("coinbase");
    assert_eq!(ADMIN_PASSPHRASE, "pwd@123");
    assert_eq!(UNLOCK_DURATION_SECS, 36000);
    let calls = rpc.calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[0], RpcCall::Coinbase);
    assert_eq!(
        calls[1],
        RpcCall::UnlockAccount {
            account: coinbase,
            passphrase: ADMIN_PASSPHRASE.to_string(),
            duration: UNLOCK_DURATION_SECS,
        }
    );
    match &calls[2] {
        RpcCall::SendTransaction(transaction) => {
            assert_eq!(transaction.from.as_str(), FAKE_COINBASE);
            assert_eq!(transaction.to, None);
            assert_eq!(transaction.data, migrations_artifact().bytecode);
            assert_eq!(transaction.gas, None);
            assert_eq!(transaction.gas_price, None);
        }
        other => panic!("expected deployment, got {other:?}"),
    }
    assert_eq!(calls[3], RpcCall::TransactionReceipt(FAKE_TX_HASH.to_string()));

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Migrations");
    assert_eq!(records[0].contract_address, FAKE_CONTRACT_ADDRESS);
    assert_eq!(records[0].deployer, FAKE_COINBASE);
    assert_eq!(records[0].bytecode_size, 18);
}

#[tokio::test]
async fn test_deployment_once_per_run_and_records_accumulate() {
    let record_dir = tempfile::tempdir().expect("tempdir");
    for _ in 0..2 {
        let rpc = FakeRpcClient::default();
        migrate_with(
            rpc.clone(),
            "development",
            &network("development"),
            migrations_artifact(),
            record_dir.path(),
            fast_polling(),
        )
        .await
        .expect("migrate");
        assert_eq!(sent_transactions(&rpc.calls()), 1);
    }

    let path = record_dir.path().join("development").join("Migrations.json");
    let records: Vec<serde_json::Value> =
        serde_json::from_slice(&fs::read(path).expect("record file")).expect("records");
    assert_eq!(records.len(), 2);

    let latest = load_latest_contract_deployment(record_dir.path(), "development", "Migrations")
        .expect("latest");
    assert_eq!(latest.tx_hash, FAKE_TX_HASH);
    assert_eq!(latest.operation, "deploy");
    assert_eq!(latest.network, "development");
}

#[tokio::test]
async fn test_network_gas_settings_are_attached() {
    let record_dir = tempfile::tempdir().expect("tempdir");
    let rpc = FakeRpcClient::default();
    migrate_with(
        rpc.clone(),
        "kyc",
        &network("kyc"),
        migrations_artifact(),
        record_dir.path(),
        fast_polling(),
    )
    .await
    .expect("migrate");

    let transaction = rpc
        .calls()
        .into_iter()
        .find_map(|call| match call {
            RpcCall::SendTransaction(transaction) => Some(transaction),
            _ => None,
        })
        .expect("deployment");
    assert_eq!(transaction.gas.as_deref(), Some("0x44aa20"));
    assert_eq!(transaction.gas_price.as_deref(), Some("0x0"));
    assert!(record_dir.path().join("kyc").join("Migrations.json").exists());
}

#[tokio::test]
async fn test_missing_coinbase_stops_before_unlock() {
    let record_dir = tempfile::tempdir().expect("tempdir");
    let rpc = FakeRpcClient::default().with_coinbase(None);
    let error = migrate_with(
        rpc.clone(),
        "development",
        &network("development"),
        migrations_artifact(),
        record_dir.path(),
        fast_polling(),
    )
    .await
    .expect_err("no coinbase");
    assert!(error.to_string().contains("no coinbase"));
    assert_eq!(rpc.calls(), vec![RpcCall::Coinbase]);
}

#[tokio::test]
async fn test_refused_unlock_skips_deployment() {
    let record_dir = tempfile::tempdir().expect("tempdir");
    let rpc = FakeRpcClient::default().with_unlock_result(false);
    let result = migrate_with(
        rpc.clone(),
        "development",
        &network("development"),
        migrations_artifact(),
        record_dir.path(),
        fast_polling(),
    )
    .await;
    assert!(result.is_err());
    assert_eq!(rpc.calls().len(), 2);
    assert_eq!(sent_transactions(&rpc.calls()), 0);
    assert!(!record_dir.path().join("development").exists());
}

#[tokio::test]
async fn test_reverted_deployment_is_not_recorded() {
    let record_dir = tempfile::tempdir().expect("tempdir");
    let rpc = FakeRpcClient::default().with_receipt(FakeReceipt::Reverted);
    let error = migrate_with(
        rpc.clone(),
        "development",
        &network("development"),
        migrations_artifact(),
        record_dir.path(),
        fast_polling(),
    )
    .await
    .expect_err("reverted");
    assert!(error.to_string().contains("reverted"));
    assert_eq!(sent_transactions(&rpc.calls()), 1);
    assert!(!record_dir.path().join("development").exists());
}

#[tokio::test]
async fn test_receipt_is_polled_until_mined() {
    let rpc = FakeRpcClient::default().with_pending_polls(3);
    let instruction =
        build_initial_migration(migrations_artifact(), &network("development"), fast_polling());
    let context = MigrationExecutor::new(rpc.clone(), vec![instruction])
        .run("development")
        .await
        .expect("migrate");

    let receipt_queries = rpc
        .calls()
        .iter()
        .filter(|call| matches!(call, RpcCall::TransactionReceipt(_)))
        .count();
    assert_eq!(receipt_queries, 4);
    assert_eq!(sent_transactions(&rpc.calls()), 1);
    assert_eq!(context.deployments.len(), 1);
    assert_eq!(context.deployments[0].block_number, 1);
}

#[tokio::test]
async fn test_unmined_deployment_gives_up_without_resending() {
    let rpc = FakeRpcClient::default().with_receipt(FakeReceipt::Pending);
    let instruction =
        build_initial_migration(migrations_artifact(), &network("development"), fast_polling());
    let error = MigrationExecutor::new(rpc.clone(), vec![instruction])
        .run("development")
        .await
        .expect_err("pending forever");
    assert!(error.to_string().contains("not mined"));
    assert_eq!(sent_transactions(&rpc.calls()), 1);
    assert_eq!(rpc.calls().len(), 2 + 1 + fast_polling().attempts);
}

#[tokio::test]
async fn test_pinned_network_id_is_checked_first() {
    assert_eq!(FAKE_NETWORK_ID, "5777");
    let rpc = FakeRpcClient::default();
    let instruction =
        build_initial_migration(migrations_artifact(), &network("ganache"), fast_polling());
    MigrationExecutor::new(rpc.clone(), vec![instruction])
        .run("ganache")
        .await
        .expect("migrate");
    let calls = rpc.calls();
    assert_eq!(calls[0], RpcCall::NetworkId);
    assert_eq!(calls[1], RpcCall::Coinbase);
    assert_eq!(sent_transactions(&calls), 1);
}

#[tokio::test]
async fn test_network_id_mismatch_stops_migration() {
    let rpc = FakeRpcClient::default();
    let instruction =
        build_initial_migration(migrations_artifact(), &network("goerli"), fast_polling());
    let error = MigrationExecutor::new(rpc.clone(), vec![instruction])
        .run("goerli")
        .await
        .expect_err("wrong network");
    assert_eq!(
        error.to_string(),
        "network 'goerli' expects network id 5, endpoint reports 5777"
    );
    assert_eq!(rpc.calls(), vec![RpcCall::NetworkId]);
}

#[test]
fn test_unknown_network_is_rejected() {
    let config: ProjectConfig = CONFIG.parse().expect("config");
    assert!(config.network("ropsten").is_err());
}

#[test]
fn test_artifact_from_build_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_artifact(dir.path(), &migrations_artifact());
    let artifact = ContractArtifact::load(dir.path(), "Migrations").expect("artifact");
    assert_eq!(artifact.bytecode, migrations_artifact().bytecode);
}

pub(crate) fn write_artifact(dir: &Path, artifact: &ContractArtifact) {
    let content = serde_json::to_vec(artifact).expect("serialize artifact");
    fs::write(dir.join(format!("{}.json", artifact.contract_name)), content)
        .expect("write artifact");
}
