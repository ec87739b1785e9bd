use crate::{
    config::NetworkConfig,
    instruction::Instruction,
    object::ContractArtifact,
    operation::{CheckNetworkId, DeployContract, LoadCoinbase, ReceiptPolling, UnlockCoinbase},
    rpc::RPC,
};

pub const MIGRATIONS_CONTRACT: &str = "Migrations";
pub const ADMIN_PASSPHRASE: &str = "pwd@123";
pub const UNLOCK_DURATION_SECS: u64 = 36000;

// The first migration of every project:
//
//   0. check the endpoint's network id, if the config pins one
//   1. load the coinbase account of the endpoint
//   2. unlock it with the admin passphrase for ten hours
//   3. deploy the bookkeeping contract from it
pub fn build_initial_migration<T: RPC>(
    artifact: ContractArtifact,
    network: &NetworkConfig,
    polling: ReceiptPolling,
) -> Instruction<T> {
    let mut migration = Instruction::<T>::new(Vec::new());
    if let Some(expected) = network.pinned_network_id() {
        migration.push(Box::new(CheckNetworkId {
            expected: expected.to_string(),
        }));
    }
    migration.append(vec![
        Box::new(LoadCoinbase {}),
        Box::new(UnlockCoinbase {
            passphrase: ADMIN_PASSPHRASE.to_string(),
            duration: UNLOCK_DURATION_SECS,
        }),
        Box::new(DeployContract {
            artifact,
            gas: network.gas,
            gas_price: network.gas_price,
            polling,
        }),
    ]);
    migration
}
