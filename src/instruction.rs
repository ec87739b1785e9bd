use crate::{
    object::{Address, Deployment},
    rpc::RPC,
};

/// State threaded through the operations of a migration
#[derive(Debug, Clone, Default)]
pub struct MigrationContext {
    pub network: String,
    pub coinbase: Option<Address>,
    pub deployments: Vec<Deployment>,
}

impl MigrationContext {
    pub fn new(network: impl Into<String>) -> Self {
        MigrationContext {
            network: network.into(),
            ..Default::default()
        }
    }

    pub fn coinbase(&self) -> eyre::Result<&Address> {
        self.coinbase
            .as_ref()
            .ok_or(eyre::eyre!("coinbase account not loaded"))
    }
}

/// A single step of a migration
#[async_trait::async_trait]
pub trait Operation<T: RPC>: Send {
    async fn run(self: Box<Self>, rpc: &T, context: &mut MigrationContext) -> eyre::Result<()>;
}

/// Ordered operations that are applied one after another
pub struct Instruction<T: RPC> {
    operations: Vec<Box<dyn Operation<T>>>,
}

impl<T: RPC> Instruction<T> {
    pub fn new(operations: Vec<Box<dyn Operation<T>>>) -> Self {
        Instruction { operations }
    }

    pub fn push(&mut self, operation: Box<dyn Operation<T>>) {
        self.operations.push(operation);
    }

    pub fn append(&mut self, operations: Vec<Box<dyn Operation<T>>>) {
        self.operations.extend(operations);
    }

    pub async fn run(self, rpc: &T, context: &mut MigrationContext) -> eyre::Result<()> {
        for operation in self.operations {
            operation.run(rpc, context).await?;
        }
        Ok(())
    }
}

pub struct MigrationExecutor<T: RPC> {
    rpc: T,
    instructions: Vec<Instruction<T>>,
}

impl<T: RPC> MigrationExecutor<T> {
    pub fn new(rpc: T, instructions: Vec<Instruction<T>>) -> Self {
        MigrationExecutor { rpc, instructions }
    }

    pub async fn run(self, network: &str) -> eyre::Result<MigrationContext> {
        let mut context = MigrationContext::new(network);
        for instruction in self.instructions {
            instruction.run(&self.rpc, &mut context).await?;
        }
        Ok(context)
    }
}
