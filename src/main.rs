use clap::Parser;
use tracing_subscriber::EnvFilter;

use migration_runner::{
    command::{Cli, Commands},
    handle::*,
};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Migrate {
            contract_name,
            artifacts_dir,
        } => {
            initial_migration(
                cli.network,
                cli.config,
                cli.record_dir,
                artifacts_dir,
                contract_name,
            )
            .await
        }
        Commands::Show { contract_name } => {
            show_deployment(cli.network, cli.record_dir, contract_name)
        }
        Commands::Networks => list_networks(cli.config),
    }
}
