use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::migration::MIGRATIONS_CONTRACT;

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The network to migrate, must be a key of the `[networks]` table in the config file
    #[arg(short, long, global = true, default_value_t = String::from("development"))]
    pub network: String,

    /// The TOML file holding the network table
    #[arg(short, long, global = true, default_value = "network-config.toml")]
    pub config: PathBuf,

    /// Where deployment records are kept, one directory per network
    #[arg(long, global = true, default_value = "migration")]
    pub record_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Unlock the coinbase account and deploy the migration bookkeeping contract
    Migrate {
        /// Contract name of the compiled artifact in `artifacts_dir`
        #[arg(long, default_value_t = String::from(MIGRATIONS_CONTRACT))]
        contract_name: String,
        /// Directory of compiled contract artifacts
        #[arg(long, default_value = "build/contracts")]
        artifacts_dir: PathBuf,
    },
    /// Print the latest deployment record of a contract
    Show {
        #[arg(long, default_value_t = String::from(MIGRATIONS_CONTRACT))]
        contract_name: String,
    },
    /// List the networks of the config file with their endpoints
    Networks,
}
