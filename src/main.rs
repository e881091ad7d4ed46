//! kettle-harness command line.
//!
//! Small operator commands against a running kettle (and its L1): inspect the
//! kettle address, mint throwaway keys, check balances and fund accounts.

use std::path::PathBuf;

use alloy::primitives::{Address, U256};
use clap::{Parser, Subcommand};

use kettle_harness::chain::{ChainClient, ChainRole, Identity, TxSettings};
use kettle_harness::config::{load_or_default, HarnessConfig};
use kettle_harness::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "kettle-harness")]
#[command(about = "Drive a kettle and its L1 from the command line", long_about = None)]
struct Cli {
    /// TOML config file; defaults plus KETTLE_* / L1_* env overrides otherwise.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the kettle's execution address
    KettleAddress,
    /// Generate a random identity
    NewKey,
    /// Print the balance of an address in wei
    Balance {
        address: Address,
        /// Query the L1 instead of the kettle
        #[arg(long)]
        l1: bool,
    },
    /// Transfer wei from the funded account; the target must end with exactly this balance
    Fund {
        address: Address,
        amount: U256,
        /// Fund on the L1 instead of the kettle
        #[arg(long)]
        l1: bool,
    },
}

async fn connect(
    config: &HarnessConfig,
    l1: bool,
) -> Result<ChainClient, Box<dyn std::error::Error>> {
    let settings = TxSettings::from(&config.transactions);
    let client = if l1 {
        ChainClient::connect(ChainRole::Public, &config.l1.endpoint(), settings).await?
    } else {
        ChainClient::connect(ChainRole::Confidential, &config.kettle, settings).await?
    };
    Ok(client)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_or_default(cli.config.as_deref())?;
    logging::init_logging(&config.observability);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    match cli.command {
        Commands::KettleAddress => {
            let client = connect(&config, false).await?;
            if let Some(address) = client.kettle_address() {
                println!("{}", address);
            }
        }
        Commands::NewKey => {
            let identity = Identity::generate();
            println!("address:     {}", identity.address());
            println!("private key: 0x{}", identity.to_hex());
        }
        Commands::Balance { address, l1 } => {
            let client = connect(&config, l1).await?;
            println!("{}", client.balance(address).await?);
        }
        Commands::Fund { address, amount, l1 } => {
            let client = connect(&config, l1).await?;
            client.fund_account(address, amount).await?;
            println!("funded {} with {} wei on {}", address, amount, client.role());
        }
    }

    Ok(())
}
