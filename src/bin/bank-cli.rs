use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use bank_client::blockchain::{ChainClient, RpcWalletProvider, Wallet};
use bank_client::config::{load_config, ClientConfig};
use bank_client::observability::init_logging;
use bank_client::{BankSession, Outcome};

#[derive(Parser)]
#[command(name = "bank-cli")]
#[command(about = "Interact with the bank contract from the command line", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect and show bank name, owner and balance
    Status,
    /// Deposit an amount in ETH (e.g. 0.5)
    Deposit { amount: String },
    /// Withdraw an amount in ETH to the connected account
    Withdraw { amount: String },
    /// Set the bank name (owner only)
    Rename { name: String },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    init_logging(&config.observability)?;

    tracing::info!(
        rpc_url = %config.chain.rpc_url,
        contract = %config.contract.address,
        "bank-cli starting"
    );

    // No key means no wallet, the same as a browser without an extension.
    let provider = match Wallet::from_env(config.chain.chain_id) {
        Ok(wallet) => Some(RpcWalletProvider::connect(&config.chain, wallet)?),
        Err(e) => {
            tracing::warn!(error = %e, "No wallet available");
            None
        }
    };

    let client = ChainClient::new(provider, config.contract_address()?, &config.chain);
    let session = BankSession::new(client);
    let mut errors = session.subscribe_errors();

    let succeeded = match session.connect().await {
        Err(_) => false,
        Ok(_) => match cli.command {
            Commands::Status => session.state().last_error().is_none(),
            Commands::Deposit { amount } => report(session.deposit(&amount).await),
            Commands::Withdraw { amount } => report(session.withdraw(&amount).await),
            Commands::Rename { name } => report(session.rename(&name).await),
        },
    };

    while let Ok(error) = errors.try_recv() {
        match error.reason {
            Some(reason) => eprintln!("Error: {} ({})", error.kind, reason),
            None => eprintln!("Error: {}", error.kind),
        }
    }

    println!("{}", serde_json::to_string_pretty(&session.state().snapshot())?);
    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn report(outcome: Outcome) -> bool {
    if let Outcome::Blocked { reason } = &outcome {
        eprintln!("Not submitted: {:?}", reason);
    }
    outcome.is_success()
}
