//! EVM wallet CLI
//!
//! Command-line access to a seed-derived wallet. The seed phrase is read from
//! `SEED_PHRASE` (a `.env` file is honoured) and is never printed.

use alloy::primitives::{Address, U256};
use clap::{Parser, Subcommand};
use evm_wallet_manager::{
    tokens, Error, Result, RpcConfig, TransferRequest, WalletConfig, WalletManagerEvm,
};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SEED_PHRASE_ENV: &str = "SEED_PHRASE";

#[derive(Parser)]
#[command(name = "evm-wallet")]
#[command(about = "Seed-derived EVM wallet with a fee ceiling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Network used when the config has no provider (ethereum, sepolia, holesky, local)
    #[arg(short, long, global = true, default_value = "sepolia")]
    network: String,

    /// Account index under m/44'/60'/0'/0
    #[arg(short, long, global = true, default_value_t = 0)]
    index: u32,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the account address (no network access)
    Address,

    /// Native balance in wei
    Balance,

    /// ERC-20 balance of the account
    TokenBalance {
        /// Token contract address
        #[arg(long)]
        token: String,
    },

    /// Suggested max fee per gas
    FeeRates,

    /// Quote the fee of a transfer without sending it
    Quote {
        /// Recipient address
        #[arg(long)]
        to: String,

        /// Amount in base units (wei for native currency)
        #[arg(long)]
        amount: String,

        /// Token contract address; omit for native currency
        #[arg(long)]
        token: Option<String>,
    },

    /// Send native currency or tokens
    Transfer {
        /// Recipient address
        #[arg(long)]
        to: String,

        /// Amount in base units (wei for native currency)
        #[arg(long)]
        amount: String,

        /// Token contract address; omit for native currency
        #[arg(long)]
        token: Option<String>,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = load_config(cli.config.as_ref(), &cli.network)?;

    if let Commands::Config = cli.command {
        println!("{}", serde_json::to_string_pretty(&config.redacted())?);
        return Ok(());
    }

    let seed_phrase = std::env::var(SEED_PHRASE_ENV)
        .map_err(|_| Error::Config(format!("{} is not set", SEED_PHRASE_ENV)))?;
    let wallet = WalletManagerEvm::new(&seed_phrase, config)?;
    drop(seed_phrase);

    let account = wallet.get_account(cli.index)?;

    match cli.command {
        Commands::Address => {
            println!("{}", serde_json::to_string_pretty(&account)?);
        }
        Commands::Balance => {
            let balance = account.get_balance().await?;
            println!("{} wei ({} ETH)", balance, tokens::format_units(balance, 18));
        }
        Commands::TokenBalance { token } => {
            let token = parse_address(&token)?;
            let balance = account.get_token_balance(token).await?;
            let chain_id = wallet_chain_id(&cli.network);
            match chain_id.and_then(|id| tokens::registry().get(id, &token)) {
                Some(info) => println!(
                    "{} {}",
                    tokens::format_units(balance, info.decimals as u32),
                    info.symbol
                ),
                None => println!("{}", balance),
            }
        }
        Commands::FeeRates => {
            let rates = wallet.get_fee_rates().await?;
            println!("{}", serde_json::to_string_pretty(&rates)?);
        }
        Commands::Quote { to, amount, token } => {
            let request = transfer_request(&to, &amount, token.as_deref())?;
            let quote = account.quote_transfer(&request).await?;
            println!("{}", serde_json::to_string_pretty(&quote)?);
            if quote.total_fee > wallet.config().transfer_max_fee {
                println!(
                    "Note: fee exceeds the configured max of {} wei; transfer would be refused",
                    wallet.config().transfer_max_fee
                );
            }
        }
        Commands::Transfer { to, amount, token } => {
            let request = transfer_request(&to, &amount, token.as_deref())?;

            tracing::info!(
                from = %account.address(),
                to = %request.recipient,
                amount = %request.amount,
                token = ?request.token,
                "Submitting transfer"
            );

            let result = account.transfer(&request).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&wallet.config().redacted())?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&PathBuf>, network: &str) -> Result<WalletConfig> {
    let config = match path {
        Some(path) => WalletConfig::from_file(path)?,
        None => WalletConfig::default(),
    };

    if config.provider.is_some() {
        return Ok(config);
    }

    let chain_id = wallet_chain_id(network)
        .ok_or_else(|| Error::InvalidArgument(format!("Unknown network: {}", network)))?;
    let rpc = RpcConfig::from_env();

    match rpc.get(chain_id) {
        Some(url) => Ok(config.with_provider(url)),
        None => Ok(config),
    }
}

fn wallet_chain_id(network: &str) -> Option<u64> {
    RpcConfig::chain_id_for(network)
}

fn parse_address(value: &str) -> Result<Address> {
    value
        .parse()
        .map_err(|e| Error::InvalidArgument(format!("Invalid address {}: {}", value, e)))
}

fn parse_amount(value: &str) -> Result<U256> {
    value
        .parse()
        .map_err(|e| Error::InvalidArgument(format!("Invalid amount {}: {}", value, e)))
}

fn transfer_request(to: &str, amount: &str, token: Option<&str>) -> Result<TransferRequest> {
    let recipient = parse_address(to)?;
    let amount = parse_amount(amount)?;

    Ok(match token {
        Some(token) => TransferRequest::token(parse_address(token)?, recipient, amount),
        None => TransferRequest::native(recipient, amount),
    })
}
