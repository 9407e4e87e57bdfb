// CLI tool for issuing Token-2022 mints with on-chain metadata
//
// Connection flags are shared by every subcommand; values given on the
// command line override the configuration file.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::Session;

#[derive(Parser)]
#[command(name = "token-issuer")]
#[command(about = "Issue Token-2022 mints with embedded metadata", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Cluster name (devnet, testnet, mainnet, localnet) or RPC URL
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Commitment level (processed, confirmed, finalized)
    #[arg(long, global = true)]
    commitment: Option<String>,

    /// Path to payer keypair file
    #[arg(long, global = true)]
    keypair: Option<String>,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a mint with metadata and mint the initial supply to the payer
    Issue(commands::issue::IssueCmd),

    /// Show mint, metadata pointer and metadata of an existing mint
    Show(commands::show::ShowCmd),

    /// Mint tokens to an owner's associated token account
    Mint(commands::mint::MintCmd),

    /// Show an owner's balance of a mint
    Balance(commands::mint::BalanceCmd),

    /// Set a metadata field (name, symbol, uri or a custom key)
    SetField(commands::metadata::SetFieldCmd),

    /// Remove a custom metadata key
    RemoveField(commands::metadata::RemoveFieldCmd),

    /// Write an example configuration file
    InitConfig(commands::config::InitConfigCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_logging(&cli.log_level);

    let session = || {
        Session::open(
            cli.config.as_deref(),
            cli.rpc_url.as_deref(),
            cli.commitment.as_deref(),
            cli.keypair.as_deref(),
        )
    };

    // Execute command
    match cli.command {
        Commands::Issue(cmd) => commands::issue::execute(cmd, session()?).await,
        Commands::Show(cmd) => commands::show::execute(cmd, session()?).await,
        Commands::Mint(cmd) => commands::mint::execute(cmd, session()?).await,
        Commands::Balance(cmd) => commands::mint::balance(cmd, session()?).await,
        Commands::SetField(cmd) => commands::metadata::set_field(cmd, session()?).await,
        Commands::RemoveField(cmd) => commands::metadata::remove_field(cmd, session()?).await,
        Commands::InitConfig(cmd) => commands::config::execute(cmd),
    }
}

fn init_logging(log_level: &str) {
    let level: tracing::Level = log_level.parse().unwrap_or(tracing::Level::INFO);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("token_issuer={}", level.as_str().to_lowercase()).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
