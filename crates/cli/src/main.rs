mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use folio_utils::output::OutputFormat;
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "folio",
    about = "Folio — cross-chain portfolio aggregator.\nMerges a wallet, its Farcaster custody address and verified addresses into one view.",
    version,
    propagate_version = true
)]
struct Cli {
    #[arg(long, short = 'o', global = true, default_value = "table")]
    output: CliOutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat { Table, Json, JsonPretty }

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> OutputFormat {
        match f {
            CliOutputFormat::Table => OutputFormat::Table,
            CliOutputFormat::Json => OutputFormat::Json,
            CliOutputFormat::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate and display a portfolio across addresses.
    Portfolio {
        /// Primary wallet address.
        address: String,
        /// Farcaster custody address.
        #[arg(long)]
        custody: Option<String>,
        /// Farcaster-verified address (repeatable).
        #[arg(long = "verified")]
        verified: Vec<String>,
        /// Hide dust holdings regardless of config.
        #[arg(long, default_value_t = false, conflicts_with = "show_dust")]
        hide_dust: bool,
        /// Show dust holdings regardless of config.
        #[arg(long, default_value_t = false)]
        show_dust: bool,
        /// Dust threshold in USD (overrides config).
        #[arg(long)]
        threshold: Option<Decimal>,
        /// Enrich the top N holdings with live metadata.
        #[arg(long, default_value_t = 0)]
        enrich: usize,
    },

    /// Look up metadata for one token.
    Token {
        /// Network slug (ethereum, base, polygon, ...).
        network: String,
        /// Token contract address.
        address: String,
        /// Bypass any cached entry and refetch.
        #[arg(long, default_value_t = false)]
        refresh: bool,
    },

    /// Show or change configuration.
    Configure {
        #[command(subcommand)]
        action: ConfigureAction,
    },

    /// Check config and gateway health.
    Doctor,
}

#[derive(Subcommand)]
enum ConfigureAction {
    /// Show current configuration.
    Show,
    /// Set the portfolio gateway base URL.
    Gateway { url: String },
    /// Set the GeckoTerminal API base URL.
    Gecko { url: String },
    /// Toggle hiding dust holdings by default.
    HideDust { enabled: bool },
    /// Set the dust threshold in USD.
    Threshold { value: Decimal },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    folio_core::init_workspace()?;

    let cli = Cli::parse();
    let fmt: OutputFormat = cli.output.into();

    match cli.command {
        Commands::Portfolio {
            address,
            custody,
            verified,
            hide_dust,
            show_dust,
            threshold,
            enrich,
        } => {
            commands::portfolio::run(
                &address, custody, verified, hide_dust, show_dust, threshold, enrich, fmt,
            )
            .await
        }

        Commands::Token { network, address, refresh } => {
            commands::token::run(&network, &address, refresh, fmt).await
        }

        Commands::Configure { action } => match action {
            ConfigureAction::Show => commands::configure::run(fmt),
            ConfigureAction::Gateway { url } => commands::configure::set_gateway(&url),
            ConfigureAction::Gecko { url } => commands::configure::set_gecko(&url),
            ConfigureAction::HideDust { enabled } => commands::configure::set_hide_dust(enabled),
            ConfigureAction::Threshold { value } => commands::configure::set_threshold(value),
        },

        Commands::Doctor => commands::doctor::run(fmt).await,
    }
}
