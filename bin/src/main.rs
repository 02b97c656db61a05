//! quotesync CLI - Keeps daily price histories in sync.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod display;

use display::Format;

#[derive(Parser)]
#[command(name = "quotesync")]
#[command(about = "Incremental daily price history synchronizer", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Data directory. Defaults to the platform data directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Download or update the history of one or more symbols
    Sync {
        /// Symbols to synchronize (e.g., aapl, msft, ^gspc)
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Maximum symbols synchronized at once
        #[arg(long, default_value = "4")]
        parallel: usize,

        /// Per-request timeout in seconds
        #[arg(long, default_value = "30")]
        timeout: u64,

        /// Retry attempts for failed requests
        #[arg(long, default_value = "3")]
        retries: u32,
    },

    /// Print the stored history of a symbol
    Show {
        /// Symbol identifier
        symbol: String,

        /// Only print the most recent N bars
        #[arg(short, long)]
        tail: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: Format,
    },

    /// List validated symbols and their stored coverage
    Symbols,
}

fn init_logging(verbose: u8, quiet: bool) {
    let default = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    init_logging(cli.verbose, cli.quiet);
    let layout = commands::open_layout(cli.data_dir)?;

    match command {
        Commands::Sync {
            symbols,
            parallel,
            timeout,
            retries,
        } => commands::sync::sync(layout, symbols, parallel, timeout, retries, cli.quiet).await,
        Commands::Show {
            symbol,
            tail,
            format,
        } => commands::show::show(layout, &symbol, tail, format).await,
        Commands::Symbols => commands::symbols::list_symbols(layout).await,
    }
}
