//! contactsync CLI
//!
//! Command-line tools that mirror a remote contact snapshot into a local
//! contact store.
//!
//! # Commands
//!
//! - `sync` - Run one pass into the store
//! - `plan` - Show the batches a pass would apply
//! - `inspect` - Display the contacts of an account
//! - `watch` - Keep syncing on a schedule until stdin closes

mod commands;
mod snapshot;

use clap::{Args, Parser, Subcommand};
use contactsync_engine::{SyncConfig, DEFAULT_ACCOUNT_TYPE};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// contactsync command-line tools.
#[derive(Parser)]
#[command(name = "contactsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the local contact store
    #[arg(global = true, short, long)]
    store: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Host account selection.
#[derive(Args)]
struct AccountArgs {
    /// Host account name (login e-mail or remote account id)
    #[arg(short, long)]
    account: String,

    /// Host account type
    #[arg(long, default_value = DEFAULT_ACCOUNT_TYPE)]
    account_type: String,
}

impl AccountArgs {
    fn config(&self) -> SyncConfig {
        SyncConfig::new(self.account_type.clone())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run one sync pass from a remote snapshot
    Sync {
        /// Remote snapshot (JSON)
        #[arg(short, long)]
        remote: PathBuf,

        #[command(flatten)]
        account: AccountArgs,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show the batches a sync pass would apply
    Plan {
        /// Remote snapshot (JSON)
        #[arg(short, long)]
        remote: PathBuf,

        #[command(flatten)]
        account: AccountArgs,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Display the contacts of an account
    Inspect {
        #[command(flatten)]
        account: AccountArgs,

        /// List every contact with its fields
        #[arg(short, long)]
        contacts: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Sync on a schedule until stdin is closed
    Watch {
        /// Remote snapshot (JSON)
        #[arg(short, long)]
        remote: PathBuf,

        #[command(flatten)]
        account: AccountArgs,

        /// Seconds between periodic passes
        #[arg(short, long, default_value = "21600")]
        interval_secs: u64,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Sync {
            remote,
            account,
            format,
        } => {
            let store = cli.store.ok_or("Store path required for sync")?;
            commands::sync::run(&store, &remote, account.config(), &account.account, &format)?;
        }
        Commands::Plan {
            remote,
            account,
            format,
        } => {
            let store = cli.store.ok_or("Store path required for plan")?;
            commands::plan::run(&store, &remote, account.config(), &account.account, &format)?;
        }
        Commands::Inspect {
            account,
            contacts,
            format,
        } => {
            let store = cli.store.ok_or("Store path required for inspect")?;
            let key = account.config().account(account.account.clone());
            commands::inspect::run(&store, &key, contacts, &format)?;
        }
        Commands::Watch {
            remote,
            account,
            interval_secs,
            format,
        } => {
            let store = cli.store.ok_or("Store path required for watch")?;
            let config = account
                .config()
                .with_sync_interval(Duration::from_secs(interval_secs.max(1)));
            commands::watch::run(&store, &remote, config, &account.account, &format)?;
        }
        Commands::Version => {
            println!("contactsync CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
