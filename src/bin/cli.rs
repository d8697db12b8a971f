//! FlintKV CLI
//!
//! Command-line demo that drives the embedded store in-process.

use clap::{Parser, Subcommand};
use flintkv::{Config, Result, Store, SyncStrategy};
use tracing_subscriber::{fmt, EnvFilter};

/// FlintKV CLI
#[derive(Parser, Debug)]
#[command(name = "flintkv-cli")]
#[command(about = "Single-file embedded key-value store")]
#[command(version)]
struct Args {
    /// Store file path
    #[arg(short, long, default_value = "./flintkv.db")]
    path: String,

    /// fsync after every append and before the polish rename
    #[arg(long)]
    sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Set a key to a value
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Get the value of a key
    Get {
        /// The key to get
        key: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Compact the log down to live records
    Polish,

    /// Copy the store to another path
    Backup {
        /// Destination path
        dest: String,

        /// Keep only live records instead of a byte-for-byte copy
        #[arg(long)]
        polished: bool,
    },

    /// Print live key count and log size
    Stats,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let sync_strategy = if args.sync {
        SyncStrategy::EveryWrite
    } else {
        SyncStrategy::Never
    };

    let store = Store::open(
        Config::builder()
            .path(&args.path)
            .sync_strategy(sync_strategy)
            .build(),
    )?;

    match args.command {
        Commands::Set { key, value } => {
            store.set(key.as_bytes(), value.as_bytes())?;
            println!("OK");
        }
        Commands::Get { key } => {
            let value = store.get(key.as_bytes())?;
            println!("{}", String::from_utf8_lossy(&value));
        }
        Commands::Del { key } => {
            store.delete(key.as_bytes())?;
            println!("OK");
        }
        Commands::Polish => {
            store.polish()?;
            println!(
                "polished: {} live keys, {} bytes",
                store.len(),
                store.log_size()?
            );
        }
        Commands::Backup { dest, polished } => {
            store.backup(&dest, polished)?;
            println!("backup written to {}", dest);
        }
        Commands::Stats => {
            println!("live keys: {}", store.len());
            println!("log size:  {} bytes", store.log_size()?);
        }
    }

    store.close()
}
