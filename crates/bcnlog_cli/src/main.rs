//! bcnlog CLI
//!
//! Command-line tools for the partitioned download log.
//!
//! # Commands
//!
//! - `record` - Record a download event
//! - `register-client` - Register a client in the fixed client table
//! - `resolve` - Show which bucket a timestamp resolves to
//! - `provision` - Create a bucket's partition ahead of time
//! - `window add` - Seed the window relation of a SQLite store
//! - `inspect` - Show whether a partition exists and how many rows it holds

mod commands;

use bcnlog_core::{Config, UnresolvedPolicy, DEFAULT_STORE_FILE};
use clap::{Parser, Subcommand};
use commands::{OutputFormat, StoreArgs};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// bcnlog command-line tools.
#[derive(Parser)]
#[command(name = "bcnlog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the JSON file holding the store url
    #[arg(global = true, short, long, default_value = DEFAULT_STORE_FILE)]
    store: PathBuf,

    /// Store url, overriding the store file
    #[arg(global = true, short, long)]
    url: Option<String>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    /// Read written rows back to include store-assigned fields
    #[arg(global = true, long)]
    readback: bool,

    /// Fail instead of writing to bucket 0 when no window matches
    #[arg(global = true, long)]
    reject_unresolved: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a download event
    Record {
        /// Project id
        project: String,
        /// Client public key
        key: String,
        /// Client IP address
        ip: String,
        /// Content hash
        hash: String,

        /// Record as if at this Unix timestamp instead of now
        #[arg(long)]
        at: Option<i64>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Register a client
    RegisterClient {
        /// Client public key
        key: String,
        /// Client IP address
        ip: String,
        /// Owning customer id
        customer: String,
    },

    /// Show which bucket a timestamp resolves to
    Resolve {
        /// Unix timestamp (defaults to now)
        #[arg(long)]
        at: Option<i64>,
    },

    /// Create a bucket's partition ahead of its first write
    Provision {
        /// Bucket id
        #[arg(allow_negative_numbers = true)]
        bucket: i64,
    },

    /// Maintain the window relation of a SQLite store
    Window {
        #[command(subcommand)]
        command: WindowCommands,
    },

    /// Show whether a partition exists and how many rows it holds
    Inspect {
        /// Bucket id
        #[arg(allow_negative_numbers = true)]
        bucket: i64,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum WindowCommands {
    /// Add a window row
    Add {
        /// Bucket id
        #[arg(allow_negative_numbers = true)]
        bucket: i64,
        /// First covered Unix second
        start: i64,
        /// Last covered Unix second
        end: i64,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let store = StoreArgs {
        store_file: &cli.store,
        url: cli.url.as_deref(),
    };
    let policy = if cli.reject_unresolved {
        UnresolvedPolicy::Reject
    } else {
        UnresolvedPolicy::FallbackToZero
    };
    let config = Config::new()
        .confirm_via_readback(cli.readback)
        .unresolved_policy(policy);

    match cli.command {
        Commands::Record {
            project,
            key,
            ip,
            hash,
            at,
            format,
        } => {
            commands::record::run(
                &store,
                config,
                [project.as_str(), key.as_str(), ip.as_str(), hash.as_str()],
                at,
                OutputFormat::parse(&format),
            )?;
        }
        Commands::RegisterClient { key, ip, customer } => {
            commands::client::register(&store, &key, &ip, &customer)?;
        }
        Commands::Resolve { at } => {
            commands::resolve::run(&store, config, at)?;
        }
        Commands::Provision { bucket } => {
            commands::provision::run(&store, bucket)?;
        }
        Commands::Window { command } => match command {
            WindowCommands::Add { bucket, start, end } => {
                commands::window::add(&store, bucket, start, end)?;
            }
        },
        Commands::Inspect { bucket, format } => {
            commands::inspect::run(&store, bucket, OutputFormat::parse(&format))?;
        }
        Commands::Version => {
            println!("bcnlog CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("bcnlog Core v{}", bcnlog_core::VERSION);
        }
    }

    Ok(())
}
