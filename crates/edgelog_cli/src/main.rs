//! edgelog CLI
//!
//! Command-line tools for edgelog journal devices.
//!
//! # Commands
//!
//! - `inspect` - Display the superblock and whether it validates
//! - `format` - Start a new checkpoint epoch (or initialize the device)
//! - `replay` - Recover and print the current epoch's entries

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// edgelog journal device tools.
#[derive(Parser)]
#[command(name = "edgelog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the journal device or image file
    #[arg(global = true, short, long)]
    device: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display the superblock and whether it validates
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Format the device: advance the generation, or reset if uninitialized
    Format,

    /// Recover and print the current epoch's log entries
    Replay {
        /// Maximum number of entries to print
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

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
        Commands::Inspect { format } => {
            let path = cli.device.ok_or("Device path required for inspect")?;
            commands::inspect::run(&path, &format)?;
        }
        Commands::Format => {
            let path = cli.device.ok_or("Device path required for format")?;
            commands::format::run(&path)?;
        }
        Commands::Replay { limit, format } => {
            let path = cli.device.ok_or("Device path required for replay")?;
            commands::replay::run(&path, limit, &format)?;
        }
        Commands::Version => {
            println!("edgelog CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("edgelog core v{}", edgelog_core::VERSION);
        }
    }

    Ok(())
}
