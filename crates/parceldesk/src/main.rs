// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parceldesk - a delivery complaint ticket desk.
//!
//! This is the binary entry point for the Parceldesk server and its
//! operational subcommands.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};

mod archive;
mod serve;
mod status;

/// Parceldesk - a delivery complaint ticket desk.
#[derive(Parser, Debug)]
#[command(name = "parceldesk", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Parceldesk gateway server.
    Serve,
    /// Run one archival sweep over the ticket store.
    Archive {
        /// Output the run summary as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show ticket tallies for the configured database.
    Status {
        /// Output structured JSON for scripting.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match parceldesk_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            parceldesk_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Archive { json }) => archive::run_archive(&config, json).await,
        Some(Commands::Status { json }) => status::run_status(&config, json).await,
        None => {
            println!("parceldesk: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
