//! Folio Control - CLI client for the Folio Chat daemon.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

const DEFAULT_ADDR: &str = "http://127.0.0.1:7410";

#[derive(Parser)]
#[command(name = "folioctl")]
#[command(about = "Folio CRM - chat assistant client", long_about = None)]
#[command(version)]
struct Cli {
    /// Daemon base address
    #[arg(long, global = true, default_value = DEFAULT_ADDR)]
    addr: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the assistant a question
    Chat {
        /// The message to send
        message: String,

        /// User id to act as (forwarded in the x-folio-user header)
        #[arg(long)]
        user: String,
    },

    /// Show daemon health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Chat { message, user } => commands::chat(&cli.addr, &message, &user).await,
        Commands::Health => commands::health(&cli.addr).await,
    }
}
