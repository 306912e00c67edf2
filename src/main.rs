//! Unified CLI for the Claila chat relay
//!
//! This is the main binary that provides both server and chat modes
//! through a unified command-line interface using subcommands.
//!
//! # Usage
//!
//! ## Server Mode
//! ```bash
//! claila-relay server --port 5000 --host 0.0.0.0
//! ```
//!
//! ## Chat Mode
//! ```bash
//! claila-relay --message "hello there"
//! claila-relay            # interactive loop on stdin
//! ```
//!
//! ## Help and Version
//! ```bash
//! claila-relay --version
//! claila-relay --help
//! claila-relay server --help
//! ```

use clap::{Parser, Subcommand};

use claila_relay::cli::{
    chat::{ChatArgs, run_chat_mode},
    server::{ServerArgs, run_server_mode},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "claila-relay")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    // Chat mode options (when no subcommand is provided)
    /// Message to send as a single exchange (omit for interactive mode)
    #[arg(short, long, value_name = "MESSAGE", allow_hyphen_values = true)]
    message: Option<String>,

    /// System prompt prepended to every message
    #[arg(short, long, value_name = "SYSTEM_PROMPT")]
    system_prompt: Option<String>,

    /// Configuration file path
    #[arg(long)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server mode
    Server {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Configuration file path
        #[arg(long)]
        config: Option<String>,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Server {
            port,
            host,
            config,
            verbose,
        }) => {
            let args = ServerArgs {
                port,
                host,
                config,
                verbose,
            };
            run_server_mode(args).await
        }
        None => {
            // Chat mode (default when no subcommand)
            let args = ChatArgs {
                message: cli.message,
                system_prompt: cli.system_prompt,
                config: cli.config,
                verbose: cli.verbose,
            };
            run_chat_mode(args).await
        }
    }
}
