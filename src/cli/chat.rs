//! Chat mode CLI logic
//!
//! Contains the core logic for the interactive and one-shot chat modes,
//! driving the relay in-process without an HTTP listener.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{Settings, config::ConfigLoader, relay::ChatRelay, types::ChatRequest};

/// Arguments for chat mode
#[derive(Debug)]
pub struct ChatArgs {
    pub message: Option<String>,
    pub system_prompt: Option<String>,
    pub config: Option<String>,
    pub verbose: bool,
}

/// Run chat mode with the given arguments
///
/// With `--message` the relay is driven once and the reply printed to
/// stdout. Without it, an interactive loop reads messages from stdin
/// until EOF or an exit command.
pub async fn run_chat_mode(args: ChatArgs) -> Result<()> {
    // Logging goes to stderr so stdout stays clean for replies
    if args.verbose {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "error".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let config_loader = ConfigLoader::new();
    let config_path = if let Some(config) = &args.config {
        Some(std::path::PathBuf::from(config))
    } else {
        ConfigLoader::get_config_path()
    };

    let settings = config_loader
        .load(config_path.as_deref())
        .unwrap_or_else(|e| {
            eprintln!(
                "Warning: Failed to load configuration: {}. Using defaults.",
                e
            );
            Settings::default()
        });

    debug!(
        "Starting chat mode: one_shot={}, system_prompt={:?}",
        args.message.is_some(),
        args.system_prompt
    );

    let relay = ChatRelay::new(settings);

    if let Some(message) = args.message {
        let mut request = ChatRequest::new(message);
        request.system_prompt = args.system_prompt;

        let reply = relay.relay(&request).await?;
        println!("{}", reply.response);
        return Ok(());
    }

    run_interactive_loop(&relay, args.system_prompt).await
}

/// Read messages from stdin and print replies until EOF or exit
async fn run_interactive_loop(relay: &ChatRelay, system_prompt: Option<String>) -> Result<()> {
    eprintln!("Interactive chat. Type 'exit' or 'quit' to leave.");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await? {
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        let mut request = ChatRequest::new(message);
        request.system_prompt = system_prompt.clone();

        match relay.relay(&request).await {
            Ok(reply) => println!("{}", reply.response),
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_args_defaults() {
        let args = ChatArgs {
            message: None,
            system_prompt: None,
            config: None,
            verbose: false,
        };
        assert!(args.message.is_none());
        assert!(args.system_prompt.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_chat_args_one_shot() {
        let args = ChatArgs {
            message: Some("hello".to_string()),
            system_prompt: Some("be brief".to_string()),
            config: None,
            verbose: true,
        };
        assert_eq!(args.message, Some("hello".to_string()));
        assert_eq!(args.system_prompt, Some("be brief".to_string()));
        assert!(args.verbose);
    }
}
