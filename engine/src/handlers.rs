//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - chat: Interactive conversation on stdin
//! - ask: One turn, reply printed
//! - config: Show the effective configuration or its path

use anyhow::{Context, Result};
use serde_json::json;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use oopsie_sdk::errors::{EngineError, OopsieErrorExt};
use oopsie_sdk::TaskStore;

use crate::agent::{AgentEngine, EngineSettings, TracingObserver};
use crate::cache::SpaceCache;
use crate::config::Config;
use crate::llm::openai::OpenAICompatibleProvider;
use crate::secrets::env_secret;
use crate::store::InMemoryTaskStore;
use crate::tools::ToolBridge;

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// One line typed in the chat loop
#[derive(Debug, PartialEq, Eq)]
pub enum ChatInput {
    Quit,
    Reset,
    Empty,
    Text(String),
}

pub fn parse_chat_input(line: &str) -> ChatInput {
    match line.trim() {
        "" => ChatInput::Empty,
        "/quit" | "/exit" => ChatInput::Quit,
        "/reset" => ChatInput::Reset,
        text => ChatInput::Text(text.to_string()),
    }
}

/// Apology shown when a turn fails, with a hint when one is known
pub fn failure_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<EngineError>() {
        Some(engine_err) => format!("Sorry, I couldn't do that. {}", engine_err.user_hint()),
        None => "Sorry, I couldn't do that. Please try again".to_string(),
    }
}

/// Report printed for a failed one-shot turn
pub fn render_ask_failure(err: &anyhow::Error, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(failure_message(err)),
        OutputFormat::Json => {
            let output = json!({
                "status": "failed",
                "error": format!("{:#}", err)
            });
            Ok(serde_json::to_string_pretty(&output)?)
        }
    }
}

/// Build an engine from configuration
///
/// Reads the API key from the environment, wires the in-memory store and
/// warms the space cache.
pub async fn build_engine(config: &Config) -> Result<AgentEngine> {
    let api_key = env_secret(&config.llm.api_key_env)?;
    let timezone = config.timezone()?;

    let store: Arc<dyn TaskStore> = Arc::new(InMemoryTaskStore::new());
    let cache = Arc::new(SpaceCache::with_ttl(Arc::clone(&store), config.cache.ttl()));
    cache.load().await;

    let bridge = Arc::new(ToolBridge::new(store, Arc::clone(&cache)));
    let provider = Arc::new(OpenAICompatibleProvider::new(config.llm.clone(), api_key));

    let settings = EngineSettings {
        timezone,
        max_messages: config.session.max_messages,
        max_iterations: config.llm.max_iterations,
        llm_timeout: config.llm.timeout(),
    };

    Ok(AgentEngine::new(provider, bridge, cache, settings).with_observer(Arc::new(TracingObserver)))
}

/// Send one message and print the reply
///
/// A failed turn is reported once on stdout and yields a failure exit code.
pub async fn handle_ask(
    text: String,
    user: Option<String>,
    config: &Config,
    format: OutputFormat,
) -> Result<ExitCode> {
    let mut engine = build_engine(config).await?;
    engine.set_user_id(user);

    let result = engine.process_message(&text).await;

    match result {
        Ok(reply) => {
            match format {
                OutputFormat::Text => println!("{}", reply),
                OutputFormat::Json => {
                    let output = json!({
                        "status": "ok",
                        "session_id": engine.session_id(),
                        "reply": reply
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!("Turn failed: {:#}", e);
            println!("{}", render_ask_failure(&e, format)?);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Interactive conversation on stdin
///
/// A failed turn prints an apology and the loop continues.
pub async fn handle_chat(user: Option<String>, config: &Config) -> Result<()> {
    let mut engine = build_engine(config).await?;
    engine.set_user_id(user);

    println!("Oopsie is listening. Type /reset to start over, /quit to leave.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        match parse_chat_input(&line) {
            ChatInput::Empty => continue,
            ChatInput::Quit => break,
            ChatInput::Reset => {
                engine.reset();
                println!("Conversation reset.");
            }
            ChatInput::Text(text) => match engine.process_message(&text).await {
                Ok(reply) => println!("{}", reply),
                Err(e) => {
                    tracing::error!("Turn failed: {:#}", e);
                    println!("{}", failure_message(&e));
                }
            },
        }
    }

    Ok(())
}

/// Print the effective configuration
pub fn handle_config_show(config: &Config, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", config.to_toml()?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
    }
    Ok(())
}

/// Print the configuration file path
pub fn handle_config_path(custom: Option<&std::path::Path>) -> Result<()> {
    let path = match custom {
        Some(path) => path.to_path_buf(),
        None => Config::default_config_path()?,
    };
    println!("{}", path.display());
    Ok(())
}
