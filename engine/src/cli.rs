//! CLI interface for Oopsie
//!
//! This module provides the command-line interface using clap's derive API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Oopsie task assistant
///
/// Manage your task list by chatting in plain language.
#[derive(Parser, Debug)]
#[command(name = "oopsie")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start an interactive conversation (/reset, /quit)
    Chat {
        /// Identifier of the end user
        #[arg(long)]
        user: Option<String>,
    },

    /// Send one message and print the reply
    Ask {
        /// The message to send
        text: String,

        /// Identifier of the end user
        #[arg(long)]
        user: Option<String>,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug, Default)]
pub enum ConfigAction {
    /// Show the effective configuration
    #[default]
    Show,

    /// Print the configuration file path
    Path,
}
