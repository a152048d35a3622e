//! CLI interface for Persona
//!
//! This module provides the command-line interface using clap's derive API.
//! It defines all commands and global flags for running the quiz webhook.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Persona personality quiz engine
///
/// Fulfillment webhook for a voice/chat/canvas personality quiz: it asks
/// trait-balanced yes/no questions, scores the answers and reveals the
/// best-fitting outcome.
#[derive(Parser, Debug)]
#[command(name = "persona")]
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
    /// Run the fulfillment webhook server
    Serve {
        /// Override the configured listen host
        #[arg(long)]
        host: Option<String>,

        /// Override the configured listen port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run one turn offline and print the response
    Turn {
        /// Fulfillment request JSON file, or `-` for stdin
        request: PathBuf,

        /// Seed the turn RNG for a reproducible response
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List every action the webhook handles
    Actions,

    /// Check configuration and content
    Doctor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["persona", "doctor"]);
        assert!(matches!(cli.command, Command::Doctor));
        assert!(!cli.json);
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["persona", "--log", "debug", "--config", "/tmp/p.toml", "actions"]);
        assert_eq!(cli.log.as_deref(), Some("debug"));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/p.toml")));
        assert!(matches!(cli.command, Command::Actions));
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::parse_from(["persona", "serve", "--port", "9000"]);
        if let Command::Serve { host, port } = cli.command {
            assert_eq!(host, None);
            assert_eq!(port, Some(9000));
        } else {
            panic!("Expected Serve command");
        }
    }

    #[test]
    fn test_turn_command() {
        let cli = Cli::parse_from(["persona", "turn", "request.json", "--seed", "7", "--json"]);
        if let Command::Turn { request, seed } = cli.command {
            assert_eq!(request, PathBuf::from("request.json"));
            assert_eq!(seed, Some(7));
        } else {
            panic!("Expected Turn command");
        }
        assert!(cli.json);
    }
}
