//! CLI module for the user registry
//!
//! - `serve`: run the HTTP API (default)

pub mod serve;

use clap::{Parser, Subcommand};

/// User registry - CRUD service for user records
#[derive(Parser)]
#[command(name = "user-registry")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["user-registry", "serve"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Serve)));
    }

    #[test]
    fn test_subcommand_is_optional() {
        let cli = Cli::try_parse_from(["user-registry"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["user-registry", "migrate"]).is_err());
    }
}
