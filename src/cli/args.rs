//! CLI argument definitions using clap
//!
//! Commands:
//! - aerorel explain --config <path> --request <file|->
//! - aerorel check --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// aerorel - relationship paths compiled to aggregation pipelines
#[derive(Parser, Debug)]
#[command(name = "aerorel")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Plan a search request and print the pipeline
    Explain {
        /// Path to configuration file
        #[arg(long, default_value = "./aerorel.json")]
        config: PathBuf,

        /// Search request JSON file, or "-" for stdin
        #[arg(long, default_value = "-")]
        request: String,

        /// Print the human-readable form instead of JSON
        #[arg(long)]
        text: bool,
    },

    /// Load schemas and report relations to unregistered types
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./aerorel.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explain_defaults() {
        let cli = Cli::try_parse_from(["aerorel", "explain"]).unwrap();
        match cli.command {
            Command::Explain {
                config,
                request,
                text,
            } => {
                assert_eq!(config, PathBuf::from("./aerorel.json"));
                assert_eq!(request, "-");
                assert!(!text);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_check_with_config() {
        let cli = Cli::try_parse_from(["aerorel", "check", "--config", "/etc/aerorel.json"])
            .unwrap();
        assert!(matches!(cli.command, Command::Check { config } if config == PathBuf::from("/etc/aerorel.json")));
    }
}
