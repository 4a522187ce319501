//! CLI argument definitions using clap.
//!
//! Commands:
//! - docgate init --config <path>
//! - docgate check --config <path>
//! - docgate start --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docgate - schema-governed document validation and persistence engine
#[derive(Parser, Debug)]
#[command(name = "docgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default configuration file and create the schema directory
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./docgate.json")]
        config: PathBuf,
    },

    /// Load the schema directory once and report what it contains
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./docgate.json")]
        config: PathBuf,
    },

    /// Start the ingestion service
    Start {
        /// Path to configuration file
        #[arg(long, default_value = "./docgate.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
