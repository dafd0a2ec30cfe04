//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the fakeapi binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Fake update API command-line interface.
#[derive(Parser, Debug)]
#[command(name = "fakeapi", about = "Fake update API for test runs", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the fake API until interrupted, then report what was received.
    Serve {
        /// Scenario whose expectations the calls are checked against.
        /// Without one, calls are only recorded.
        #[arg(long)]
        scenario: Option<PathBuf>,

        /// Write the received calls as a new scenario to this file.
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Host to bind.
        #[arg(long, env = "FAKE_API_HOST")]
        host: Option<String>,
    },

    /// Load a scenario strictly and list its expectations.
    Check {
        /// The scenario file to check.
        scenario: PathBuf,
    },
}
