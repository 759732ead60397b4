use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

/// Normalize schedule requests and check them against blockouts.
#[derive(Parser, Debug)]
#[command(name = "schedkit", about = "Schedule request normalization and blockout checks")]
pub struct CliArgs {
    /// Config profile; keys are read as `{PROFILE}_{KEY}` before `{KEY}`
    #[arg(long, env = "SCHEDKIT_PROFILE")]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the canonical trigger for a request and its upcoming fires
    Normalize {
        /// Schedule request JSON file
        request: PathBuf,

        /// Reference instant (RFC 3339); defaults to now
        #[arg(long)]
        now: Option<DateTime<Utc>>,

        /// Number of upcoming fire times to list
        #[arg(long, default_value = "5")]
        fires: usize,
    },

    /// Report whether a request will fire given a set of blockouts
    Check {
        /// Schedule request JSON file; omit to only gate the `--at` instant
        request: Option<PathBuf>,

        /// Blockout request JSON files (each needs a `duration`)
        #[arg(long = "blockout")]
        blockouts: Vec<PathBuf>,

        /// Reference instant (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },

    /// Resolve the output folder of a request against a local directory tree
    ResolveOutput {
        /// Schedule request JSON file
        request: PathBuf,

        /// User the output belongs to
        #[arg(long)]
        owner: String,

        /// Directory standing in for the repository root
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Settings JSON file (`system` and per-user `users` maps)
        #[arg(long)]
        settings: Option<PathBuf>,
    },
}
