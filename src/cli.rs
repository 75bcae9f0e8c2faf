//! CLI argument parsing for the `event-transforms` binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "event-transforms")]
#[command(author, version, about = "Preprocess uploaded tables and gather event messages", long_about = None)]
pub struct Cli {
    /// Path to the config file (.json or .toml)
    #[arg(short, long)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Handle one uploaded object in a local bucket tree
    Process {
        /// Directory whose sub-directories are buckets
        #[arg(short, long)]
        root: PathBuf,

        /// Bucket the object was uploaded to
        #[arg(short, long)]
        bucket: String,

        /// Object name inside the bucket
        #[arg(required = true)]
        name: String,

        /// Append failures and alerts to this file
        #[arg(long)]
        dead_letter: Option<PathBuf>,
    },

    /// Reshape one JSON message using `columns_publish`
    Gather {
        /// Message file; reads stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}
