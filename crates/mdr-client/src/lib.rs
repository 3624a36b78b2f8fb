//! MDR Client Library
//!
//! Command-line client for the metadata registry:
//!
//! - **File Registration**: Register manifest entries with the registry
//!   server and write back the assigned object ids (`mdr register`)
//! - **Server Status**: Check registry connectivity (`mdr status`)
//!
//! Registration is resilient by construction: transient server faults are
//! retried with exponential backoff, and re-running a partially completed
//! registration converges on the same object ids.

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod api;
pub mod commands;
pub mod error;
pub mod manifest;
pub mod progress;
pub mod registration;
pub mod retry;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use manifest::ManifestEntry;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::retry::{DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_INITIAL_BACKOFF_MS, DEFAULT_MAX_RETRIES};

/// MDR - Metadata Registry Client
#[derive(Parser, Debug)]
#[command(name = "mdr")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Server URL
    #[arg(long, env = "MDR_SERVER_URL", default_value = "http://localhost:8000", global = true)]
    pub server_url: String,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register files from a manifest with the registry
    Register {
        /// Path or URL of a tab-separated registration manifest
        #[arg(short, long, conflicts_with = "input_dir")]
        manifest: Option<String>,

        /// Read entries from a repository-named directory instead of a
        /// manifest file
        #[arg(short, long)]
        input_dir: Option<PathBuf>,

        /// Directory for the output manifest
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Project code for directory mode (manifests carry their own)
        #[arg(short, long)]
        project_code: Option<String>,

        /// Access level recorded on every registered entity
        #[arg(short, long)]
        access_level: Option<String>,

        /// Maximum number of retries after a failed attempt
        #[arg(long, env = "MDR_MAX_RETRIES", default_value_t = DEFAULT_MAX_RETRIES)]
        max_retries: u32,

        /// Initial backoff between retries, in milliseconds
        #[arg(long, env = "MDR_INITIAL_BACKOFF_MS", default_value_t = DEFAULT_INITIAL_BACKOFF_MS)]
        initial_backoff_ms: u64,

        /// Multiplier applied to the backoff after each retry
        #[arg(long, env = "MDR_BACKOFF_MULTIPLIER", default_value_t = DEFAULT_BACKOFF_MULTIPLIER)]
        backoff_multiplier: f64,
    },

    /// Check registry server status
    Status,
}
