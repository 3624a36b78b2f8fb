//! MDR Client - Main entry point

use clap::Parser;
use mdr_client::commands::register::RegisterArgs;
use mdr_client::retry::RetryPolicy;
use mdr_client::{Cli, Commands};
use mdr_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // Pick up MDR_* variables from a local .env if present
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize logging based on verbose flag and environment
    let log_config = if cli.verbose {
        LogConfig::builder()
            .level(LogLevel::Debug)
            .output(LogOutput::Console)
            .log_file_prefix("mdr".to_string())
            .build()
    } else {
        LogConfig::builder()
            .level(LogLevel::Warn)
            .output(LogOutput::Console)
            .log_file_prefix("mdr".to_string())
            .build()
    };

    // Merge with environment variables (they take precedence)
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    // Initialize logging (ignore errors as the CLI should work without logging)
    let _ = init_logging(&log_config);

    // Execute command
    let result = execute_command(&cli).await;

    // Handle result
    if let Err(e) = result {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> mdr_client::Result<()> {
    match &cli.command {
        Commands::Register {
            manifest,
            input_dir,
            output_dir,
            project_code,
            access_level,
            max_retries,
            initial_backoff_ms,
            backoff_multiplier,
        } => {
            let args = RegisterArgs {
                manifest: manifest.clone(),
                input_dir: input_dir.clone(),
                output_dir: output_dir.clone(),
                project_code: project_code.clone(),
                access_level: access_level.clone(),
                policy: RetryPolicy::new(*max_retries, *initial_backoff_ms, *backoff_multiplier),
            };

            mdr_client::commands::register::run(&cli.server_url, args).await
        },
        Commands::Status => mdr_client::commands::status::run(&cli.server_url).await,
    }
}
