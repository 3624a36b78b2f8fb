//! `mdr status` command implementation
//!
//! Checks registry server connectivity.

use colored::Colorize;

use crate::api::ApiClient;
use crate::error::{ClientError, Result};
use crate::progress::create_spinner;

/// Check registry server status
pub async fn run(server_url: &str) -> Result<()> {
    let client = ApiClient::new(server_url.to_string())?;

    let spinner = create_spinner("Contacting registry server...");
    let healthy = client.health_check().await?;
    spinner.finish_and_clear();

    if healthy {
        println!("{} {}", "Server is healthy:".green().bold(), server_url);
        Ok(())
    } else {
        Err(ClientError::api(format!("server at {} is not responding", server_url)))
    }
}
