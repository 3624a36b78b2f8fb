//! `mdr register` command implementation
//!
//! Reads entries from a manifest (local file or URL) or a repository-named
//! bundle directory, registers them with the server, and writes the output
//! manifest mapping files to their object ids.

use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::api::ApiClient;
use crate::error::{ClientError, Result};
use crate::manifest::{
    read_bundle_directory, read_manifest, read_manifest_from_url, write_manifest, ManifestEntry,
};
use crate::registration::RegistrationClient;
use crate::retry::RetryPolicy;

/// Input arguments for a registration run
pub struct RegisterArgs {
    /// Manifest path or HTTP(S) URL
    pub manifest: Option<String>,
    pub input_dir: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub project_code: Option<String>,
    pub access_level: Option<String>,
    pub policy: RetryPolicy,
}

/// Register files from a manifest or bundle directory
pub async fn run(server_url: &str, args: RegisterArgs) -> Result<()> {
    let mut entries = read_entries(&args).await?;

    if entries.is_empty() {
        println!("No entries to register.");
        return Ok(());
    }

    println!(
        "Registering {} file(s) with {}",
        entries.len(),
        server_url.cyan()
    );

    let transport = ApiClient::new(server_url.to_string())?;
    let client = RegistrationClient::new(transport, args.policy);

    client.register_all(&mut entries).await?;

    if let Some(path) = write_manifest(&args.output_dir, &entries)? {
        println!();
        println!("{} {}", "Output manifest:".cyan().bold(), path.display());
    }

    Ok(())
}

async fn read_entries(args: &RegisterArgs) -> Result<Vec<ManifestEntry>> {
    match (&args.manifest, &args.input_dir) {
        (Some(manifest), None) => {
            if manifest.starts_with("http://") || manifest.starts_with("https://") {
                read_manifest_from_url(manifest).await
            } else {
                read_manifest(Path::new(manifest))
            }
        },
        (None, Some(dir)) => {
            let project_code = args.project_code.as_deref().ok_or_else(|| {
                ClientError::config("--project-code is required with --input-dir")
            })?;
            read_bundle_directory(dir, project_code, args.access_level.as_deref())
        },
        _ => Err(ClientError::config(
            "exactly one of --manifest or --input-dir must be given",
        )),
    }
}
