//! Bundle-directory reader
//!
//! Legacy input layout: a directory whose name is the repository UUID,
//! containing the files to register. Checksums are computed from the file
//! contents since no manifest carries them.

use std::fs;
use std::path::Path;

use uuid::Uuid;

use crate::error::{ClientError, Result};
use crate::manifest::ManifestEntry;

/// Read a repository-named bundle directory into manifest entries.
///
/// The directory name must parse as a UUID; it becomes the repository id of
/// every entry. Entries are sorted by file name so repeated runs produce the
/// same output manifest.
pub fn read_bundle_directory(
    dir: &Path,
    project_code: &str,
    access: Option<&str>,
) -> Result<Vec<ManifestEntry>> {
    let name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ClientError::InvalidInputDirectory(dir.display().to_string()))?;

    if Uuid::parse_str(name).is_err() {
        return Err(ClientError::InvalidInputDirectory(dir.display().to_string()));
    }

    let mut entries = Vec::new();

    for item in fs::read_dir(dir)? {
        let item = item?;
        if !item.file_type()?.is_file() {
            continue;
        }

        let Some(file_name) = item.file_name().to_str().map(str::to_string) else {
            continue;
        };

        let contents = fs::read(item.path())?;
        let md5 = format!("{:x}", md5::compute(&contents));

        entries.push(ManifestEntry {
            repository_id: name.to_string(),
            project_code: project_code.to_string(),
            file_name,
            md5,
            access: access.map(str::to_string),
            object_id: None,
        });
    }

    entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    tracing::debug!(repository_id = %name, count = entries.len(), "Read bundle directory");

    Ok(entries)
}
