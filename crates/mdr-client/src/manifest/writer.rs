//! Output manifest writer
//!
//! After registration the client writes a manifest mapping each file to its
//! assigned object id, for handoff to the storage upload tooling. The file
//! is named after the repository id shared by the entries.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::manifest::ManifestEntry;

/// Header line of the output manifest.
const OUTPUT_HEADER: &str = "object-id\tfile-path\tmd5-checksum";

/// Write the output manifest into `output_dir`.
///
/// Entries are written in input order. Returns the path of the written file,
/// or `None` when there are no entries.
pub fn write_manifest(output_dir: &Path, entries: &[ManifestEntry]) -> Result<Option<PathBuf>> {
    let Some(first) = entries.first() else {
        return Ok(None);
    };

    fs::create_dir_all(output_dir)?;

    let path = output_dir.join(&first.repository_id);
    let mut file = fs::File::create(&path)?;

    writeln!(file, "{}", OUTPUT_HEADER)?;
    for entry in entries {
        writeln!(
            file,
            "{}\t{}\t{}",
            entry.object_id.as_deref().unwrap_or_default(),
            entry.file_name,
            entry.md5
        )?;
    }

    tracing::info!(path = %path.display(), entries = entries.len(), "Wrote output manifest");

    Ok(Some(path))
}
