//! Registration manifests
//!
//! Input manifests are tab-separated files listing the files to register.
//! After registration the client writes an output manifest mapping each file
//! to its assigned object id, named after the repository id.

pub mod directory;
pub mod reader;
pub mod writer;

pub use directory::read_bundle_directory;
pub use reader::{read_manifest, read_manifest_from_url};
pub use writer::write_manifest;

/// One file to register, as read from a manifest or bundle directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Repository the file belongs to
    pub repository_id: String,
    /// Project code recorded on the entity
    pub project_code: String,
    /// File name; may carry a path, which is stripped before registration
    pub file_name: String,
    /// MD5 checksum of the file contents
    pub md5: String,
    /// Access level, if any
    pub access: Option<String>,
    /// Object id assigned by the registry; set during registration
    pub object_id: Option<String>,
}

impl ManifestEntry {
    /// Base name of the file, with any leading path stripped.
    pub fn base_name(&self) -> &str {
        std::path::Path::new(&self.file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.file_name)
    }
}
