//! Error types for the MDR client
//!
//! Errors are user-facing with clear messages and, where possible, a hint at
//! how to fix the problem.

use thiserror::Error;

use crate::retry::Fault;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Comprehensive error type for client operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// API server returned an unexpected response
    #[error("Server error: {0}. Ensure the MDR server is running (check with 'mdr status') and accessible.")]
    Api(String),

    /// Registration manifest has invalid format or content
    #[error("Malformed manifest at line {line}: {reason}. Expected 5 tab-separated columns: repository_id, project_code, file_name, md5, access.")]
    MalformedManifest { line: usize, reason: String },

    /// Input directory does not follow the expected layout
    #[error("Invalid input directory '{0}'. The directory name must be the repository UUID and the directory must contain the files to register.")]
    InvalidInputDirectory(String),

    /// All retry attempts were used up without a successful response
    #[error("Registration failed after {attempts} attempts: {last}. The server may be overloaded; try again later.")]
    RetriesExhausted { attempts: u32, last: Fault },

    /// Server rejected the request for a non-retryable reason
    #[error("Registration rejected: {0}")]
    Rejected(String),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your environment variables or command-line flags.")]
    Config(String),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("Network request failed: {0}. Check your internet connection and server URL.")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}. The server may be running an incompatible version.")]
    JsonParse(#[from] serde_json::Error),

    /// Generic anyhow error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ClientError {
    /// Create an API error
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    /// Create a malformed manifest error
    pub fn malformed_manifest(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedManifest {
            line,
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a rejection error
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }
}
