//! Query error types
//!
//! The construction rules themselves never fail; these errors cover loading
//! and storing saved query definitions.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing saved queries
#[derive(Error, Debug)]
pub enum QueryError {
    /// JSON did not describe a query definition
    #[error("Invalid saved query: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Saved with a newer model version than this build understands
    #[error("Unsupported saved query version {found} (supported up to {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Reading or writing the file failed
    #[error("Failed to access {path:?}: {error}")]
    Io { path: PathBuf, error: String },
}
