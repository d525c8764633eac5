//! Saved queries
//!
//! A stored query is a versioned JSON envelope around a `QueryDefinition`:
//!
//! ```text
//! {"version": 1, "name": "Monthly revenue", "query": { ...QueryDefinition... }}
//! ```
//!
//! Definitions stored before the envelope existed (a bare `QueryDefinition`
//! object) load as version 1.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::definition::QueryDefinition;
use super::error::QueryError;

/// Model version written by this build
pub const CURRENT_VERSION: u32 = 1;

/// A named, versioned query definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedQuery {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub query: QueryDefinition,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredForm {
    Envelope(SavedQuery),
    Bare(QueryDefinition),
}

impl SavedQuery {
    /// Wrap a definition at the current version
    pub fn new(query: QueryDefinition) -> Self {
        Self {
            version: CURRENT_VERSION,
            name: None,
            query,
        }
    }

    /// Builder method: set a display name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Parse either an envelope or a bare definition
    pub fn from_json(json: &str) -> Result<Self, QueryError> {
        let saved = match serde_json::from_str::<StoredForm>(json) {
            Ok(StoredForm::Envelope(saved)) => saved,
            Ok(StoredForm::Bare(query)) => Self::new(query),
            // Re-parse as an envelope so the error names the offending field
            Err(_) => serde_json::from_str::<SavedQuery>(json)?,
        };

        if saved.version > CURRENT_VERSION {
            return Err(QueryError::UnsupportedVersion {
                found: saved.version,
                supported: CURRENT_VERSION,
            });
        }

        Ok(saved)
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, QueryError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from a file
    pub fn load(path: &Path) -> Result<Self, QueryError> {
        let content = std::fs::read_to_string(path).map_err(|e| QueryError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Write to a file
    pub fn save(&self, path: &Path) -> Result<(), QueryError> {
        std::fs::write(path, self.to_json()?).map_err(|e| QueryError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }
}
