//! Audit configuration.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::RegexSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::normalize::PseudoPolicy;
use crate::source::PageSource;
use crate::tree::ImplicationPolicy;

/// Errors from loading or validating an [`AuditConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("could not read config {}: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The config file is not valid JSON for this schema.
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
    /// An ignore pattern is not a valid regular expression.
    #[error("invalid ignore pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Everything a run needs. Every field has a default, so a config file only
/// lists what it changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Prefix joined to every stylesheet and page location.
    pub root: String,
    /// Stylesheet locations, ingested in order.
    pub stylesheets: Vec<String>,
    /// Pages, processed in order.
    pub pages: Vec<PageSource>,
    /// Extra CSS ingested after the stylesheets.
    pub rules: String,
    /// Regular expressions for selectors to leave out entirely.
    pub ignore: Vec<String>,
    /// Pseudo-class and pseudo-element stripping.
    pub pseudo: PseudoPolicy,
    /// Word characters for the implication boundary.
    pub implication: ImplicationPolicy,
}

impl AuditConfig {
    /// Load a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Json`] if it does not parse.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Parse a JSON config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if `text` does not parse.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Compile the ignore patterns.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Pattern`] for an invalid expression.
    pub fn ignore_set(&self) -> Result<RegexSet, ConfigError> {
        Ok(RegexSet::new(&self.ignore)?)
    }
}
