//! Where stylesheets and pages come from.

use chaff_common::{FetchError, load_text, resolve_location};
use serde::{Deserialize, Serialize};

/// A page to audit.
///
/// In JSON a plain string is a location, `{ "html": "..." }` is inline markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageSource {
    /// A path or URL, resolved against the configured root.
    Location(String),
    /// Markup supplied directly.
    Inline {
        /// The page text.
        html: String,
    },
}

impl PageSource {
    /// Short name for progress output.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Location(location) => location,
            Self::Inline { .. } => "<inline html>",
        }
    }

    /// The page text, loading it if necessary.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if a location cannot be read or fetched.
    pub fn materialize(&self, root: &str) -> Result<String, FetchError> {
        match self {
            Self::Location(path) => load_text(&resolve_location(root, path)),
            Self::Inline { html } => Ok(html.clone()),
        }
    }
}

impl From<&str> for PageSource {
    fn from(location: &str) -> Self {
        Self::Location(location.to_string())
    }
}

impl From<String> for PageSource {
    fn from(location: String) -> Self {
        Self::Location(location)
    }
}

/// Load one stylesheet, resolving `path` against `root`.
///
/// # Errors
///
/// Returns a [`FetchError`] if the stylesheet cannot be read or fetched.
pub fn load_stylesheet(root: &str, path: &str) -> Result<String, FetchError> {
    let location = resolve_location(root, path);
    log::debug!(target: "chaff", "loading stylesheet {location}");
    load_text(&location)
}
