//! Source locations.
//!
//! Stylesheets and pages are configured as paths relative to a root, which
//! may be a directory or a URL prefix. Joining is plain concatenation, so a
//! root of `http://localhost:3000` and a path of `/index.html` yield
//! `http://localhost:3000/index.html`, and an empty root leaves paths as-is.

use std::fs;
use std::io::ErrorKind;

use crate::net::{FetchError, fetch_text};

/// Join a configured root with a stylesheet or page path.
///
/// Absolute URLs are returned unchanged regardless of the root.
#[must_use]
pub fn resolve_location(root: &str, path: &str) -> String {
    if is_remote(path) {
        return path.to_string();
    }
    format!("{root}{path}")
}

/// Does this location name an HTTP(S) resource?
#[must_use]
pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Load the text behind a resolved location.
///
/// `file://` prefixes are stripped and the remainder is read from disk.
///
/// # Errors
///
/// Returns [`FetchError::NotFound`] for missing files, [`FetchError::Io`] for
/// other read failures, and whatever [`fetch_text`] reports for URLs.
pub fn load_text(location: &str) -> Result<String, FetchError> {
    if is_remote(location) {
        return fetch_text(location);
    }

    let path = location.strip_prefix("file://").unwrap_or(location);
    fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            FetchError::NotFound {
                location: location.to_string(),
            }
        } else {
            FetchError::Io {
                location: location.to_string(),
                source,
            }
        }
    })
}
