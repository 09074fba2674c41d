//! HTTP fetch and source-loading errors.
//!
//! Provides a blocking HTTP GET wrapper used to pull remote stylesheets and
//! pages, and the [`FetchError`] type shared by every source loader.

use std::time::Duration;

use thiserror::Error;

/// User-Agent header sent with all requests.
const USER_AGENT: &str = concat!("chaff/", env!("CARGO_PKG_VERSION"));

/// Default request timeout.
const TIMEOUT: Duration = Duration::from_secs(30);

/// Why a stylesheet or page could not be materialized.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A local path does not exist.
    #[error("{location} was not found")]
    NotFound {
        /// Location as it was resolved against the root.
        location: String,
    },
    /// The server answered with a non-success status.
    #[error("retrieving {location} raised an HTTP error: {status}")]
    Http {
        /// Requested URL.
        location: String,
        /// HTTP status code.
        status: u16,
    },
    /// The request could not be sent or its body could not be read.
    #[error("request to {location} failed: {source}")]
    Request {
        /// Requested URL.
        location: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// Reading a local file failed for a reason other than absence.
    #[error("could not read {location}: {source}")]
    Io {
        /// Local path.
        location: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Fetch a URL and return its body as text.
///
/// # Errors
///
/// Returns [`FetchError::Request`] if the client cannot be built, the request
/// fails, or the body cannot be decoded, and [`FetchError::Http`] for a
/// non-success status.
pub fn fetch_text(url: &str) -> Result<String, FetchError> {
    let request_error = |source| FetchError::Request {
        location: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(request_error)?;

    let response = client.get(url).send().map_err(request_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Http {
            location: url.to_string(),
            status: status.as_u16(),
        });
    }

    log::debug!("fetched {url} ({status})");
    response.text().map_err(request_error)
}
