//! Common utilities for chaff.
//!
//! This crate provides shared infrastructure used by all chaff components:
//! - **Warning System** - deduplicated diagnostics routed through `log`
//! - **Network** - blocking text fetch for remote stylesheets and pages
//! - **Locations** - joining configured roots with paths, loading local or remote text

pub mod location;
pub mod net;
pub mod warning;

pub use location::{is_remote, load_text, resolve_location};
pub use net::FetchError;
