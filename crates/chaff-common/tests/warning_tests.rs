//! Tests for deduplicated warnings.

use chaff_common::warning::{clear_warnings, warn_once};

#[test]
fn test_warn_once_deduplicates_and_clears() {
    assert!(warn_once("TEST", "only once"));
    assert!(!warn_once("TEST", "only once"));
    assert!(warn_once("OTHER", "only once"));

    clear_warnings();
    assert!(warn_once("TEST", "only once"));
}
