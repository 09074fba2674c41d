//! Deduplicated warnings.
//!
//! Lenient parsers run over thousands of pages and hit the same malformed
//! construct over and over. Each distinct message is forwarded to the `log`
//! facade once per process (or until [`clear_warnings`] is called).

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Global set of warnings we've already emitted.
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about a recoverable problem (logs once per unique message).
///
/// Returns `true` if this call emitted the warning, `false` if the same
/// component/message pair was already reported.
///
/// # Example
/// ```ignore
/// warn_once("CSS", "unterminated block after `.nav`");
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let first_time = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if first_time {
        log::warn!(target: "chaff", "[{component}] {message}");
    }
    first_time
}

/// Forget every recorded warning, so they may be emitted again.
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
