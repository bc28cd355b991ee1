//! Parser and tree warnings with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the lexer, the tree constructor, and the CLI to report recovered
//! parse errors and refused tree mutations.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Report a recoverable problem (prints once per unique message)
///
/// Returns `true` if the message was printed, `false` if it had already
/// been reported since the last [`clear_warnings`].
///
/// # Example
/// ```ignore
/// warn_once("Lexer", "duplicate attribute 'class' dropped");
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let should_print = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_print {
        eprintln!(
            "{}",
            format!("[arbor {component}] ⚠ {message}").yellow()
        );
    }
    should_print
}

/// Clear all recorded warnings (call before parsing an unrelated document)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_warning_is_printed_once() {
        let message = "repeated_warning_is_printed_once";
        let _ = warn_once("Test", message);
        assert!(!warn_once("Test", message));
    }

    #[test]
    fn same_message_from_other_component_is_distinct() {
        let message = "same_message_from_other_component_is_distinct";
        let _ = warn_once("First", message);
        assert!(warn_once("Second", message));
    }
}
