//! Term slug derivation.
//!
//! A slug is the URL-safe identifier of a term. It doubles as the file stem of
//! the term's listing page, so it must never contain path separators or dots.
//!
//! ```text
//! "Some Term!"        -> "some-term"
//! "  Multi   Space  " -> "multi-space"
//! "---x---"           -> "x"
//! ```

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static RE_NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\-]+").unwrap());
static RE_DASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").unwrap());

/// Convert arbitrary term text into a URL-safe slug.
///
/// Lower-cases, trims, turns whitespace runs into `-`, drops everything that
/// is not an ASCII word character or `-`, then collapses and trims dashes.
/// The result may be empty; callers decide what an empty slug means.
///
/// Idempotent: `slugify(&slugify(s)) == slugify(s)`.
pub fn slugify(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let lowered = text.to_lowercase();
    let dashed = RE_WHITESPACE.replace_all(lowered.trim(), "-");
    let stripped = RE_NON_WORD.replace_all(&dashed, "");
    let collapsed = RE_DASHES.replace_all(&stripped, "-");

    collapsed.trim_matches('-').to_string()
}

/// Slugify an optional JSON value.
///
/// `null` and absent values yield `""`; strings are slugified as-is; other
/// values go through their JSON text (`42` -> `"42"`).
pub fn slugify_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => slugify(s),
        Some(other) => slugify(&other.to_string()),
    }
}
