//! Scanners for header values that need interpretation.
//!
//! Both work on raw text, so they accept a single value or the whole header
//! payload. A match must be closed by a backslash, a semicolon or a newline:
//! plural specifications appear either `;`-terminated inline or continued with
//! a trailing backslash.

use once_cell::sync::Lazy;
use regex::Regex;

static PLURAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)nplurals\s*=\s*([0-9]+)[\\;\n]").expect("valid regex"));

static CHARSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)content-type\s*:.*?charset\s*=\s*(.*?)[\\;\n]").expect("valid regex")
});

/// First `nplurals=<digits>` count in `text`.
pub fn extract_plural_count(text: &str) -> Option<&str> {
    PLURAL_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// First charset named by a `Content-Type:` line in `text`. The name is not
/// checked against known charsets.
pub fn extract_charset(text: &str) -> Option<&str> {
    CHARSET_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
