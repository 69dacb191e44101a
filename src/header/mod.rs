//! Catalog header block: the `Key: value` metadata carried by the entry with
//! an empty msgid.
//!
//! [`fields`] holds the ordered key/value store, [`codec`] converts between the
//! raw payload and the store, [`extract`] scans raw text for plural count and
//! charset, and [`stamp`] writes the well-known date entries.

use indexmap::IndexSet;
use once_cell::sync::Lazy;

pub mod codec;
pub mod extract;
pub mod fields;
pub mod stamp;

pub const KEY_PROJECT_ID_VERSION: &str = "Project-Id-Version";
pub const KEY_REPORT_MSGID_BUGS_TO: &str = "Report-Msgid-Bugs-To";
pub const KEY_POT_CREATION_DATE: &str = "POT-Creation-Date";
pub const KEY_PO_REVISION_DATE: &str = "PO-Revision-Date";
pub const KEY_LAST_TRANSLATOR: &str = "Last-Translator";
pub const KEY_LANGUAGE_TEAM: &str = "Language-Team";
pub const KEY_MIME_VERSION: &str = "MIME-Version";
pub const KEY_CONTENT_TYPE: &str = "Content-Type";
pub const KEY_CONTENT_TRANSFER_ENCODING: &str = "Content-Transfer-Encoding";

/// Not a member of [`DEFAULT_KEYS`].
pub const KEY_LANGUAGE: &str = "Language";

/// Well-known header keys, in the order gettext tools emit them.
pub const DEFAULT_KEYS: [&str; 9] = [
    KEY_PROJECT_ID_VERSION,
    KEY_REPORT_MSGID_BUGS_TO,
    KEY_POT_CREATION_DATE,
    KEY_PO_REVISION_DATE,
    KEY_LAST_TRANSLATOR,
    KEY_LANGUAGE_TEAM,
    KEY_MIME_VERSION,
    KEY_CONTENT_TYPE,
    KEY_CONTENT_TRANSFER_ENCODING,
];

static DEFAULT_KEY_SET: Lazy<IndexSet<&'static str>> =
    Lazy::new(|| DEFAULT_KEYS.iter().copied().collect());

/// Read-only, process-wide view of [`DEFAULT_KEYS`].
pub fn default_keys() -> &'static IndexSet<&'static str> {
    &DEFAULT_KEY_SET
}

/// Check whether `key` is one of the well-known header keys (case-sensitive).
pub fn is_default_key(key: &str) -> bool {
    DEFAULT_KEY_SET.contains(key)
}
