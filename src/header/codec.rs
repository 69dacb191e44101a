//! Conversion between a header payload and [`HeaderFields`].
//!
//! The payload is zero or more lines of the form `Key: value`. Decoding is
//! tolerant: blank lines and lines without a colon are dropped and reported
//! as [`Diagnostic`]s, the rest of the payload is still decoded.

use std::fmt;

use crate::catalog::{CatalogEntry, Message};
use crate::header::fields::HeaderFields;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Empty or whitespace-only line
    BlankLine,
    /// No `:` between key and value
    MissingSeparator,
}

/// A header line that was ignored during [`decode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based line number within the payload
    pub line: usize,
    pub kind: DiagnosticKind,
    pub text: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DiagnosticKind::BlankLine => {
                write!(f, "line {}: malformed header entry, ignored (empty line)", self.line)
            }
            DiagnosticKind::MissingSeparator => write!(
                f,
                "line {}: malformed header entry, ignored (not a key: value pair: {:?})",
                self.line, self.text
            ),
        }
    }
}

/// Decode a header payload.
///
/// Each line is split on its first colon; key and value are trimmed. A key
/// seen twice keeps its first position and its last value.
pub fn decode(payload: &str) -> (HeaderFields, Vec<Diagnostic>) {
    let mut fields = HeaderFields::new();
    let mut diagnostics = Vec::new();

    if payload.is_empty() {
        return (fields, diagnostics);
    }

    // The newline ending the last line does not open a new one.
    let body = payload.strip_suffix('\n').unwrap_or(payload);

    for (idx, line) in body.split('\n').enumerate() {
        let kind = if line.trim().is_empty() {
            DiagnosticKind::BlankLine
        } else if let Some((key, value)) = line.split_once(':') {
            fields.set(key.trim(), value.trim());
            continue;
        } else {
            DiagnosticKind::MissingSeparator
        };

        let diagnostic = Diagnostic {
            line: idx + 1,
            kind,
            text: line.to_string(),
        };
        tracing::debug!(%diagnostic, "skipping header line");
        diagnostics.push(diagnostic);
    }

    (fields, diagnostics)
}

/// Decode the text of a catalog entry. The caller is responsible for passing
/// the header entry.
pub fn decode_entry<E: CatalogEntry + ?Sized>(entry: &E) -> (HeaderFields, Vec<Diagnostic>) {
    decode(entry.text())
}

/// Encode the store as `Key: value\n` lines, skipping keys with no value.
pub fn encode(fields: &HeaderFields) -> String {
    let mut payload = String::new();
    for (key, value) in fields.iter() {
        payload.push_str(key);
        payload.push_str(": ");
        payload.push_str(value);
        payload.push('\n');
    }
    payload
}

/// Overwrite the text of `entry` with the encoded store.
pub fn encode_into<E: CatalogEntry + ?Sized>(fields: &HeaderFields, entry: &mut E) {
    entry.set_text(encode(fields));
}

/// Build a new header entry (empty msgid) flagged for review and holding the
/// encoded store.
pub fn fresh_header(fields: &HeaderFields) -> Message {
    let mut header = Message::new("");
    header.set_needs_review(true);
    encode_into(fields, &mut header);
    header
}
