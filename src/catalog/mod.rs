//! Minimal PO catalog model: one [`Message`] per entry, read lazily by
//! [`reader::MessageReader`] and written back by [`writer::PoWriter`].
//!
//! Only what is needed to locate, rewrite and re-emit the header entry is
//! modelled. Comments, flags and plural forms are carried through untouched.

pub mod reader;
pub mod writer;

use std::io;

use thiserror::Error;

/// Text and review state of a catalog entry, as seen by the header codec.
pub trait CatalogEntry {
    fn text(&self) -> &str;
    fn set_text(&mut self, text: String);
    fn needs_review(&self) -> bool;
    fn set_needs_review(&mut self, needs_review: bool);
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("line {line}: unexpected content {content:?}")]
    UnexpectedLine { line: usize, content: String },

    #[error("line {line}: malformed string literal {content:?}")]
    MalformedString { line: usize, content: String },

    #[error("line {line}: string continuation without a keyword")]
    DanglingContinuation { line: usize },

    #[error("line {line}: {keyword} appears twice in one entry")]
    DuplicateKeyword { line: usize, keyword: String },

    #[error("line {line}: entry has no msgid")]
    MissingMsgid { line: usize },

    #[error("line {line}: msgstr[{index}] out of sequence, expected msgstr[{expected}]")]
    PluralIndex {
        line: usize,
        index: usize,
        expected: usize,
    },

    #[error("failed to write catalog: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub msgctxt: Option<String>,
    pub msgid: String,
    pub msgid_plural: Option<String>,
    pub msgstr: String,
    /// `msgstr[n]` forms, indexed by n
    pub msgstr_plural: Vec<String>,

    /// `# ` translator comments
    pub comments: Vec<String>,
    /// `#.` comments
    pub extracted_comments: Vec<String>,
    /// `#:` source references, one line each
    pub references: Vec<String>,
    /// `#,` lines, one token list per line as read. gettext tools do not
    /// merge repeated flag lines, so neither does the writer.
    pub flag_lines: Vec<Vec<String>>,
    /// `#|` previous-msgid lines, kept raw
    pub previous: Vec<String>,

    pub obsolete: bool,
    fuzzy: bool,
}

impl Message {
    pub fn new(msgid: &str) -> Self {
        Self {
            msgid: msgid.to_string(),
            ..Self::default()
        }
    }

    /// The header is the live entry with an empty msgid and no context.
    pub fn is_header(&self) -> bool {
        self.msgid.is_empty() && self.msgctxt.is_none() && !self.obsolete
    }

    pub fn is_plural(&self) -> bool {
        self.msgid_plural.is_some()
    }

    /// Fuzzy flag as stored, regardless of whether a translation exists.
    pub fn fuzzy_flag(&self) -> bool {
        self.fuzzy
    }

    /// Flags other than `fuzzy`, across all `#,` lines.
    pub fn flags(&self) -> impl Iterator<Item = &str> {
        self.flag_lines
            .iter()
            .flatten()
            .map(String::as_str)
            .filter(|f| *f != "fuzzy")
    }

    /// Append a flag to the last `#,` line, opening one if needed.
    pub fn add_flag(&mut self, flag: &str) {
        match self.flag_lines.last_mut() {
            Some(line) => line.push(flag.to_string()),
            None => self.flag_lines.push(vec![flag.to_string()]),
        }
    }

    pub fn has_translation(&self) -> bool {
        !self.msgstr.is_empty() || self.msgstr_plural.iter().any(|s| !s.is_empty())
    }
}

impl CatalogEntry for Message {
    fn text(&self) -> &str {
        &self.msgstr
    }

    fn set_text(&mut self, text: String) {
        self.msgstr = text;
    }

    /// An untranslated entry is never reported as fuzzy.
    fn needs_review(&self) -> bool {
        self.fuzzy && self.has_translation()
    }

    fn set_needs_review(&mut self, needs_review: bool) {
        self.fuzzy = needs_review;
    }
}
