//! Lazy, forward-only PO reader.
//!
//! Text is consumed line by line. An entry ends at a blank line, or at the
//! first comment or `msgctxt`/`msgid` keyword following its `msgstr`, so
//! entries that are not separated by blank lines are still split correctly.
//! The first malformed line ends the stream with a [`CatalogError`].

use std::iter::{Enumerate, Peekable};
use std::str::Lines;

use crate::catalog::{CatalogEntry, CatalogError, Message};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Ctxt,
    Id,
    IdPlural,
    Str,
    StrPlural(usize),
}

impl Field {
    fn from_keyword(keyword: &str) -> Option<Field> {
        match keyword {
            "msgctxt" => Some(Field::Ctxt),
            "msgid" => Some(Field::Id),
            "msgid_plural" => Some(Field::IdPlural),
            "msgstr" => Some(Field::Str),
            _ => keyword
                .strip_prefix("msgstr[")
                .and_then(|n| n.strip_suffix(']'))
                .and_then(|n| n.parse::<usize>().ok())
                .map(Field::StrPlural),
        }
    }

    fn keyword(self) -> String {
        match self {
            Field::Ctxt => "msgctxt".to_string(),
            Field::Id => "msgid".to_string(),
            Field::IdPlural => "msgid_plural".to_string(),
            Field::Str => "msgstr".to_string(),
            Field::StrPlural(n) => format!("msgstr[{n}]"),
        }
    }

    fn slot(self, msg: &mut Message) -> &mut String {
        match self {
            Field::Ctxt => msg.msgctxt.get_or_insert_with(String::new),
            Field::Id => &mut msg.msgid,
            Field::IdPlural => msg.msgid_plural.get_or_insert_with(String::new),
            Field::Str => &mut msg.msgstr,
            // read_keyword_line only lets through n <= len
            Field::StrPlural(n) => {
                if msg.msgstr_plural.len() == n {
                    msg.msgstr_plural.push(String::new());
                }
                &mut msg.msgstr_plural[n]
            }
        }
    }
}

/// Per-entry parsing state
#[derive(Default)]
struct EntryState {
    current: Option<Field>,
    seen: Vec<Field>,
    has_msgid: bool,
    has_msgstr: bool,
    has_content: bool,
}

pub struct MessageReader<'a> {
    lines: Peekable<Enumerate<Lines<'a>>>,
    failed: bool,
}

impl<'a> MessageReader<'a> {
    pub fn new(text: &'a str) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        Self {
            lines: text.lines().enumerate().peekable(),
            failed: false,
        }
    }

    fn next_message(&mut self) -> Result<Option<Message>, CatalogError> {
        let mut msg = Message::default();
        let mut state = EntryState::default();

        while let Some(&(idx, raw)) = self.lines.peek() {
            let line_no = idx + 1;
            // Comments keep trailing whitespace, keyword lines are trimmed later.
            let line = raw.trim_start();

            if line.trim_end().is_empty() {
                self.lines.next();
                if state.has_msgid {
                    break;
                }
                continue;
            }

            let (obsolete, body) = match line.strip_prefix("#~") {
                Some(rest) => (true, rest.trim_start()),
                None => (false, line),
            };

            if state.has_msgstr && starts_entry(obsolete, body) {
                break;
            }
            self.lines.next();
            state.has_content = true;

            if obsolete {
                msg.obsolete = true;
                if let Some(prev) = body.strip_prefix('|') {
                    msg.previous.push(prev.to_string());
                    continue;
                }
            } else if body.starts_with('#') {
                read_comment(&mut msg, body);
                continue;
            }

            read_keyword_line(&mut msg, &mut state, body.trim_end(), line_no)?;
        }

        if state.has_msgid {
            return Ok(Some(msg));
        }
        if state.has_content {
            tracing::debug!("dropping trailing comments with no entry");
        }
        Ok(None)
    }
}

impl Iterator for MessageReader<'_> {
    type Item = Result<Message, CatalogError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_message() {
            Ok(Some(msg)) => Some(Ok(msg)),
            Ok(None) => None,
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

fn starts_entry(obsolete: bool, body: &str) -> bool {
    (!obsolete && body.starts_with('#'))
        || (obsolete && body.starts_with('|'))
        || body.starts_with("msgctxt")
        || (body.starts_with("msgid") && !body.starts_with("msgid_plural"))
}

fn read_comment(msg: &mut Message, line: &str) {
    if let Some(flags) = line.strip_prefix("#,") {
        let flags: Vec<String> = flags
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
        if flags.iter().any(|f| f == "fuzzy") {
            msg.set_needs_review(true);
        }
        msg.flag_lines.push(flags);
    } else if let Some(text) = line.strip_prefix("#.") {
        msg.extracted_comments.push(text.to_string());
    } else if let Some(text) = line.strip_prefix("#:") {
        msg.references.push(text.to_string());
    } else if let Some(text) = line.strip_prefix("#|") {
        msg.previous.push(text.to_string());
    } else if let Some(text) = line.strip_prefix('#') {
        msg.comments.push(text.to_string());
    }
}

fn read_keyword_line(
    msg: &mut Message,
    state: &mut EntryState,
    body: &str,
    line_no: usize,
) -> Result<(), CatalogError> {
    if body.starts_with('"') {
        let field = state
            .current
            .ok_or(CatalogError::DanglingContinuation { line: line_no })?;
        let text = unquote(body, line_no)?;
        field.slot(msg).push_str(&text);
        return Ok(());
    }

    let unexpected = || CatalogError::UnexpectedLine {
        line: line_no,
        content: body.to_string(),
    };
    let (keyword, rest) = body.split_once(char::is_whitespace).ok_or_else(unexpected)?;
    let field = Field::from_keyword(keyword).ok_or_else(unexpected)?;

    if state.seen.contains(&field) {
        return Err(CatalogError::DuplicateKeyword {
            line: line_no,
            keyword: field.keyword(),
        });
    }

    match field {
        Field::Id => state.has_msgid = true,
        Field::Str | Field::StrPlural(_) => {
            if !state.has_msgid {
                return Err(CatalogError::MissingMsgid { line: line_no });
            }
            if let Field::StrPlural(index) = field {
                let expected = msg.msgstr_plural.len();
                if index != expected {
                    return Err(CatalogError::PluralIndex {
                        line: line_no,
                        index,
                        expected,
                    });
                }
            }
            state.has_msgstr = true;
        }
        Field::Ctxt | Field::IdPlural => {}
    }

    let text = unquote(rest.trim(), line_no)?;
    *field.slot(msg) = text;
    state.seen.push(field);
    state.current = Some(field);
    Ok(())
}

/// Strip the surrounding quotes of a PO string literal and resolve escapes.
fn unquote(literal: &str, line_no: usize) -> Result<String, CatalogError> {
    let malformed = || CatalogError::MalformedString {
        line: line_no,
        content: literal.to_string(),
    };

    let inner = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(malformed)?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next().ok_or_else(malformed)? {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                'a' => out.push('\u{07}'),
                'b' => out.push('\u{08}'),
                'f' => out.push('\u{0c}'),
                'v' => out.push('\u{0b}'),
                '"' => out.push('"'),
                '\\' => out.push('\\'),
                other => {
                    out.push('\\');
                    out.push(other);
                }
            },
            '"' => return Err(malformed()),
            c => out.push(c),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(text: &str) -> Vec<Message> {
        MessageReader::new(text)
            .collect::<Result<Vec<_>, _>>()
            .expect("catalog should parse")
    }

    #[test]
    fn reads_header_and_entries() {
        let text = r#"# Translation of demo.
msgid ""
msgstr ""
"Project-Id-Version: demo 1.0\n"
"Content-Type: text/plain; charset=UTF-8\n"

#: src/main.c:10
#, c-format
msgid "Hello %s"
msgstr "Hallo %s"
"#;
        let messages = read_all(text);
        assert_eq!(messages.len(), 2);

        let header = &messages[0];
        assert!(header.is_header());
        assert_eq!(header.comments, vec![" Translation of demo."]);
        assert_eq!(
            header.text(),
            "Project-Id-Version: demo 1.0\nContent-Type: text/plain; charset=UTF-8\n"
        );

        let hello = &messages[1];
        assert_eq!(hello.msgid, "Hello %s");
        assert_eq!(hello.msgstr, "Hallo %s");
        assert_eq!(hello.references, vec![" src/main.c:10"]);
        assert_eq!(hello.flags().collect::<Vec<_>>(), vec!["c-format"]);
    }

    #[test]
    fn fuzzy_flag_is_lifted() {
        let messages = read_all("#, fuzzy, no-c-format\nmsgid \"a\"\nmsgstr \"b\"\n");
        assert!(messages[0].needs_review());
        assert_eq!(messages[0].flags().collect::<Vec<_>>(), vec!["no-c-format"]);
    }

    #[test]
    fn repeated_flag_lines_stay_separate() {
        let msg = &read_all("#, fuzzy\n#, no-c-format\nmsgid \"a\"\nmsgstr \"b\"\n")[0];
        assert!(msg.needs_review());
        assert_eq!(msg.flag_lines, vec![vec!["fuzzy"], vec!["no-c-format"]]);
    }

    #[test]
    fn comment_keeps_trailing_whitespace() {
        let msg = &read_all("# c  \n#. note \nmsgid \"a\"   \nmsgstr \"b\"\t\n")[0];
        assert_eq!(msg.comments, vec![" c  "]);
        assert_eq!(msg.extracted_comments, vec![" note "]);
        assert_eq!(msg.msgid, "a");
        assert_eq!(msg.msgstr, "b");
    }

    fn plural_error(forms: &str) -> CatalogError {
        let text = format!("msgid \"a\"\nmsgid_plural \"b\"\n{forms}");
        MessageReader::new(&text).next().unwrap().unwrap_err()
    }

    #[test]
    fn plural_index_out_of_sequence() {
        for (forms, index, expected) in [
            ("msgstr[18446744073709551615] \"x\"\n", usize::MAX, 0),
            ("msgstr[4000000000] \"x\"\n", 4_000_000_000, 0),
            ("msgstr[1] \"x\"\nmsgstr[0] \"y\"\n", 1, 0),
            ("msgstr[0] \"x\"\nmsgstr[2] \"y\"\n", 2, 1),
        ] {
            match plural_error(forms) {
                CatalogError::PluralIndex { index: i, expected: e, .. } => {
                    assert_eq!((i, e), (index, expected), "{forms}");
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn plural_index_overflowing_usize() {
        let err = MessageReader::new(
            "msgid \"a\"\nmsgid_plural \"b\"\nmsgstr[99999999999999999999999] \"x\"\n",
        )
        .next()
        .unwrap()
        .unwrap_err();
        assert!(matches!(err, CatalogError::UnexpectedLine { line: 3, .. }));
    }

    #[test]
    fn entries_without_blank_separator() {
        let messages = read_all("msgid \"a\"\nmsgstr \"1\"\n#. note\nmsgid \"b\"\nmsgstr \"2\"\nmsgid \"c\"\nmsgstr \"3\"\n");
        let ids: Vec<&str> = messages.iter().map(|m| m.msgid.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(messages[1].extracted_comments, vec![" note"]);
    }

    #[test]
    fn plural_and_context() {
        let text = "msgctxt \"menu\"\nmsgid \"file\"\nmsgid_plural \"files\"\nmsgstr[0] \"Datei\"\nmsgstr[1] \"Dateien\"\n";
        let msg = &read_all(text)[0];
        assert_eq!(msg.msgctxt.as_deref(), Some("menu"));
        assert_eq!(msg.msgid_plural.as_deref(), Some("files"));
        assert_eq!(msg.msgstr_plural, vec!["Datei", "Dateien"]);
        assert!(!msg.is_header());
    }

    #[test]
    fn obsolete_entry() {
        let msg = &read_all("#~ msgid \"old\"\n#~ msgstr \"\"\n#~ \"alt\"\n")[0];
        assert!(msg.obsolete);
        assert_eq!(msg.msgid, "old");
        assert_eq!(msg.msgstr, "alt");
    }

    #[test]
    fn escapes_are_resolved() {
        let msg = &read_all(r#"msgid "tab\there \"q\" back\\slash\n"
msgstr ""
"#)[0];
        assert_eq!(msg.msgid, "tab\there \"q\" back\\slash\n");
    }

    #[test]
    fn crlf_and_bom() {
        let messages = read_all("\u{feff}msgid \"\"\r\nmsgstr \"A: 1\\n\"\r\n");
        assert_eq!(messages[0].text(), "A: 1\n");
    }

    #[test]
    fn malformed_line_stops_stream() {
        let mut reader = MessageReader::new("msgid \"a\"\nmsgstr \"b\"\n\nbogus line\n");
        assert!(reader.next().unwrap().is_ok());
        match reader.next() {
            Some(Err(CatalogError::UnexpectedLine { line, .. })) => assert_eq!(line, 4),
            other => panic!("unexpected {other:?}"),
        }
        assert!(reader.next().is_none());
    }

    #[test]
    fn unterminated_string() {
        let err = MessageReader::new("msgid \"abc\nmsgstr \"\"\n")
            .next()
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, CatalogError::MalformedString { line: 1, .. }));
    }

    #[test]
    fn msgstr_before_msgid() {
        let err = MessageReader::new("msgstr \"x\"\n").next().unwrap().unwrap_err();
        assert!(matches!(err, CatalogError::MissingMsgid { line: 1 }));
    }

    #[test]
    fn duplicate_keyword() {
        let err = MessageReader::new("msgid \"a\"\nmsgid_plural \"b\"\nmsgid_plural \"c\"\n")
            .next()
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateKeyword { line: 3, .. }));
    }

    #[test]
    fn trailing_comments_are_dropped() {
        let messages = read_all("msgid \"a\"\nmsgstr \"b\"\n\n# dangling\n");
        assert_eq!(messages.len(), 1);
    }
}
