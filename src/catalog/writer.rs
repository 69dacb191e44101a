//! PO serialization, one [`Message`] at a time.

use std::io::{self, Write};

use crate::catalog::Message;

/// Writes messages to a stream, separating consecutive entries with a blank line.
#[derive(Debug, Default)]
pub struct PoWriter {
    written: usize,
}

impl PoWriter {
    pub fn new() -> Self {
        Self { written: 0 }
    }

    pub fn write<W: Write + ?Sized>(&mut self, msg: &Message, out: &mut W) -> io::Result<()> {
        if self.written > 0 {
            out.write_all(b"\n")?;
        }
        out.write_all(render(msg).as_bytes())?;
        self.written += 1;
        Ok(())
    }
}

/// Render a single entry, comments first, in the order gettext tools emit them.
pub fn render(msg: &Message) -> String {
    let mut out = String::new();

    // #<comment>
    // #.<extracted>
    // #:<reference>
    // #, fuzzy, <flags>   (one line per stored line)
    // #|<previous>
    for c in &msg.comments {
        out.push_str(&format!("#{c}\n"));
    }
    for c in &msg.extracted_comments {
        out.push_str(&format!("#.{c}\n"));
    }
    for r in &msg.references {
        out.push_str(&format!("#:{r}\n"));
    }

    push_flag_lines(&mut out, msg);

    let prefix = if msg.obsolete { "#~ " } else { "" };
    for p in &msg.previous {
        if msg.obsolete {
            out.push_str(&format!("#~|{p}\n"));
        } else {
            out.push_str(&format!("#|{p}\n"));
        }
    }

    if let Some(ctxt) = &msg.msgctxt {
        push_field(&mut out, prefix, "msgctxt", ctxt);
    }
    push_field(&mut out, prefix, "msgid", &msg.msgid);

    match &msg.msgid_plural {
        Some(plural) => {
            push_field(&mut out, prefix, "msgid_plural", plural);
            if msg.msgstr_plural.is_empty() {
                push_field(&mut out, prefix, "msgstr[0]", "");
            }
            for (n, form) in msg.msgstr_plural.iter().enumerate() {
                push_field(&mut out, prefix, &format!("msgstr[{n}]"), form);
            }
        }
        None => push_field(&mut out, prefix, "msgstr", &msg.msgstr),
    }

    out
}

/// The stored fuzzy flag wins over a `fuzzy` token read from the source. A
/// flag set without a token goes at the front of the first line.
fn push_flag_lines(out: &mut String, msg: &Message) {
    let fuzzy = msg.fuzzy_flag();
    let has_token = msg.flag_lines.iter().flatten().any(|f| f == "fuzzy");

    let mut lines: Vec<Vec<&str>> = msg
        .flag_lines
        .iter()
        .map(|line| {
            line.iter()
                .map(String::as_str)
                .filter(|f| fuzzy || *f != "fuzzy")
                .collect()
        })
        .collect();
    if fuzzy && !has_token {
        match lines.first_mut() {
            Some(first) => first.insert(0, "fuzzy"),
            None => lines.push(vec!["fuzzy"]),
        }
    }

    for line in lines.iter().filter(|l| !l.is_empty()) {
        out.push_str(&format!("#, {}\n", line.join(", ")));
    }
}

/// Text with a newline before its end is written as `""` followed by one
/// continuation line per newline-terminated segment.
fn push_field(out: &mut String, prefix: &str, keyword: &str, text: &str) {
    let multiline = text.find('\n').is_some_and(|pos| pos + 1 < text.len());
    if !multiline {
        out.push_str(&format!("{prefix}{keyword} \"{}\"\n", escape(text)));
        return;
    }

    out.push_str(&format!("{prefix}{keyword} \"\"\n"));
    for segment in text.split_inclusive('\n') {
        out.push_str(&format!("{prefix}\"{}\"\n", escape(segment)));
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\u{0b}' => out.push_str("\\v"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;
    use crate::catalog::reader::MessageReader;

    #[test]
    fn header_is_split_on_newlines() {
        let mut header = Message::new("");
        header.set_text("Project-Id-Version: demo\nMIME-Version: 1.0\n".to_string());
        header.comments.push(" Demo catalog".to_string());

        assert_eq!(
            render(&header),
            "# Demo catalog\n\
             msgid \"\"\n\
             msgstr \"\"\n\
             \"Project-Id-Version: demo\\n\"\n\
             \"MIME-Version: 1.0\\n\"\n"
        );
    }

    #[test]
    fn single_trailing_newline_stays_inline() {
        let mut msg = Message::new("line\n");
        msg.set_text("Zeile\n".to_string());
        assert_eq!(render(&msg), "msgid \"line\\n\"\nmsgstr \"Zeile\\n\"\n");
    }

    #[test]
    fn flags_and_escapes() {
        let mut msg = Message::new("say \"hi\"\t\\");
        msg.set_text("x".to_string());
        msg.set_needs_review(true);
        msg.add_flag("c-format");
        msg.references.push(" a.c:1".to_string());

        assert_eq!(
            render(&msg),
            "#: a.c:1\n#, fuzzy, c-format\nmsgid \"say \\\"hi\\\"\\t\\\\\"\nmsgstr \"x\"\n"
        );
    }

    #[test]
    fn repeated_flag_lines_are_not_merged() {
        let text = "#, fuzzy\n#, no-c-format\nmsgid \"a\"\nmsgstr \"b\"\n";
        let msg = MessageReader::new(text).next().unwrap().unwrap();
        assert_eq!(render(&msg), text);

        let text = "#, no-c-format\n#, fuzzy\nmsgid \"a\"\nmsgstr \"b\"\n";
        let msg = MessageReader::new(text).next().unwrap().unwrap();
        assert_eq!(render(&msg), text);
    }

    #[test]
    fn cleared_fuzzy_drops_its_token() {
        let text = "#, fuzzy\n#, c-format\nmsgid \"a\"\nmsgstr \"b\"\n";
        let mut msg = MessageReader::new(text).next().unwrap().unwrap();
        msg.set_needs_review(false);
        assert_eq!(render(&msg), "#, c-format\nmsgid \"a\"\nmsgstr \"b\"\n");
    }

    #[test]
    fn comment_whitespace_survives() {
        let text = "# c  \n#.\tnote \nmsgid \"a\"\nmsgstr \"b\"\n";
        let msg = MessageReader::new(text).next().unwrap().unwrap();
        assert_eq!(render(&msg), text);
    }

    #[test]
    fn obsolete_plural() {
        let mut msg = Message::new("file");
        msg.obsolete = true;
        msg.msgid_plural = Some("files".to_string());
        msg.msgstr_plural = vec!["a".to_string(), "b".to_string()];
        assert_eq!(
            render(&msg),
            "#~ msgid \"file\"\n#~ msgid_plural \"files\"\n#~ msgstr[0] \"a\"\n#~ msgstr[1] \"b\"\n"
        );
    }

    #[test]
    fn entries_are_separated_by_blank_line() {
        let mut writer = PoWriter::new();
        let mut out = Vec::new();
        writer.write(&Message::new("a"), &mut out).unwrap();
        writer.write(&Message::new("b"), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "msgid \"a\"\nmsgstr \"\"\n\nmsgid \"b\"\nmsgstr \"\"\n"
        );
    }

    #[test]
    fn rendered_entry_reads_back() {
        let text = "# c\n#. x\n#: f:1\n#, fuzzy, python-format\n#| msgid \"old\"\nmsgctxt \"k\"\nmsgid \"a\\nb\"\nmsgid_plural \"as\"\nmsgstr[0] \"1\"\nmsgstr[1] \"2\\n\"\n";
        let msg = MessageReader::new(text).next().unwrap().unwrap();
        let again = MessageReader::new(&render(&msg)).next().unwrap().unwrap();
        assert_eq!(msg, again);
    }
}
