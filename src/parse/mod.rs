use serde::Serialize;

mod parse_line;
mod parse_pair;

pub use parse_line::strip_quotes;

/// One declarative change. Targets are literal text; offsets are resolved
/// against the document only when the instruction is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditInstruction {
    Replace { target: String, replacement: String },
    InsertBefore { target: String, content: String },
    InsertAfter { target: String, content: String },
    Delete { target: String },
}

impl EditInstruction {
    pub fn target(&self) -> &str {
        match self {
            EditInstruction::Replace { target, .. }
            | EditInstruction::InsertBefore { target, .. }
            | EditInstruction::InsertAfter { target, .. }
            | EditInstruction::Delete { target } => target,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            EditInstruction::Replace { .. } => "replace",
            EditInstruction::InsertBefore { .. } => "insert before",
            EditInstruction::InsertAfter { .. } => "insert after",
            EditInstruction::Delete { .. } => "delete",
        }
    }
}

#[derive(Default)]
pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an edit block into instructions, in order of appearance.
    ///
    /// Recognized forms (keywords are case-sensitive and start a line):
    ///
    /// ```text
    /// replace: "old" with: "new"
    ///
    /// replace: old
    /// with: new
    ///
    /// insert before: anchor
    /// content: text
    ///
    /// insert after: anchor
    /// content: text
    ///
    /// delete: text
    /// ```
    ///
    /// Lines that match none of these are skipped. A quoted value whose
    /// closing quote is on a later line spans those lines.
    pub fn parse_edit_block(&self, raw: &str) -> Vec<EditInstruction> {
        let lines: Vec<&str> = raw.lines().collect();
        let mut out = Vec::new();
        let mut i = 0usize;

        while i < lines.len() {
            match parse_pair::parse_at(&lines, i) {
                Some((edit, next)) => {
                    out.push(edit);
                    i = next;
                }
                None => i += 1,
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Vec<EditInstruction> {
        Parser::new().parse_edit_block(raw)
    }

    #[test]
    fn single_line_replace() {
        let edits = parse(r#"replace: "foo bar" with: "baz""#);
        assert_eq!(
            edits,
            vec![EditInstruction::Replace {
                target: "foo bar".to_string(),
                replacement: "baz".to_string(),
            }]
        );
    }

    #[test]
    fn two_line_forms_in_order() {
        let raw = "replace: \"a\"\nwith: \"b\"\n\ninsert before: c\ncontent: d\n\ninsert after: \"e\"\ncontent: \"f\"\n\ndelete: g";
        let edits = parse(raw);
        assert_eq!(edits.len(), 4);
        assert_eq!(edits[0], EditInstruction::Replace { target: "a".into(), replacement: "b".into() });
        assert_eq!(edits[1], EditInstruction::InsertBefore { target: "c".into(), content: "d".into() });
        assert_eq!(edits[2], EditInstruction::InsertAfter { target: "e".into(), content: "f".into() });
        assert_eq!(edits[3], EditInstruction::Delete { target: "g".into() });
    }

    #[test]
    fn narration_is_skipped() {
        let raw = "Sure, here is the change:\nreplace: x\nwith: y\nLet me know if that helps.";
        let edits = parse(raw);
        assert_eq!(edits, vec![EditInstruction::Replace { target: "x".into(), replacement: "y".into() }]);
    }

    #[test]
    fn with_line_must_follow_immediately() {
        assert!(parse("replace: x\n\nwith: y").is_empty());
        assert!(parse("insert after: x\nsomething else\ncontent: y").is_empty());
    }

    #[test]
    fn keywords_are_case_sensitive() {
        assert!(parse("Replace: x\nWith: y\nDELETE: z").is_empty());
    }

    #[test]
    fn inner_quotes_survive_stripping() {
        let edits = parse("replace: \"Hello, \" + name + \"!\"\nwith: `Hello, ${name}!`");
        assert_eq!(
            edits,
            vec![EditInstruction::Replace {
                target: "Hello, \" + name + \"!".to_string(),
                replacement: "`Hello, ${name}!`".to_string(),
            }]
        );
    }

    #[test]
    fn quoted_value_spans_lines() {
        let raw = "replace: \"fn a() {\n    1\n}\"\nwith: \"fn a() {\n    2\n}\"";
        let edits = parse(raw);
        assert_eq!(
            edits,
            vec![EditInstruction::Replace {
                target: "fn a() {\n    1\n}".to_string(),
                replacement: "fn a() {\n    2\n}".to_string(),
            }]
        );
    }

    #[test]
    fn unquoted_inline_replace() {
        let edits = parse("replace: old words with: new words");
        assert_eq!(
            edits,
            vec![EditInstruction::Replace { target: "old words".into(), replacement: "new words".into() }]
        );
    }

    #[test]
    fn empty_target_passes_through() {
        assert_eq!(parse("delete:"), vec![EditInstruction::Delete { target: String::new() }]);
    }
}
