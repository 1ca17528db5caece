use super::EditInstruction;
use regex::Regex;
use std::sync::OnceLock;

fn single_line_replace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^replace:\s*"(?P<target>.*?)"\s*with:\s*"(?P<replacement>.*)"\s*$"#)
            .expect("single-line replace pattern is valid")
    })
}

/// `replace: "<target>" with: "<replacement>"` on one line.
pub fn single_line_replace(line: &str) -> Option<EditInstruction> {
    let caps = single_line_replace_re().captures(line.trim_end())?;
    Some(EditInstruction::Replace {
        target: caps["target"].to_string(),
        replacement: caps["replacement"].to_string(),
    })
}

/// Unquoted fallback: `replace: old text with: new text`.
pub fn inline_replace(rest: &str) -> Option<EditInstruction> {
    let (target, replacement) = rest.split_once(" with:")?;
    Some(EditInstruction::Replace {
        target: strip_quotes(target),
        replacement: strip_quotes(replacement),
    })
}

/// Trims the value and drops one leading and one trailing double quote.
pub fn strip_quotes(value: &str) -> String {
    let value = value.trim();
    let value = value.strip_prefix('"').unwrap_or(value);
    let value = value.strip_suffix('"').unwrap_or(value);
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_quotes_is_one_sided_tolerant() {
        assert_eq!(strip_quotes("  \"abc\" "), "abc");
        assert_eq!(strip_quotes("\"abc"), "abc");
        assert_eq!(strip_quotes("abc\""), "abc");
        assert_eq!(strip_quotes("abc"), "abc");
        assert_eq!(strip_quotes("\""), "");
    }

    #[test]
    fn single_line_requires_both_quoted() {
        assert!(single_line_replace(r#"replace: "a" with: b"#).is_none());
        assert!(single_line_replace(r#"replace: "a" with: "b""#).is_some());
    }
}
