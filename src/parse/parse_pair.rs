use super::parse_line::{inline_replace, single_line_replace, strip_quotes};
use super::EditInstruction;

const KEYWORDS: &[&str] = &[
    "replace:",
    "with:",
    "insert before:",
    "insert after:",
    "content:",
    "delete:",
];

/// Tries to read one instruction starting at `lines[at]`.
/// Returns the instruction and the index of the first unconsumed line.
pub fn parse_at(lines: &[&str], at: usize) -> Option<(EditInstruction, usize)> {
    let line = lines[at].trim_start();

    if let Some(rest) = line.strip_prefix("replace:") {
        if let Some(edit) = single_line_replace(line) {
            return Some((edit, at + 1));
        }
        let (target, end) = read_value(rest, lines, at);
        if let Some(with) = keyword_at(lines, end + 1, "with:") {
            let (replacement, last) = read_value(with, lines, end + 1);
            return Some((EditInstruction::Replace { target, replacement }, last + 1));
        }
        return inline_replace(rest).map(|edit| (edit, at + 1));
    }

    if let Some(rest) = line.strip_prefix("insert before:") {
        let (target, content, next) = read_anchor_and_content(rest, lines, at)?;
        return Some((EditInstruction::InsertBefore { target, content }, next));
    }

    if let Some(rest) = line.strip_prefix("insert after:") {
        let (target, content, next) = read_anchor_and_content(rest, lines, at)?;
        return Some((EditInstruction::InsertAfter { target, content }, next));
    }

    if let Some(rest) = line.strip_prefix("delete:") {
        let (target, end) = read_value(rest, lines, at);
        return Some((EditInstruction::Delete { target }, end + 1));
    }

    None
}

fn read_anchor_and_content(
    rest: &str,
    lines: &[&str],
    at: usize,
) -> Option<(String, String, usize)> {
    let (target, end) = read_value(rest, lines, at);
    let content = keyword_at(lines, end + 1, "content:")?;
    let (content, last) = read_value(content, lines, end + 1);
    Some((target, content, last + 1))
}

fn keyword_at<'a>(lines: &[&'a str], idx: usize, keyword: &str) -> Option<&'a str> {
    lines.get(idx)?.trim_start().strip_prefix(keyword)
}

fn is_keyword_line(line: &str) -> bool {
    let line = line.trim_start();
    KEYWORDS.iter().any(|k| line.starts_with(k))
}

/// Reads a value whose first line remainder is `first` (found on `lines[at]`).
///
/// An opening quote without a closing one on the same line continues until a
/// line ending in a quote. If a keyword line or the end of input comes first,
/// the value is just the first line. Returns the value and the index of the
/// last line it used.
fn read_value(first: &str, lines: &[&str], at: usize) -> (String, usize) {
    let head = first.trim();
    let open = head.starts_with('"') && (head.len() == 1 || !head.ends_with('"'));
    if !open {
        return (strip_quotes(head), at);
    }

    for (offset, line) in lines[at + 1..].iter().enumerate() {
        if is_keyword_line(line) {
            break;
        }
        let tail = line.trim_end();
        if let Some(closed) = tail.strip_suffix('"') {
            let end = at + 1 + offset;
            let mut value = head[1..].to_string();
            for middle in &lines[at + 1..end] {
                value.push('\n');
                value.push_str(middle);
            }
            value.push('\n');
            value.push_str(closed);
            return (value, end);
        }
    }

    (strip_quotes(head), at)
}
