/// Byte ranges of each line's content, excluding `\n` and a preceding `\r`.
pub fn line_ranges(s: &str) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut line_start = 0usize;

    for (i, b) in s.bytes().enumerate() {
        if b == b'\n' {
            let mut end = i;
            if end > line_start && s.as_bytes()[end - 1] == b'\r' {
                end -= 1;
            }
            out.push((line_start, end));
            line_start = i + 1;
        }
    }

    // Last line without trailing newline
    if line_start < s.len() {
        out.push((line_start, s.len()));
    }
    out
}

/// Lowercased alphanumeric words; punctuation and quotes separate words.
pub fn tokenize_words(s: &str) -> Vec<String> {
    s.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}
