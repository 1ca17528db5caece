use similar::{ChangeTag, TextDiff};

/// Unified diff between the current document and a proposed one.
pub fn render_diff(current: &str, proposed: &str) -> String {
    TextDiff::from_lines(current, proposed)
        .unified_diff()
        .context_radius(3)
        .header("current", "proposed")
        .to_string()
}

/// Number of inserted and deleted lines.
pub fn change_counts(current: &str, proposed: &str) -> (usize, usize) {
    let diff = TextDiff::from_lines(current, proposed);
    let mut inserted = 0usize;
    let mut deleted = 0usize;
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => inserted += 1,
            ChangeTag::Delete => deleted += 1,
            ChangeTag::Equal => {}
        }
    }
    (inserted, deleted)
}
