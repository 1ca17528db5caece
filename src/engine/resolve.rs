use crate::error::{EditError, ErrorCode, Result};
use crate::logger::Logger;
use crate::parse::EditInstruction;
use crate::r#match::{find_target, SimilarityStrategy};
use std::ops::Range;

/// A resolved instruction: replace `range` of the searched text with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub range: Range<usize>,
    pub text: String,
    pub fuzzy: bool,
}

/// Locates `edit`'s target in `content` and computes the splice it implies.
///
/// Inserts land on line boundaries: before the line holding the match, or at
/// the start of the line after the match ends. A target found only by the
/// similarity strategy stands for its whole line.
pub fn resolve(
    content: &str,
    edit: &EditInstruction,
    strategy: Option<&dyn SimilarityStrategy>,
    logger: &Logger,
) -> Result<Splice> {
    let target = edit.target();
    if target.is_empty() {
        return Err(EditError::Apply {
            code: ErrorCode::EmptyTarget,
            message: format!("Cannot {} an empty target", edit.verb()),
            target: String::new(),
        });
    }

    let span = find_target(content, target, strategy, logger).ok_or_else(|| EditError::Apply {
        code: ErrorCode::TargetNotFound,
        message: "Target text not found in document".to_string(),
        target: target.to_string(),
    })?;
    let fuzzy = !span.exact;

    let (range, text) = match edit {
        EditInstruction::Replace { replacement, .. } => (span.start..span.end, replacement.clone()),
        EditInstruction::Delete { .. } if fuzzy => {
            (span.start..next_line_start(content, span.end), String::new())
        }
        EditInstruction::Delete { .. } => (span.start..span.end, String::new()),
        EditInstruction::InsertBefore { content: insert, .. } => {
            let at = line_start(content, span.start);
            (at..at, format!("{insert}\n"))
        }
        EditInstruction::InsertAfter { content: insert, .. } => match content[span.end..].find('\n') {
            Some(i) => {
                let at = span.end + i + 1;
                (at..at, format!("{insert}\n"))
            }
            // Last line has no terminator; start a new one
            None => (content.len()..content.len(), format!("\n{insert}")),
        },
    };

    Ok(Splice { range, text, fuzzy })
}

fn line_start(content: &str, pos: usize) -> usize {
    content[..pos].rfind('\n').map_or(0, |i| i + 1)
}

fn next_line_start(content: &str, pos: usize) -> usize {
    content[pos..].find('\n').map_or(content.len(), |i| pos + i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r#match::WordOverlap;

    fn run(content: &str, edit: EditInstruction) -> Result<Splice> {
        resolve(content, &edit, Some(&WordOverlap::default()), &Logger::new_for_test(1, None))
    }

    #[test]
    fn insert_before_goes_to_line_start() {
        let splice = run(
            "one\n  two three\n",
            EditInstruction::InsertBefore { target: "three".into(), content: "new".into() },
        )
        .unwrap();
        assert_eq!(splice.range, 4..4);
        assert_eq!(splice.text, "new\n");
    }

    #[test]
    fn insert_after_goes_to_next_line() {
        let splice = run(
            "one\ntwo\nthree",
            EditInstruction::InsertAfter { target: "tw".into(), content: "new".into() },
        )
        .unwrap();
        assert_eq!(splice.range, 8..8);
    }

    #[test]
    fn insert_after_last_line_without_newline() {
        let splice = run(
            "one\ntwo",
            EditInstruction::InsertAfter { target: "two".into(), content: "new".into() },
        )
        .unwrap();
        assert_eq!(splice.range, 7..7);
        assert_eq!(splice.text, "\nnew");
    }

    #[test]
    fn fuzzy_delete_removes_the_line() {
        let content = "keep\nHello, friend!\nkeep too\n";
        let splice = run(content, EditInstruction::Delete { target: "Hello, \" + name + \"!".into() }).unwrap();
        assert!(splice.fuzzy);
        assert_eq!(&content[splice.range.clone()], "Hello, friend!\n");
    }

    #[test]
    fn empty_and_missing_targets() {
        let err = run("abc", EditInstruction::Delete { target: String::new() }).unwrap_err();
        assert_eq!(err.code(), ErrorCode::EmptyTarget);
        let err = run("abc", EditInstruction::Delete { target: "zzz qqq".into() }).unwrap_err();
        assert_eq!(err.code(), ErrorCode::TargetNotFound);
    }
}
