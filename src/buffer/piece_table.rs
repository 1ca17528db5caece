use super::{position_in, DocumentBuffer, Position, SpliceOp};
use crate::error::{EditError, ErrorCode, Result};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Original,
    Add,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Piece {
    source: Source,
    start: usize,
    len: usize,
}

impl Piece {
    fn sub(&self, offset: usize, len: usize) -> Piece {
        Piece { source: self.source, start: self.start + offset, len }
    }
}

#[derive(Debug, Clone)]
struct HistoryEntry {
    label: String,
    pieces: Vec<Piece>,
    len: usize,
}

/// Piece table over an immutable original and an append-only add buffer.
///
/// Each `execute_edits` batch is one history entry, so undo/redo step over
/// whole batches.
#[derive(Debug, Clone)]
pub struct PieceTable {
    original: String,
    additions: String,
    pieces: Vec<Piece>,
    len: usize,
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    disposed: bool,
}

impl PieceTable {
    pub fn from_text(text: &str) -> Self {
        let pieces = if text.is_empty() {
            Vec::new()
        } else {
            vec![Piece { source: Source::Original, start: 0, len: text.len() }]
        };
        Self {
            original: text.to_string(),
            additions: String::new(),
            pieces,
            len: text.len(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            disposed: false,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Marks the buffer unusable; later edits fail with `BufferUnavailable`.
    pub fn dispose(&mut self) {
        self.disposed = true;
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Label of the batch `undo` would revert.
    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.last().map(|e| e.label.as_str())
    }

    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.undo_stack.pop() else {
            return false;
        };
        let current = self.snapshot(entry.label.clone());
        self.restore(entry);
        self.redo_stack.push(current);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.redo_stack.pop() else {
            return false;
        };
        let current = self.snapshot(entry.label.clone());
        self.restore(entry);
        self.undo_stack.push(current);
        true
    }

    fn snapshot(&self, label: String) -> HistoryEntry {
        HistoryEntry { label, pieces: self.pieces.clone(), len: self.len }
    }

    fn restore(&mut self, entry: HistoryEntry) {
        self.pieces = entry.pieces;
        self.len = entry.len;
    }

    fn piece_text(&self, piece: &Piece) -> &str {
        let buf = match piece.source {
            Source::Original => &self.original,
            Source::Add => &self.additions,
        };
        &buf[piece.start..piece.start + piece.len]
    }

    fn splice(&mut self, range: Range<usize>, text: &str) {
        let mut left = Vec::with_capacity(self.pieces.len() + 1);
        let mut right = Vec::new();
        let mut offset = 0usize;

        for piece in &self.pieces {
            let p_start = offset;
            let p_end = offset + piece.len;
            offset = p_end;

            if p_start < range.start {
                let keep = p_end.min(range.start) - p_start;
                left.push(piece.sub(0, keep));
            }
            if p_end > range.end {
                let from = p_start.max(range.end);
                right.push(piece.sub(from - p_start, p_end - from));
            }
        }

        if !text.is_empty() {
            let start = self.additions.len();
            self.additions.push_str(text);
            left.push(Piece { source: Source::Add, start, len: text.len() });
        }
        left.extend(right);

        self.pieces = left;
        self.len = self.len - (range.end - range.start) + text.len();
    }

    fn check_available(&self, label: &str) -> Result<()> {
        if self.disposed {
            return Err(EditError::Buffer {
                code: ErrorCode::BufferUnavailable,
                message: "Document buffer has been disposed".to_string(),
                label: label.to_string(),
            });
        }
        Ok(())
    }

    fn check_range(&self, text: &str, range: &Range<usize>, label: &str) -> Result<()> {
        let valid = range.start <= range.end
            && range.end <= self.len
            && text.is_char_boundary(range.start)
            && text.is_char_boundary(range.end);
        if valid {
            Ok(())
        } else {
            Err(EditError::Buffer {
                code: ErrorCode::InvalidRange,
                message: format!("Invalid splice range {}..{} (len={})", range.start, range.end, self.len),
                label: label.to_string(),
            })
        }
    }
}

impl DocumentBuffer for PieceTable {
    fn value(&self) -> String {
        let mut out = String::with_capacity(self.len);
        for piece in &self.pieces {
            out.push_str(self.piece_text(piece));
        }
        out
    }

    fn value_in_range(&self, range: Range<usize>) -> Result<String> {
        let text = self.value();
        self.check_range(&text, &range, "read")?;
        Ok(text[range].to_string())
    }

    fn position_at(&self, offset: usize) -> Position {
        position_in(&self.value(), offset)
    }

    fn execute_edits(&mut self, label: &str, ops: &[SpliceOp]) -> Result<()> {
        self.check_available(label)?;
        if ops.is_empty() {
            return Ok(());
        }

        let text = self.value();
        let mut order: Vec<usize> = (0..ops.len()).collect();
        // An insertion point sorts ahead of a range starting at the same offset
        order.sort_by_key(|&i| (ops[i].range.start, ops[i].range.end, i));

        for (n, &i) in order.iter().enumerate() {
            self.check_range(&text, &ops[i].range, label)?;
            if let Some(&next) = order.get(n + 1) {
                if ops[i].range.end > ops[next].range.start {
                    return Err(EditError::Buffer {
                        code: ErrorCode::InvalidRange,
                        message: format!(
                            "Overlapping splices {:?} and {:?}",
                            ops[i].range, ops[next].range
                        ),
                        label: label.to_string(),
                    });
                }
            }
        }

        self.undo_stack.push(self.snapshot(label.to_string()));
        self.redo_stack.clear();

        // Back to front so earlier offsets stay valid
        for &i in order.iter().rev() {
            self.splice(ops[i].range.clone(), &ops[i].text);
        }
        Ok(())
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_applies_against_original_offsets() {
        let mut doc = PieceTable::from_text("hello brave world");
        doc.execute_edits("t", &[SpliceOp::new(12..17, "there"), SpliceOp::new(0..5, "goodbye")])
            .unwrap();
        assert_eq!(doc.value(), "goodbye brave there");
        assert_eq!(doc.len(), "goodbye brave there".len());
    }

    #[test]
    fn undo_and_redo_step_over_whole_batches() {
        let mut doc = PieceTable::from_text("abc");
        doc.execute_edits("first", &[SpliceOp::new(0..0, "1"), SpliceOp::new(3..3, "2")]).unwrap();
        doc.execute_edits("second", &[SpliceOp::new(1..2, "")]).unwrap();
        assert_eq!(doc.value(), "1bc2");
        assert_eq!(doc.undo_label(), Some("second"));

        assert!(doc.undo());
        assert_eq!(doc.value(), "1abc2");
        assert!(doc.undo());
        assert_eq!(doc.value(), "abc");
        assert!(!doc.undo());

        assert!(doc.redo());
        assert_eq!(doc.value(), "1abc2");
        doc.execute_edits("third", &[SpliceOp::new(0..1, "")]).unwrap();
        assert!(!doc.can_redo());
        assert_eq!(doc.value(), "abc2");
    }

    #[test]
    fn insert_and_range_may_share_a_start() {
        let mut doc = PieceTable::from_text("# Role\n# Rules\nNo raw fish.\n");
        doc.execute_edits(
            "t",
            &[SpliceOp::new(7..14, "# Constraints"), SpliceOp::new(7..7, "# Style\n")],
        )
        .unwrap();
        assert_eq!(doc.value(), "# Role\n# Style\n# Constraints\nNo raw fish.\n");

        let mut doc = PieceTable::from_text("abc");
        doc.execute_edits("t", &[SpliceOp::new(0..3, "x"), SpliceOp::new(3..3, "y")]).unwrap();
        assert_eq!(doc.value(), "xy");
    }

    #[test]
    fn rejected_batch_changes_nothing() {
        let mut doc = PieceTable::from_text("abcdef");
        let err = doc
            .execute_edits("bad", &[SpliceOp::new(0..3, "x"), SpliceOp::new(2..4, "y")])
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRange);

        let err = doc.execute_edits("bad", &[SpliceOp::new(4..10, "")]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRange);

        assert_eq!(doc.value(), "abcdef");
        assert!(!doc.can_undo());
    }

    #[test]
    fn ranges_must_fall_on_char_boundaries() {
        let mut doc = PieceTable::from_text("né");
        let err = doc.execute_edits("t", &[SpliceOp::new(2..3, "")]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRange);
        assert!(doc.value_in_range(0..2).is_err());
        assert_eq!(doc.value_in_range(1..3).unwrap(), "é");
    }

    #[test]
    fn disposed_buffer_rejects_edits() {
        let mut doc = PieceTable::from_text("x");
        doc.dispose();
        assert!(doc.is_disposed());
        let err = doc.execute_edits("t", &[SpliceOp::new(0..1, "y")]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::BufferUnavailable);
    }

    #[test]
    fn empty_document_accepts_inserts() {
        let mut doc = PieceTable::from_text("");
        assert!(doc.is_empty());
        doc.execute_edits("t", &[SpliceOp::new(0..0, "first line\n")]).unwrap();
        assert_eq!(doc.value(), "first line\n");
        assert_eq!(doc.position_at(11).line_number, 2);
    }
}
