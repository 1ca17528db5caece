use crate::error::Result;
use serde::Serialize;
use std::ops::Range;

mod piece_table;

pub use piece_table::PieceTable;

/// 1-based line/column, columns counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub line_number: usize,
    pub column: usize,
}

/// Replace `range` (byte offsets into the current text) with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceOp {
    pub range: Range<usize>,
    pub text: String,
    pub force_move_markers: bool,
}

impl SpliceOp {
    pub fn new(range: Range<usize>, text: impl Into<String>) -> Self {
        Self { range, text: text.into(), force_move_markers: true }
    }
}

/// The editable document an applier mutates.
pub trait DocumentBuffer {
    fn value(&self) -> String;

    fn value_in_range(&self, range: Range<usize>) -> Result<String>;

    fn position_at(&self, offset: usize) -> Position;

    /// Applies every op or none of them, as one undoable step labelled `label`.
    /// Ranges refer to the text before the batch and must not overlap.
    fn execute_edits(&mut self, label: &str, ops: &[SpliceOp]) -> Result<()>;

    fn is_disposed(&self) -> bool;
}

/// Position of byte `offset` in `text`. Offsets past the end or inside a
/// multi-byte character are clamped back.
pub fn position_in(text: &str, offset: usize) -> Position {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &text[..offset];
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    Position {
        line_number: before.matches('\n').count() + 1,
        column: before[line_start..].chars().count() + 1,
    }
}
