use super::resolve::resolve;
use crate::buffer::{position_in, DocumentBuffer, Position, SpliceOp};
use crate::config::{ApplyMode, EngineConfig, FallbackPlacement};
use crate::error::{EditError, ErrorCode, Result};
use crate::logger::Logger;
use crate::parse::{EditInstruction, Parser};
use crate::r#match::SimilarityStrategy;
use serde::Serialize;
use similar::{DiffTag, TextDiff};
use std::ops::Range;

pub const EDIT_LABEL: &str = "promptly.applyEdits";
pub const FALLBACK_LABEL: &str = "promptly.fallbackInsert";

/// What happened to one instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditOutcome {
    pub instruction: EditInstruction,
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    pub fuzzy: bool,
}

impl EditOutcome {
    fn applied(instruction: &EditInstruction, position: Position, fuzzy: bool) -> Self {
        Self {
            instruction: instruction.clone(),
            applied: true,
            error: None,
            position: Some(position),
            fuzzy,
        }
    }

    pub(crate) fn failed(instruction: &EditInstruction, error: &EditError) -> Self {
        Self {
            instruction: instruction.clone(),
            applied: false,
            error: Some(error.to_string()),
            position: None,
            fuzzy: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReport {
    pub outcomes: Vec<EditOutcome>,
    pub fallback_inserted: bool,
}

impl ApplyReport {
    pub fn applied_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.applied).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.applied_count()
    }

    pub fn summary(&self) -> String {
        if self.fallback_inserted {
            return "No edit instructions found; inserted the response text".to_string();
        }
        format!(
            "Applied {}/{} edits successfully",
            self.applied_count(),
            self.outcomes.len()
        )
    }
}

/// Result of applying instructions to a plain string.
#[derive(Debug, Clone)]
pub struct AppliedText {
    pub content: String,
    pub report: ApplyReport,
}

pub struct Applier<'a> {
    logger: &'a Logger,
    config: EngineConfig,
    strategy: Box<dyn SimilarityStrategy>,
}

impl<'a> Applier<'a> {
    pub fn new(logger: &'a Logger, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let strategy = config.build_strategy();
        Ok(Self { logger, config, strategy })
    }

    /// Swaps in a custom similarity strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Box<dyn SimilarityStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn strategy(&self) -> Option<&dyn SimilarityStrategy> {
        if self.config.fuzzy {
            Some(self.strategy.as_ref())
        } else {
            None
        }
    }

    /// Applies `edits` one after another; each sees the previous one's result.
    /// Every instruction gets an outcome.
    pub fn apply_to_text(&self, content: &str, edits: &[EditInstruction]) -> AppliedText {
        let mut modified = content.to_string();
        let mut outcomes = Vec::with_capacity(edits.len());

        for edit in edits {
            match resolve(&modified, edit, self.strategy(), self.logger) {
                Ok(splice) => {
                    let position = position_in(&modified, splice.range.start);
                    modified.replace_range(splice.range, &splice.text);
                    outcomes.push(EditOutcome::applied(edit, position, splice.fuzzy));
                }
                Err(e) => {
                    self.log_unresolved(edit, &e);
                    outcomes.push(EditOutcome::failed(edit, &e));
                }
            }
        }

        let report = ApplyReport { outcomes, fallback_inserted: false };
        self.logger.info("applier", "apply_text", &report.summary());
        AppliedText { content: modified, report }
    }

    /// Applies `edits` to `doc` as one undoable batch, using the configured
    /// [`ApplyMode`].
    ///
    /// # Errors
    ///
    /// Fails only when the buffer is disposed or rejects the batch. Targets
    /// that cannot be resolved are reported in the returned outcomes.
    pub fn apply_to_buffer(
        &self,
        doc: &mut dyn DocumentBuffer,
        edits: &[EditInstruction],
    ) -> Result<ApplyReport> {
        self.check_buffer(doc, EDIT_LABEL)?;
        let snapshot = doc.value();

        let (ops, outcomes) = match self.config.apply_mode {
            ApplyMode::Snapshot => self.plan_snapshot(&snapshot, edits),
            ApplyMode::Chained => {
                let applied = self.apply_to_text(&snapshot, edits);
                (diff_ops(&snapshot, &applied.content), applied.report.outcomes)
            }
        };

        doc.execute_edits(EDIT_LABEL, &ops)?;

        let report = ApplyReport { outcomes, fallback_inserted: false };
        self.logger.info(
            "applier",
            "apply_buffer",
            &format!("{} ({} splice(s))", report.summary(), ops.len()),
        );
        Ok(report)
    }

    /// Parses `raw` as an edit block and applies it. When nothing parses, the
    /// raw text itself is inserted so the response is not lost.
    pub fn apply_block_or_fallback(
        &self,
        doc: &mut dyn DocumentBuffer,
        raw: &str,
    ) -> Result<ApplyReport> {
        let edits = Parser::new().parse_edit_block(raw);
        if !edits.is_empty() {
            return self.apply_to_buffer(doc, &edits);
        }

        self.check_buffer(doc, FALLBACK_LABEL)?;
        let text = doc.value();
        let (at, insert) = self.fallback_splice(&text, raw);
        doc.execute_edits(FALLBACK_LABEL, &[SpliceOp::new(at..at, insert)])?;

        self.logger.warn(
            "applier",
            "fallback_insert",
            &format!("no instructions parsed; inserted {} byte(s) at {at}", raw.len()),
        );
        Ok(ApplyReport { outcomes: Vec::new(), fallback_inserted: true })
    }

    /// String form of the fallback insertion.
    pub fn fallback_text(&self, content: &str, raw: &str) -> String {
        let (at, insert) = self.fallback_splice(content, raw);
        let mut out = content.to_string();
        out.insert_str(at, &insert);
        out
    }

    fn fallback_splice(&self, content: &str, raw: &str) -> (usize, String) {
        let at = match self.config.fallback {
            FallbackPlacement::End => content.len(),
            FallbackPlacement::Cursor(offset) => {
                let mut at = offset.min(content.len());
                while !content.is_char_boundary(at) {
                    at -= 1;
                }
                at
            }
        };
        let needs_break = at == content.len() && !content.is_empty() && !content.ends_with('\n');
        let insert = if needs_break { format!("\n{raw}") } else { raw.to_string() };
        (at, insert)
    }

    /// Resolves every target against one snapshot. A target whose range
    /// intersects an already accepted one is rejected.
    fn plan_snapshot(
        &self,
        snapshot: &str,
        edits: &[EditInstruction],
    ) -> (Vec<SpliceOp>, Vec<EditOutcome>) {
        let mut ops: Vec<SpliceOp> = Vec::new();
        let mut outcomes = Vec::with_capacity(edits.len());

        for edit in edits {
            let splice = match resolve(snapshot, edit, self.strategy(), self.logger) {
                Ok(splice) => splice,
                Err(e) => {
                    self.log_unresolved(edit, &e);
                    outcomes.push(EditOutcome::failed(edit, &e));
                    continue;
                }
            };

            if let Some(other) = ops.iter().find(|op| overlaps(&op.range, &splice.range)) {
                let e = EditError::Apply {
                    code: ErrorCode::OverlappingTarget,
                    message: format!(
                        "Target range {:?} overlaps an earlier edit at {:?}",
                        splice.range, other.range
                    ),
                    target: edit.target().to_string(),
                };
                self.log_unresolved(edit, &e);
                outcomes.push(EditOutcome::failed(edit, &e));
                continue;
            }

            let position = position_in(snapshot, splice.range.start);
            outcomes.push(EditOutcome::applied(edit, position, splice.fuzzy));
            ops.push(SpliceOp::new(splice.range, splice.text));
        }

        (ops, outcomes)
    }

    fn check_buffer(&self, doc: &dyn DocumentBuffer, label: &str) -> Result<()> {
        if doc.is_disposed() {
            self.logger.error("applier", "buffer_unavailable", "document buffer is disposed; nothing applied");
            return Err(EditError::Buffer {
                code: ErrorCode::BufferUnavailable,
                message: "Document buffer is not available".to_string(),
                label: label.to_string(),
            });
        }
        Ok(())
    }

    fn log_unresolved(&self, edit: &EditInstruction, e: &EditError) {
        self.logger.warn(
            "applier",
            "unresolved",
            &format!("{} skipped ({}): {e}", edit.verb(), code_name(e.code())),
        );
    }
}

fn code_name(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::TargetNotFound => "target_not_found",
        ErrorCode::EmptyTarget => "empty_target",
        ErrorCode::OverlappingTarget => "overlapping_target",
        ErrorCode::BufferUnavailable => "buffer_unavailable",
        ErrorCode::InvalidRange => "invalid_range",
        ErrorCode::InvalidConfig => "invalid_config",
        ErrorCode::FileReadFailed => "file_read_failed",
        ErrorCode::FileWriteFailed => "file_write_failed",
    }
}

/// Half-open ranges overlap; touching ranges and equal insertion points do not.
fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

/// Line-level splices turning `old` into `new`, all relative to `old`.
fn diff_ops(old: &str, new: &str) -> Vec<SpliceOp> {
    if old == new {
        return Vec::new();
    }
    let diff = TextDiff::from_lines(old, new);
    let old_slices = diff.old_slices();
    let new_slices = diff.new_slices();

    let mut offsets = Vec::with_capacity(old_slices.len() + 1);
    let mut acc = 0usize;
    offsets.push(acc);
    for slice in old_slices {
        acc += slice.len();
        offsets.push(acc);
    }

    diff.ops()
        .iter()
        .filter(|op| op.tag() != DiffTag::Equal)
        .map(|op| {
            let old_range = op.old_range();
            let text: String = new_slices[op.new_range()].concat();
            SpliceOp::new(offsets[old_range.start]..offsets[old_range.end], text)
        })
        .collect()
}
