use crate::config::EngineConfig;
use crate::engine::{Applier, EditOutcome};
use crate::error::{EditError, ErrorCode, Result};
use crate::logger::Logger;
use crate::parse::{EditInstruction, Parser};
use serde::Serialize;

mod scan;

pub use scan::{
    find_unclosed, scan, BlockKind, OpenBlock, Segment, EDIT_END, EDIT_START, SYSTEM_END,
    SYSTEM_START,
};

/// One LLM reply split into chat narration and document payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedResponse {
    pub sidebar_content: String,
    pub editor_content: Option<String>,
    pub editor_content_type: Option<BlockKind>,
    pub edit_instructions: Vec<EditOutcome>,
    pub fallback_inserted: bool,
    pub truncated: bool,
}

impl ParsedResponse {
    pub fn applied_count(&self) -> usize {
        self.edit_instructions.iter().filter(|o| o.applied).count()
    }

    /// User-facing line for edit responses, e.g. "Applied 2/3 edits successfully".
    pub fn summary(&self) -> Option<String> {
        match self.editor_content_type {
            Some(BlockKind::Edit) if self.fallback_inserted => {
                Some("No edit instructions found; inserted the response text".to_string())
            }
            Some(BlockKind::Edit) => Some(format!(
                "Applied {}/{} edits successfully",
                self.applied_count(),
                self.edit_instructions.len()
            )),
            Some(BlockKind::System) => Some("Replaced the system prompt".to_string()),
            None => None,
        }
    }
}

pub struct Router<'a> {
    logger: &'a Logger,
    parser: Parser,
    applier: Applier<'a>,
}

impl<'a> Router<'a> {
    pub fn new(logger: &'a Logger, config: EngineConfig) -> Result<Self> {
        Ok(Self {
            logger,
            parser: Parser::new(),
            applier: Applier::new(logger, config)?,
        })
    }

    pub fn applier(&self) -> &Applier<'a> {
        &self.applier
    }

    /// Routes a complete response.
    ///
    /// The last `system` block wins. Instructions from every `edit` block are
    /// applied in order. When the reply also carries a `system` block, the
    /// edits apply to that captured text and `current_document` is ignored;
    /// otherwise they apply to `current_document`. The kind of the last block
    /// decides `editor_content_type`.
    pub fn parse_response(&self, raw: &str, current_document: Option<&str>) -> ParsedResponse {
        self.route(&scan(raw), current_document, false)
    }

    /// Like [`Router::parse_response`], but an opening marker left unclosed at
    /// the end of `raw` (a cut-off generation) is treated as a block running to
    /// the end of the text.
    pub fn parse_response_with_incomplete_delimiters(
        &self,
        raw: &str,
        current_document: Option<&str>,
    ) -> ParsedResponse {
        let Some(open) = find_unclosed(raw) else {
            return self.parse_response(raw, current_document);
        };

        self.logger.info(
            "router",
            "incomplete_block",
            &format!("{:?} block left open at byte {}", open.kind, open.marker_start),
        );
        let mut segments = scan(&raw[..open.marker_start]);
        segments.push(Segment::Block { kind: open.kind, body: &raw[open.body_start..] });
        self.route(&segments, current_document, true)
    }

    fn route(
        &self,
        segments: &[Segment<'_>],
        current_document: Option<&str>,
        truncated: bool,
    ) -> ParsedResponse {
        let mut narration: Vec<&str> = Vec::new();
        let mut system: Option<String> = None;
        let mut kind: Option<BlockKind> = None;
        let mut edits: Vec<EditInstruction> = Vec::new();
        let mut edit_bodies: Vec<&str> = Vec::new();

        for segment in segments {
            match *segment {
                Segment::Narration(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        narration.push(text);
                    }
                }
                Segment::Block { kind: BlockKind::System, body } => {
                    system = Some(body.trim().to_string());
                    kind = Some(BlockKind::System);
                }
                Segment::Block { kind: BlockKind::Edit, body } => {
                    edits.extend(self.parser.parse_edit_block(body));
                    edit_bodies.push(body.trim());
                    kind = Some(BlockKind::Edit);
                }
            }
        }

        let mut parsed = ParsedResponse {
            sidebar_content: narration.join("\n\n"),
            editor_content: None,
            editor_content_type: kind,
            edit_instructions: Vec::new(),
            fallback_inserted: false,
            truncated,
        };

        match kind {
            None => {
                self.logger.info("router", "narration_only", "no fenced block found");
            }
            Some(BlockKind::System) => {
                parsed.editor_content = system;
            }
            Some(BlockKind::Edit) => {
                let base = system.as_deref().or(current_document);
                self.route_edits(&mut parsed, base, &edits, &edit_bodies);
            }
        }

        parsed
    }

    fn route_edits(
        &self,
        parsed: &mut ParsedResponse,
        base: Option<&str>,
        edits: &[EditInstruction],
        edit_bodies: &[&str],
    ) {
        let Some(base) = base else {
            let e = EditError::Apply {
                code: ErrorCode::BufferUnavailable,
                message: "No current document to apply edits against".to_string(),
                target: String::new(),
            };
            self.logger.warn("router", "no_document", &format!("{} instruction(s) left unapplied", edits.len()));
            parsed.edit_instructions = edits.iter().map(|edit| EditOutcome::failed(edit, &e)).collect();
            return;
        };

        if edits.is_empty() {
            let raw = edit_bodies.join("\n\n");
            if raw.is_empty() {
                self.logger.info("router", "empty_edit_block", "edit block had no content");
                return;
            }
            self.logger.warn("router", "fallback_insert", "edit block held no instructions");
            parsed.editor_content = Some(self.applier.fallback_text(base, &raw));
            parsed.fallback_inserted = true;
            return;
        }

        let applied = self.applier.apply_to_text(base, edits);
        parsed.editor_content = Some(applied.content);
        parsed.edit_instructions = applied.report.outcomes;
    }
}
