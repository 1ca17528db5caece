use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub const SYSTEM_START: &str = "<|PROMPTLY_SYSTEM_START|>";
pub const SYSTEM_END: &str = "<|PROMPTLY_SYSTEM_END|>";
pub const EDIT_START: &str = "<|PROMPTLY_EDIT_START|>";
pub const EDIT_END: &str = "<|PROMPTLY_EDIT_END|>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    System,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Narration(&'a str),
    Block { kind: BlockKind, body: &'a str },
}

/// An opening marker with no closer after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenBlock {
    pub kind: BlockKind,
    pub marker_start: usize,
    pub body_start: usize,
}

fn block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?s)<\|PROMPTLY_SYSTEM_START\|>(?P<sys>.*?)<\|PROMPTLY_SYSTEM_END\|>",
            r"|<\|PROMPTLY_EDIT_START\|>(?P<edit>.*?)<\|PROMPTLY_EDIT_END\|>",
            r"|```system[ \t]*\r?\n(?P<lsys>.*?)```",
            r"|```edit[ \t]*\r?\n(?P<ledit>.*?)```",
        ))
        .expect("block pattern is valid")
    })
}

/// Splits `raw` into narration and complete fenced blocks, in order.
pub fn scan(raw: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0usize;

    for caps in block_re().captures_iter(raw) {
        let Some(whole) = caps.get(0) else { continue };
        segments.push(Segment::Narration(&raw[last..whole.start()]));

        let (kind, body) = if let Some(m) = caps.name("sys").or_else(|| caps.name("lsys")) {
            (BlockKind::System, m.as_str())
        } else if let Some(m) = caps.name("edit").or_else(|| caps.name("ledit")) {
            (BlockKind::Edit, m.as_str())
        } else {
            continue;
        };
        segments.push(Segment::Block { kind, body });
        last = whole.end();
    }

    segments.push(Segment::Narration(&raw[last..]));
    segments
}

fn opener_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?P<sys><\|PROMPTLY_SYSTEM_START\|>)",
            r"|(?P<edit><\|PROMPTLY_EDIT_START\|>)",
            r"|(?P<lsys>```system[ \t]*(?:\r?\n|$))",
            r"|(?P<ledit>```edit[ \t]*(?:\r?\n|$))",
        ))
        .expect("opener pattern is valid")
    })
}

/// Finds an opening marker after the last complete block that is never closed.
///
/// Legacy fences only count when the language tag is exactly `system` or
/// `edit`, so closed code fences such as ```` ```systemd ```` stay narration.
pub fn find_unclosed(raw: &str) -> Option<OpenBlock> {
    let tail_start = block_re().find_iter(raw).last().map_or(0, |m| m.end());
    let caps = opener_re().captures(&raw[tail_start..])?;
    let whole = caps.get(0)?;

    let kind = if caps.name("sys").is_some() || caps.name("lsys").is_some() {
        BlockKind::System
    } else {
        BlockKind::Edit
    };
    Some(OpenBlock {
        kind,
        marker_start: tail_start + whole.start(),
        body_start: tail_start + whole.end(),
    })
}
