//! Response routing: narration vs. payload, block precedence, truncation.

use promptly_core::config::EngineConfig;
use promptly_core::logger::Logger;
use promptly_core::route::{BlockKind, Router};
use promptly_core::EditInstruction;

fn with_router<T>(f: impl FnOnce(&Router) -> T) -> T {
    let logger = Logger::new_for_test(7, None);
    let router = Router::new(&logger, EngineConfig::default()).expect("default config is valid");
    f(&router)
}

#[test]
fn narration_round_trips_trimmed() {
    for raw in ["hello", "  spaced out \n\n", "", "```python\nprint(1)\n```"] {
        let parsed = with_router(|r| r.parse_response(raw, Some("doc")));
        assert_eq!(parsed.sidebar_content, raw.trim());
        assert_eq!(parsed.editor_content, None);
        assert_eq!(parsed.editor_content_type, None);
    }
}

#[test]
fn last_system_block_wins() {
    let raw = "<|PROMPTLY_SYSTEM_START|>A<|PROMPTLY_SYSTEM_END|>\n<|PROMPTLY_SYSTEM_START|>B<|PROMPTLY_SYSTEM_END|>";
    let parsed = with_router(|r| r.parse_response(raw, None));
    assert_eq!(parsed.editor_content.as_deref(), Some("B"));
    assert_eq!(parsed.editor_content_type, Some(BlockKind::System));
    assert_eq!(parsed.summary().as_deref(), Some("Replaced the system prompt"));
}

#[test]
fn narration_segments_are_joined_with_blank_lines() {
    let raw = "Before.\n```system\nNew\n```\nAfter.";
    let parsed = with_router(|r| r.parse_response(raw, None));
    assert_eq!(parsed.sidebar_content, "Before.\n\nAfter.");
}

#[test]
fn instructions_accumulate_across_edit_blocks() {
    let raw = "<|PROMPTLY_EDIT_START|>\nreplace: \"one\"\nwith: \"1\"\n<|PROMPTLY_EDIT_END|>\nand\n```edit\nreplace: \"two\"\nwith: \"2\"\n```";
    let parsed = with_router(|r| r.parse_response(raw, Some("one two three")));
    assert_eq!(parsed.editor_content.as_deref(), Some("1 2 three"));
    assert_eq!(parsed.edit_instructions.len(), 2);
    assert_eq!(parsed.summary().as_deref(), Some("Applied 2/2 edits successfully"));
}

#[test]
fn bare_delete_in_edit_fence_is_an_instruction() {
    let doc = "line one\n// TODO: Add error handling\nline three\n";
    let raw = "```edit\ndelete: // TODO: Add error handling\n```";
    let parsed = with_router(|r| r.parse_response(raw, Some(doc)));

    assert_eq!(parsed.edit_instructions.len(), 1);
    assert_eq!(
        parsed.edit_instructions[0].instruction,
        EditInstruction::Delete { target: "// TODO: Add error handling".to_string() }
    );
    assert!(!parsed.fallback_inserted);
    assert_eq!(parsed.editor_content.as_deref(), Some("line one\n\nline three\n"));
}

#[test]
fn empty_instruction_list_falls_back_to_insertion() {
    let raw = "```edit\nPlease also mention pricing.\n```";
    let parsed = with_router(|r| r.parse_response(raw, Some("Intro\n")));
    assert!(parsed.fallback_inserted);
    assert_eq!(parsed.editor_content.as_deref(), Some("Intro\nPlease also mention pricing."));
}

#[test]
fn edits_without_document_are_reported_unapplied() {
    let raw = "```edit\nreplace: \"a\"\nwith: \"b\"\n```";
    let parsed = with_router(|r| r.parse_response(raw, None));
    assert_eq!(parsed.editor_content_type, Some(BlockKind::Edit));
    assert_eq!(parsed.editor_content, None);
    assert_eq!(parsed.edit_instructions.len(), 1);
    assert!(!parsed.edit_instructions[0].applied);
    assert!(parsed.edit_instructions[0].error.is_some());
}

#[test]
fn edits_after_a_system_block_apply_to_it() {
    let raw = "```system\nYou are terse.\n```\n```edit\nreplace: \"terse\"\nwith: \"chatty\"\n```";
    let parsed = with_router(|r| r.parse_response(raw, Some("ignored")));
    assert_eq!(parsed.editor_content_type, Some(BlockKind::Edit));
    assert_eq!(parsed.editor_content.as_deref(), Some("You are chatty."));
}

#[test]
fn truncated_system_block_is_recovered() {
    let raw = "<|PROMPTLY_SYSTEM_START|>partial text";
    let parsed = with_router(|r| r.parse_response_with_incomplete_delimiters(raw, None));
    assert_eq!(parsed.editor_content.as_deref(), Some("partial text"));
    assert_eq!(parsed.editor_content_type, Some(BlockKind::System));
    assert!(parsed.truncated);

    // The strict parser sees only narration
    let strict = with_router(|r| r.parse_response(raw, None));
    assert_eq!(strict.editor_content, None);
    assert_eq!(strict.sidebar_content, raw);
}

#[test]
fn truncated_edit_keeps_earlier_narration() {
    let raw = "I'll fix the greeting.\n<|PROMPTLY_EDIT_START|>\nreplace: \"Hi\"\nwith: \"Hello\"\n";
    let parsed = with_router(|r| r.parse_response_with_incomplete_delimiters(raw, Some("Hi there")));
    assert_eq!(parsed.sidebar_content, "I'll fix the greeting.");
    assert_eq!(parsed.editor_content.as_deref(), Some("Hello there"));
}

#[test]
fn complete_response_is_delegated() {
    let raw = "ok\n<|PROMPTLY_SYSTEM_START|>full<|PROMPTLY_SYSTEM_END|>";
    let lenient = with_router(|r| r.parse_response_with_incomplete_delimiters(raw, None));
    let strict = with_router(|r| r.parse_response(raw, None));
    assert_eq!(lenient, strict);
    assert!(!lenient.truncated);
}

#[test]
fn serializes_with_camel_case_keys() {
    let parsed = with_router(|r| r.parse_response("```system\nX\n```", None));
    let json = serde_json::to_value(&parsed).unwrap();
    assert_eq!(json["editorContent"], "X");
    assert_eq!(json["editorContentType"], "system");
    assert_eq!(json["sidebarContent"], "");
}

#[test]
fn closed_code_fences_survive_truncation_recovery() {
    let unit = "Here is a unit file:\n```systemd\n[Unit]\nDescription=x\n```\nHope that helps.";
    let parsed = with_router(|r| r.parse_response_with_incomplete_delimiters(unit, Some("You are a tutor.")));
    assert_eq!(parsed.editor_content_type, None);
    assert_eq!(parsed.editor_content, None);
    assert_eq!(parsed.sidebar_content, unit);
    assert!(!parsed.truncated);

    let config = "Try this:\n```editorconfig\nroot = true\n```\n";
    let parsed = with_router(|r| r.parse_response_with_incomplete_delimiters(config, Some("You are a tutor.")));
    assert_eq!(parsed.editor_content, None);
    assert!(!parsed.fallback_inserted);
    assert_eq!(parsed.sidebar_content, config.trim());
}
