use crate::config::EngineConfig;
use crate::logger::{generate_rid, Logger};
use crate::route::{BlockKind, Router};
use crate::test_helpers::{case_header, find_cases_dir, logln, read_optional, read_required};
use serde::Deserialize;
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

/// `meta.json` of one gauntlet case.
#[derive(Deserialize, Debug)]
struct CaseMeta {
    description: String,
    #[serde(default)]
    incomplete: bool,
    expected_type: Option<BlockKind>,
    #[serde(default)]
    expect_applied: usize,
    #[serde(default)]
    expect_failed: usize,
    #[serde(default)]
    expect_fallback: bool,
    expected_sidebar: Option<String>,
    expected_log_contains: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GauntletSummary {
    pub passed: usize,
    pub total: usize,
    pub log: String,
}

impl GauntletSummary {
    pub fn all_passed(&self) -> bool {
        self.total > 0 && self.passed == self.total
    }
}

/// Runs every case under the discovered `tests/cases` directory.
pub fn run() -> GauntletSummary {
    match find_cases_dir() {
        Some(dir) => run_dir(&dir),
        None => GauntletSummary {
            log: "❌ Could not find 'tests/cases' directory.".to_string(),
            ..GauntletSummary::default()
        },
    }
}

/// Each sub-directory of `cases_dir` holds `meta.json`, `response.txt` and
/// optionally `document.txt` and `expected.txt` (the expected editor content).
pub fn run_dir(cases_dir: &Path) -> GauntletSummary {
    let mut summary = GauntletSummary::default();
    logln(&mut summary.log, "🧪 **Self-Test Gauntlet** starting…");
    logln(&mut summary.log, format!("📂 Cases: {}", cases_dir.display()));

    let mut entries = match fs::read_dir(cases_dir) {
        Ok(iter) => iter.filter_map(|e| e.ok()).map(|e| e.path()).filter(|p| p.is_dir()).collect::<Vec<_>>(),
        Err(e) => {
            logln(&mut summary.log, format!("❌ Failed to read cases directory: {e}"));
            return summary;
        }
    };
    entries.sort();

    let rid = generate_rid();
    for case_path in entries {
        summary.total += 1;
        let name = case_path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        case_header(&mut summary.log, &name);

        if run_case(rid, &mut summary.log, &case_path) {
            summary.passed += 1;
            logln(&mut summary.log, "  ✅ case passed");
        } else {
            logln(&mut summary.log, "  ❌ case failed");
        }
    }

    logln(&mut summary.log, format!("\n🧾 **Cases Passed**: {}/{}", summary.passed, summary.total));
    if summary.all_passed() {
        logln(&mut summary.log, "\n✅ **Self-Test PASSED**");
    } else {
        logln(&mut summary.log, "\n❌ **Self-Test FAILED** – see failed cases above");
    }
    summary
}

fn run_case(rid: u64, log: &mut String, case_path: &Path) -> bool {
    let meta: CaseMeta = match read_required(&case_path.join("meta.json")) {
        Ok(text) => match serde_json::from_str(&text) {
            Ok(m) => m,
            Err(e) => {
                logln(log, format!("  ❌ Failed to parse meta.json: {e}"));
                return false;
            }
        },
        Err(e) => {
            logln(log, format!("  ❌ {e}"));
            return false;
        }
    };
    logln(log, format!("  • {}", meta.description));

    let fixtures = read_required(&case_path.join("response.txt")).and_then(|response| {
        let document = read_optional(&case_path.join("document.txt"))?;
        let expected = read_optional(&case_path.join("expected.txt"))?;
        Ok((response, document, expected))
    });
    let (response, document, expected) = match fixtures {
        Ok(f) => f,
        Err(e) => {
            logln(log, format!("  ❌ {e}"));
            return false;
        }
    };

    let log_buffer = Rc::new(RefCell::new(String::new()));
    let logger = Logger::new_for_test(rid, Some(log_buffer.clone()));
    let router = match Router::new(&logger, EngineConfig::default()) {
        Ok(r) => r,
        Err(e) => {
            logln(log, format!("  ❌ Router setup failed: {e}"));
            return false;
        }
    };

    let parsed = if meta.incomplete {
        router.parse_response_with_incomplete_delimiters(&response, document.as_deref())
    } else {
        router.parse_response(&response, document.as_deref())
    };

    let mut checks_passed = true;
    let mut check = |ok: bool, pass: String, fail: String| {
        if ok {
            logln(log, format!("    ✓ {pass}"));
        } else {
            logln(log, format!("    ❌ {fail}"));
            checks_passed = false;
        }
    };

    check(
        parsed.editor_content_type == meta.expected_type,
        format!("Content type matches ({:?})", meta.expected_type),
        format!("Expected type {:?}, got {:?}", meta.expected_type, parsed.editor_content_type),
    );

    let applied = parsed.applied_count();
    let failed = parsed.edit_instructions.len() - applied;
    check(
        applied == meta.expect_applied && failed == meta.expect_failed,
        format!("Outcome counts match (applied={applied}, failed={failed})"),
        format!(
            "Expected applied={}, failed={}. Got applied={applied}, failed={failed}.",
            meta.expect_applied, meta.expect_failed
        ),
    );

    check(
        parsed.fallback_inserted == meta.expect_fallback,
        format!("Fallback flag matches ({})", meta.expect_fallback),
        format!("Expected fallback={}, got {}", meta.expect_fallback, parsed.fallback_inserted),
    );

    check(
        parsed.editor_content == expected,
        "Editor content verified".to_string(),
        format!("Editor content mismatch: got {:?}", parsed.editor_content),
    );

    if let Some(sidebar) = &meta.expected_sidebar {
        check(
            &parsed.sidebar_content == sidebar,
            "Sidebar content verified".to_string(),
            format!("Sidebar mismatch: got {:?}", parsed.sidebar_content),
        );
    }

    if let Some(needle) = &meta.expected_log_contains {
        check(
            log_buffer.borrow().contains(needle.as_str()),
            format!("Log verification passed. Found '{needle}'."),
            format!("Log verification failed. Did not find '{needle}'."),
        );
    }

    checks_passed
}
