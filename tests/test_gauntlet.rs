use promptly_core::test_runner;
use std::path::Path;

#[test]
fn gauntlet_cases_pass() {
    let cases = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/cases");
    let summary = test_runner::run_dir(&cases);
    assert!(summary.all_passed(), "{}", summary.log);
    assert_eq!(summary.total, 11);
}
