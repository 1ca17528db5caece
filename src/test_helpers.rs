use crate::error::{EditError, ErrorCode, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Reads a fixture file; a missing file is `None`, other failures are errors.
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(EditError::File {
            code: ErrorCode::FileReadFailed,
            message: format!("Failed to read fixture: {e}"),
            path: path.to_path_buf(),
        }),
    }
}

pub fn read_required(path: &Path) -> Result<String> {
    read_optional(path)?.ok_or_else(|| EditError::File {
        code: ErrorCode::FileReadFailed,
        message: "Fixture file is missing".to_string(),
        path: path.to_path_buf(),
    })
}

/// Walks up from the working directory looking for `tests/cases`, then falls
/// back to the crate manifest directory.
pub fn find_cases_dir() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;
    loop {
        let cases = current.join("tests").join("cases");
        if cases.is_dir() {
            return Some(cases);
        }
        if !current.pop() {
            break;
        }
    }

    let cases = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("cases");
    cases.is_dir().then_some(cases)
}

pub fn case_header(log: &mut String, name: &str) {
    logln(log, format!("\n— Testing: {name} —"));
}

pub fn logln<S: Into<String>>(buf: &mut String, s: S) {
    if !buf.is_empty() && !buf.ends_with('\n') {
        buf.push('\n');
    }
    buf.push_str(&s.into());
}
