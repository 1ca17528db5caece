use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EditError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // --- Resolution ---
    TargetNotFound,
    EmptyTarget,
    OverlappingTarget,

    // --- Document buffer ---
    BufferUnavailable,
    InvalidRange,

    // --- Configuration ---
    InvalidConfig,

    // --- File I/O ---
    FileReadFailed,
    FileWriteFailed,
}

#[derive(Debug, Error)]
pub enum EditError {
    #[error("Validation Error: {message} (context: {context})")]
    Validation { code: ErrorCode, message: String, context: String },

    #[error("{message} (target: {target:?})")]
    Apply { code: ErrorCode, message: String, target: String },

    #[error("Buffer Error: {message} (edit: {label})")]
    Buffer { code: ErrorCode, message: String, label: String },

    #[error("File Error: {message} (path: {path:?})")]
    File { code: ErrorCode, message: String, path: PathBuf },
}

impl EditError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EditError::Validation { code, .. }
            | EditError::Apply { code, .. }
            | EditError::Buffer { code, .. }
            | EditError::File { code, .. } => *code,
        }
    }
}
