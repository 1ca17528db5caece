pub mod buffer;
pub mod config;
pub mod engine;
pub mod error;
pub mod logger;
pub mod r#match;
pub mod parse;
pub mod preview;
pub mod prompts;
pub mod route;
pub mod test_helpers;
pub mod test_runner;

pub use buffer::{DocumentBuffer, PieceTable, Position, SpliceOp};
pub use config::{ApplyMode, EngineConfig, FallbackPlacement, StrategyKind};
pub use engine::{AppliedText, Applier, ApplyReport, EditOutcome};
pub use error::{EditError, ErrorCode, Result};
pub use logger::Logger;
pub use parse::{EditInstruction, Parser};
pub use route::{BlockKind, ParsedResponse, Router};
