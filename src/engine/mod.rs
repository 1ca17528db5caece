mod apply;
mod resolve;

pub use apply::{AppliedText, Applier, ApplyReport, EditOutcome, EDIT_LABEL, FALLBACK_LABEL};
pub use resolve::{resolve, Splice};
