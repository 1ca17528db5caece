use chrono::{Local, Utc};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Debug)]
pub struct Logger {
    rid: u64,
    // Captures records instead of printing when set
    output: Option<Rc<RefCell<String>>>,
}

impl Logger {
    /// Creates a logger that writes JSONL records to stderr.
    ///
    /// # Panics
    ///
    /// Panics if `rid` is zero.
    #[must_use]
    pub fn new(rid: u64) -> Self {
        assert!(rid > 0, "Logger rid must be non-zero");
        Self { rid, output: None }
    }

    /// Creates a logger that appends its records to `buffer` when one is given.
    #[must_use]
    pub fn new_for_test(rid: u64, buffer: Option<Rc<RefCell<String>>>) -> Self {
        Self { rid, output: buffer }
    }

    pub fn rid(&self) -> u64 {
        self.rid
    }

    pub fn info(&self, subsystem: &str, action: &str, message: &str) {
        self.emit("info", subsystem, action, message);
    }

    pub fn warn(&self, subsystem: &str, action: &str, message: &str) {
        self.emit("warn", subsystem, action, message);
    }

    pub fn error(&self, subsystem: &str, action: &str, message: &str) {
        self.emit("error", subsystem, action, message);
    }

    fn emit(&self, level: &str, subsystem: &str, action: &str, message: &str) {
        let rec = json!({
            "ts": Utc::now().to_rfc3339(),
            "level": level,
            "rid": self.rid,
            "subsystem": subsystem,
            "action": action,
            "msg": message,
        });

        if let Some(output) = &self.output {
            let mut writer = output.borrow_mut();
            writer.push_str(&rec.to_string());
            writer.push('\n');
        } else {
            // stdout is reserved for command output
            eprintln!("{rec}");
        }
    }
}

/// Request id for one parse/apply round trip.
pub fn generate_rid() -> u64 {
    let rid = (Local::now().timestamp_millis() as u64) ^ u64::from(std::process::id());
    rid.max(1)
}
