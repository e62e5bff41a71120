//! Action logging for Trellis commands.
//!
//! Every CLI invocation is appended as one JSONL record to `action.log` in
//! the data directory. Logging is strictly best-effort: a command must never
//! fail or change behavior because its audit record could not be written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Log file name within the data directory.
pub const LOG_FILE: &str = "action.log";

/// A single action log entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionLog {
    /// When the action occurred
    pub timestamp: DateTime<Utc>,

    /// Command name (e.g., "feature state", "import")
    pub command: String,

    /// Command arguments as JSON
    pub args: serde_json::Value,

    /// Whether the command succeeded
    pub success: bool,

    /// Error message if the command failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Command execution duration in milliseconds
    pub duration_ms: u64,
}

/// Append an action record to the log.
///
/// Silently falls back on any error so logging can never break a command;
/// only a stderr warning is emitted.
pub fn log_action(
    data_dir: &Path,
    command: &str,
    args: serde_json::Value,
    success: bool,
    error: Option<String>,
    duration_ms: u64,
) {
    let entry = ActionLog {
        timestamp: Utc::now(),
        command: command.to_string(),
        args,
        success,
        error,
        duration_ms,
    };

    if let Err(e) = write_log_entry(data_dir, &entry) {
        eprintln!("Warning: failed to write action log: {}", e);
    }
}

fn write_log_entry(data_dir: &Path, entry: &ActionLog) -> std::io::Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join(LOG_FILE))?;
    let line = serde_json::to_string(entry).map_err(std::io::Error::other)?;
    writeln!(file, "{}", line)
}
