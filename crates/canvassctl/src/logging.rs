//! Logging for canvassctl
//!
//! Two sinks: `tracing` diagnostics on stderr (filtered by $RUST_LOG), and one
//! JSONL record per invocation in the state directory.

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. Defaults to `warn` when $RUST_LOG is unset.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Log entry for each canvassctl invocation
#[derive(Debug, Serialize, Deserialize)]
pub struct LogEntry {
    /// RFC 3339 timestamp
    pub ts: String,

    /// Request ID (UUID)
    pub req_id: String,

    /// Command name
    pub command: String,

    /// What the workflow did: created, existing, rejected, duplicate...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,

    pub exit_code: i32,

    pub duration_ms: u64,

    pub ok: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LogEntry {
    pub fn new(req_id: String, command: &str) -> Self {
        Self {
            ts: Self::now(),
            req_id,
            command: command.to_string(),
            outcome: None,
            exit_code: 0,
            duration_ms: 0,
            ok: true,
            error: None,
        }
    }

    /// Discover log file path with fallback chain
    ///
    /// Priority:
    /// 1. $CANVASSCTL_LOG_FILE
    /// 2. $XDG_STATE_HOME/canvass/ctl.jsonl
    /// 3. ~/.local/state/canvass/ctl.jsonl
    pub fn discover_log_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("CANVASSCTL_LOG_FILE") {
            return Some(PathBuf::from(path));
        }

        if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
            return Some(Path::new(&xdg_state).join("canvass").join("ctl.jsonl"));
        }

        if let Ok(home) = std::env::var("HOME") {
            return Some(
                Path::new(&home)
                    .join(".local")
                    .join("state")
                    .join("canvass")
                    .join("ctl.jsonl"),
            );
        }

        None
    }

    /// Append to the discovered log file. Failures are logged and dropped.
    pub fn write(&self) {
        let Some(path) = Self::discover_log_path() else {
            return;
        };
        if let Err(e) = self.write_to_path(&path) {
            tracing::debug!("could not write invocation log {}: {}", path.display(), e);
        }
    }

    pub fn write_to_path(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;

        writeln!(file, "{}", json)?;
        Ok(())
    }

    pub fn generate_req_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    pub fn now() -> String {
        chrono::Utc::now().to_rfc3339()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_append_as_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ctl.jsonl");

        let mut first = LogEntry::new(LogEntry::generate_req_id(), "confirm");
        first.outcome = Some("created".to_string());
        first.write_to_path(&path).unwrap();
        LogEntry::new(LogEntry::generate_req_id(), "normalize")
            .write_to_path(&path)
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: LogEntry = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.command, "confirm");
        assert_eq!(parsed.outcome.as_deref(), Some("created"));
        assert!(!lines[1].contains("outcome"));
    }
}
