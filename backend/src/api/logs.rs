//! Pipeline log streaming via Server-Sent Events (SSE).
//!
//! Every log line is printed to stderr and broadcast to connected
//! dashboard clients, tagged with the pipeline stage that emitted it.
//! Stdout stays reserved for command output.

use chrono::Utc;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Log level for frontend display
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Pipeline stage that produced a log entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Fetch,
    Parse,
    Transform,
    Serve,
}

impl Stage {
    fn label(&self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::Parse => "parse",
            Stage::Transform => "transform",
            Stage::Serve => "serve",
        }
    }
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub stage: Stage,
    pub message: String,
    /// RFC 3339 timestamp
    pub timestamp: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, stage: Stage, message: impl Into<String>) -> Self {
        Self {
            level,
            stage,
            message: message.into(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Global log broadcaster
pub static LOG_BROADCASTER: Lazy<LogBroadcaster> = Lazy::new(LogBroadcaster::new);

/// Broadcasts log entries to all connected SSE clients
pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
}

impl LogBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Print to stderr and broadcast a log entry
    pub fn log(&self, entry: LogEntry) {
        let prefix = match entry.level {
            LogLevel::Info => " ",
            LogLevel::Success => "✓",
            LogLevel::Warning => "⚠️",
            LogLevel::Error => "❌",
        };
        eprintln!("   {} [{:<9}] {}", prefix, entry.stage.label(), entry.message);

        // No receivers is not an error.
        let _ = self.sender.send(entry);
    }

    /// Get a receiver for SSE streaming
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

pub fn log_info(stage: Stage, msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Info, stage, msg));
}

pub fn log_success(stage: Stage, msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Success, stage, msg));
}

pub fn log_warning(stage: Stage, msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Warning, stage, msg));
}

pub fn log_error(stage: Stage, msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Error, stage, msg));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_receives_entry() {
        let broadcaster = LogBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        broadcaster.log(LogEntry::new(LogLevel::Warning, Stage::Parse, "2 rows skipped"));

        let entry = rx.try_recv().unwrap();
        assert_eq!(entry.level, LogLevel::Warning);
        assert_eq!(entry.stage, Stage::Parse);
        assert_eq!(entry.message, "2 rows skipped");
    }

    #[test]
    fn test_log_without_subscribers() {
        let broadcaster = LogBroadcaster::new();
        broadcaster.log(LogEntry::new(LogLevel::Info, Stage::Fetch, "no one listening"));
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = LogEntry::new(LogLevel::Success, Stage::Transform, "done");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["level"], "success");
        assert_eq!(json["stage"], "transform");
        assert!(json["timestamp"].as_str().unwrap().starts_with("20"));
    }
}
