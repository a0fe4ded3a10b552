// SPDX-License-Identifier: Apache-2.0 OR MIT
// One formatted event-trace record

use chrono::{DateTime, Local};

use super::{Facility, Severity};

/// A single event-trace record.
///
/// Entries are owned values: the producer formats its message once and the
/// sink decides how to render the surrounding metadata.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub severity: Severity,
    pub facility: Facility,
    pub message: String,
}

impl LogEntry {
    pub fn new(severity: Severity, facility: Facility, message: &str) -> Self {
        Self {
            timestamp: Local::now(),
            severity,
            facility,
            message: message.to_string(),
        }
    }

    /// Render as a trace line:
    /// `[TIMESTAMP] [SEVERITY] [Facility] message`
    pub fn format_line(&self) -> String {
        format!(
            "[{}] [{}] [{}] {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            self.severity.as_str(),
            self.facility.as_str(),
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line() {
        let entry = LogEntry::new(Severity::Info, Facility::Node, "route installed");
        let line = entry.format_line();
        assert!(line.contains("[INFO]"));
        assert!(line.contains("[Node]"));
        assert!(line.ends_with("route installed"));
    }
}
