// SPDX-License-Identifier: Apache-2.0 OR MIT
// Severity levels for the event trace (RFC 5424 syslog-style)

use serde::{Deserialize, Serialize};

/// Log severity levels (0-7, lower is more severe)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Simulation unusable (scheduler worker died)
    Emergency = 0,
    /// Immediate action required
    Alert = 1,
    /// Critical conditions
    Critical = 2,
    /// Error conditions (command failure, unroutable packet)
    Error = 3,
    /// Warning conditions (queue overflow, pruned route)
    Warning = 4,
    /// Significant normal condition (node added, scheduler started)
    Notice = 5,
    /// Informational (packet delivered, route installed)
    Info = 6,
    /// Debug-level messages (per-hop packet traces)
    Debug = 7,
}

impl Severity {
    /// Get severity level as u8 (0-7)
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Get severity name as static string
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Emergency => "EMERGENCY",
            Severity::Alert => "ALERT",
            Severity::Critical => "CRITICAL",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Notice => "NOTICE",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        }
    }

    /// Create from u8 value (returns None if invalid)
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Severity::Emergency),
            1 => Some(Severity::Alert),
            2 => Some(Severity::Critical),
            3 => Some(Severity::Error),
            4 => Some(Severity::Warning),
            5 => Some(Severity::Notice),
            6 => Some(Severity::Info),
            7 => Some(Severity::Debug),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Emergency < Severity::Debug);
        assert!(Severity::Info <= Severity::Debug);
    }

    #[test]
    fn test_severity_roundtrip() {
        for value in 0..8u8 {
            let sev = Severity::from_u8(value).unwrap();
            assert_eq!(sev.as_u8(), value);
        }
        assert!(Severity::from_u8(8).is_none());
    }
}
