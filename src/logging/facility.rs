// SPDX-License-Identifier: Apache-2.0 OR MIT
// Logging facilities (component identifiers)

use serde::{Deserialize, Serialize};

/// Logging facility - identifies which component emitted the trace line
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facility {
    /// Scheduler worker: scan, drain, lifecycle
    Scheduler = 0,
    /// Per-node protocol step: queries, replies, forwarding, delivery
    Node = 1,
    /// Interactive control console
    Console = 2,
    /// Startup configuration loading
    Config = 3,
    /// Test harness and fixtures
    Test = 4,
    /// Fallback for uncategorized messages
    Unknown = 255,
}

impl Facility {
    /// Get facility code as u8
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Get facility name as static string
    pub const fn as_str(self) -> &'static str {
        match self {
            Facility::Scheduler => "Scheduler",
            Facility::Node => "Node",
            Facility::Console => "Console",
            Facility::Config => "Config",
            Facility::Test => "Test",
            Facility::Unknown => "Unknown",
        }
    }

    /// Create from u8 value (returns Unknown if invalid)
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Facility::Scheduler,
            1 => Facility::Node,
            2 => Facility::Console,
            3 => Facility::Config,
            4 => Facility::Test,
            _ => Facility::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facility_roundtrip() {
        assert_eq!(Facility::from_u8(Facility::Node.as_u8()), Facility::Node);
        assert_eq!(Facility::from_u8(200), Facility::Unknown);
        assert_eq!(Facility::Scheduler.as_str(), "Scheduler");
    }
}
