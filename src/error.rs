// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Simulation error kinds.
//!
//! Command-boundary failures are reported and the simulation keeps running;
//! protocol-step failures never surface here (routes are pruned and packets
//! dropped or re-queued locally). Only [`SimError::Fatal`] terminates the
//! scheduler worker.

use thiserror::Error;

/// Errors surfaced by the admin surface and the control console.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    /// Node creation or linking failed (missing IP, duplicate IP,
    /// attempted self-connect).
    #[error("node connect error: {0}")]
    NodeConnect(String),

    /// Malformed command or address syntax.
    #[error("wrong input format: {0}")]
    InputMismatch(String),

    /// Reference to an IP that is not a known node.
    #[error("no such node: {0}")]
    NotFound(String),

    /// Unrecoverable scheduler state.
    #[error("fatal: {0}")]
    Fatal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SimError::NotFound("10.0.0.9".to_string());
        assert_eq!(err.to_string(), "no such node: 10.0.0.9");

        let err = SimError::InputMismatch("bad address".to_string());
        assert!(err.to_string().contains("wrong input format"));
    }
}
