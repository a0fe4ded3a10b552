// SPDX-License-Identifier: Apache-2.0 OR MIT
// Logging macros for convenient logging

/// Log a message with error severity
///
/// # Examples
/// ```ignore
/// log_error!(logger, Facility::Console, "unknown command");
/// ```
#[macro_export]
macro_rules! log_error {
    ($logger:expr, $facility:expr, $msg:expr) => {
        $logger.error($facility, $msg)
    };
}

/// Log a message with warning severity
///
/// # Examples
/// ```ignore
/// log_warning!(logger, Facility::Node, "pruned dead route");
/// ```
#[macro_export]
macro_rules! log_warning {
    ($logger:expr, $facility:expr, $msg:expr) => {
        $logger.warning($facility, $msg)
    };
}

/// Log a message with notice severity
///
/// # Examples
/// ```ignore
/// log_notice!(logger, Facility::Scheduler, "scheduler started");
/// ```
#[macro_export]
macro_rules! log_notice {
    ($logger:expr, $facility:expr, $msg:expr) => {
        $logger.notice($facility, $msg)
    };
}

/// Log a message with info severity
///
/// # Examples
/// ```ignore
/// log_info!(logger, Facility::Node, "packet delivered");
/// ```
#[macro_export]
macro_rules! log_info {
    ($logger:expr, $facility:expr, $msg:expr) => {
        $logger.info($facility, $msg)
    };
}

/// Log a message with debug severity
///
/// # Examples
/// ```ignore
/// log_debug!(logger, Facility::Node, "duplicate query dropped");
/// ```
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $facility:expr, $msg:expr) => {
        $logger.debug($facility, $msg)
    };
}
