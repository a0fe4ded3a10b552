// SPDX-License-Identifier: Apache-2.0 OR MIT
// Logger handle with a shared sink and a global minimum severity

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use super::consumer::{LogSink, MemorySink, StdoutSink};
use super::entry::LogEntry;
use super::{Facility, Severity};

/// Logger handle for writing trace entries.
///
/// This is a lightweight handle that can be cloned and passed around; all
/// clones share the same sink and minimum-severity filter. Every producer in
/// the simulator runs in this process, so entries are written straight
/// through to the sink under a mutex.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

struct LoggerInner {
    min_severity: AtomicU8,
    sink: Mutex<Box<dyn LogSink>>,
}

impl Logger {
    /// Create a logger writing to the given sink, recording entries at
    /// `min_severity` or more severe.
    pub fn new(sink: Box<dyn LogSink>, min_severity: Severity) -> Self {
        Self {
            inner: Arc::new(LoggerInner {
                min_severity: AtomicU8::new(min_severity.as_u8()),
                sink: Mutex::new(sink),
            }),
        }
    }

    /// Convenience constructor for a stdout logger.
    pub fn stdout(min_severity: Severity) -> Self {
        Self::new(Box::new(StdoutSink::new()), min_severity)
    }

    /// A logger capturing everything into memory, plus the capture handle.
    pub fn memory() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let sink = MemorySink::new();
        let entries = sink.entries();
        (Self::new(Box::new(sink), Severity::Debug), entries)
    }

    /// Whether a message at `severity` would be recorded.
    #[inline]
    pub fn enabled(&self, severity: Severity) -> bool {
        severity.as_u8() <= self.inner.min_severity.load(Ordering::Relaxed)
    }

    /// Change the minimum recorded severity at runtime.
    pub fn set_min_severity(&self, severity: Severity) {
        self.inner
            .min_severity
            .store(severity.as_u8(), Ordering::Relaxed);
    }

    /// Write a log entry
    pub fn log(&self, severity: Severity, facility: Facility, message: &str) {
        if !self.enabled(severity) {
            return;
        }
        let entry = LogEntry::new(severity, facility, message);
        let mut sink = self.inner.sink.lock().unwrap();
        sink.write_entry(&entry);
    }

    /// Flush the underlying sink.
    pub fn flush(&self) {
        self.inner.sink.lock().unwrap().flush();
    }

    /// Log with emergency severity
    #[inline]
    pub fn emergency(&self, facility: Facility, message: &str) {
        self.log(Severity::Emergency, facility, message);
    }

    /// Log with alert severity
    #[inline]
    pub fn alert(&self, facility: Facility, message: &str) {
        self.log(Severity::Alert, facility, message);
    }

    /// Log with critical severity
    #[inline]
    pub fn critical(&self, facility: Facility, message: &str) {
        self.log(Severity::Critical, facility, message);
    }

    /// Log with error severity
    #[inline]
    pub fn error(&self, facility: Facility, message: &str) {
        self.log(Severity::Error, facility, message);
    }

    /// Log with warning severity
    #[inline]
    pub fn warning(&self, facility: Facility, message: &str) {
        self.log(Severity::Warning, facility, message);
    }

    /// Log with notice severity
    #[inline]
    pub fn notice(&self, facility: Facility, message: &str) {
        self.log(Severity::Notice, facility, message);
    }

    /// Log with info severity
    #[inline]
    pub fn info(&self, facility: Facility, message: &str) {
        self.log(Severity::Info, facility, message);
    }

    /// Log with debug severity
    #[inline]
    pub fn debug(&self, facility: Facility, message: &str) {
        self.log(Severity::Debug, facility, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_filter() {
        let (logger, entries) = Logger::memory();
        logger.set_min_severity(Severity::Notice);

        logger.info(Facility::Test, "filtered out");
        logger.notice(Facility::Test, "kept");
        logger.error(Facility::Test, "kept too");

        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0].message, "kept");
    }

    #[test]
    fn test_clones_share_sink() {
        let (logger, entries) = Logger::memory();
        let other = logger.clone();

        logger.info(Facility::Test, "from original");
        other.info(Facility::Scheduler, "from clone");

        assert_eq!(entries.lock().unwrap().len(), 2);
    }
}
