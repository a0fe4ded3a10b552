// SPDX-License-Identifier: Apache-2.0 OR MIT
// Output sinks for the event trace

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use super::entry::LogEntry;

/// Output sink for log entries
pub trait LogSink: Send {
    /// Write a log entry to the sink
    fn write_entry(&mut self, entry: &LogEntry);

    /// Flush any buffered output
    fn flush(&mut self);
}

/// Standard output sink (writes to stdout)
pub struct StdoutSink {
    stdout: io::Stdout,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for StdoutSink {
    fn write_entry(&mut self, entry: &LogEntry) {
        let _ = writeln!(self.stdout, "{}", entry.format_line());
    }

    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }
}

/// File sink for persistent event traces
pub struct FileSink {
    writer: BufWriter<File>,
}

impl FileSink {
    /// Create or truncate the trace file at `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl LogSink for FileSink {
    fn write_entry(&mut self, entry: &LogEntry) {
        let _ = writeln!(self.writer, "{}", entry.format_line());
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}

/// In-memory sink for tests: entries are captured into a shared buffer.
#[derive(Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the captured entries, for assertions.
    pub fn entries(&self) -> Arc<Mutex<Vec<LogEntry>>> {
        Arc::clone(&self.entries)
    }
}

impl LogSink for MemorySink {
    fn write_entry(&mut self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }

    fn flush(&mut self) {}
}
