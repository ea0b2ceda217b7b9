//! Log sinks: where reports go when logging is enabled.
//!
//! A sink receives plain-text messages together with a [`Priority`]. Writing
//! is best-effort; a sink has no way to report failure back to the reporter.
//!
//! The default sink, [`TracingSink`], forwards every message as a `tracing`
//! event under the `faultline` target. Closures taking a priority and a
//! message are sinks too:
//!
//! ```
//! use faultline::{Reporter, severity::Priority};
//!
//! let reporter = Reporter::builder()
//!     .log_sink(|priority: Priority, message: &str| eprintln!("[{priority}] {message}"))
//!     .build();
//! # drop(reporter);
//! ```

use std::sync::{Mutex, PoisonError};

use triomphe::Arc;

use crate::severity::Priority;

/// Receives log messages.
pub trait LogSink: Send + Sync + 'static {
    /// Writes `message` at `priority`.
    fn write(&self, priority: Priority, message: &str);
}

impl<F> LogSink for F
where
    F: Fn(Priority, &str) + Send + Sync + 'static,
{
    fn write(&self, priority: Priority, message: &str) {
        self(priority, message);
    }
}

/// Forwards messages to `tracing` under the `faultline` target.
///
/// `Error` maps to `ERROR`, `Warning` to `WARN`, `Notice` to `INFO` and
/// `Debug` to `DEBUG`.
#[derive(Copy, Clone, Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write(&self, priority: Priority, message: &str) {
        match priority {
            Priority::Error => tracing::error!(target: "faultline", "{message}"),
            Priority::Warning => tracing::warn!(target: "faultline", "{message}"),
            Priority::Notice => tracing::info!(target: "faultline", "{message}"),
            Priority::Debug => tracing::debug!(target: "faultline", "{message}"),
        }
    }
}

/// A message written to a [`MemorySink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    /// The priority the message was written at.
    pub priority: Priority,
    /// The message.
    pub message: String,
}

/// Keeps every message in memory. Clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of every entry written so far.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Removes and returns every entry written so far.
    pub fn take(&self) -> Vec<LogEntry> {
        core::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl LogSink for MemorySink {
    fn write(&self, priority: Priority, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogEntry {
                priority,
                message: message.to_string(),
            });
    }
}
