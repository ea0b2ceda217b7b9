//! Error codes and their classification into severities.
//!
//! A host signals errors with a raw numeric [`ErrorCode`]. The reporter maps
//! each code to a [`Severity`] and the log [`Priority`] used when mirroring
//! the report to a [`LogSink`](crate::sink::LogSink). Codes with no mapping
//! are ignored entirely.
//!
//! ```
//! use faultline::severity::{ErrorCode, Priority, Severity, classify};
//!
//! assert_eq!(
//!     classify(ErrorCode::USER_WARNING),
//!     Some((Severity::Warning, Priority::Warning))
//! );
//! assert_eq!(classify(ErrorCode::STRICT), None);
//! ```

use core::fmt;

/// A raw error code as signalled by the host runtime.
///
/// The named constants form a bit-flag table; only single flags are ever
/// classified.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ErrorCode(pub u32);

impl ErrorCode {
    /// Fatal runtime error.
    pub const ERROR: Self = Self(1);
    /// Runtime warning.
    pub const WARNING: Self = Self(2);
    /// Source could not be parsed.
    pub const PARSE: Self = Self(4);
    /// Runtime notice.
    pub const NOTICE: Self = Self(8);
    /// Fatal error raised during host startup.
    pub const CORE_ERROR: Self = Self(16);
    /// Warning raised during host startup.
    pub const CORE_WARNING: Self = Self(32);
    /// Fatal compile-time error.
    pub const COMPILE_ERROR: Self = Self(64);
    /// Compile-time warning.
    pub const COMPILE_WARNING: Self = Self(128);
    /// Fatal error raised by user code.
    pub const USER_ERROR: Self = Self(256);
    /// Warning raised by user code.
    pub const USER_WARNING: Self = Self(512);
    /// Notice raised by user code.
    pub const USER_NOTICE: Self = Self(1024);
    /// Code-style suggestion. Never reported.
    pub const STRICT: Self = Self(2048);
    /// Error the host could recover from.
    pub const RECOVERABLE_ERROR: Self = Self(4096);
    /// Use of a deprecated feature.
    pub const DEPRECATED: Self = Self(8192);
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<u32> for ErrorCode {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// How serious a reported error is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Execution cannot continue. The reporter fails fast after emitting.
    Fatal,
    /// Something went wrong but execution continues.
    Warning,
    /// Informational; execution continues.
    Notice,
}

impl Severity {
    /// The label shown in rendered reports, e.g. `Fatal Error`.
    pub const fn label(self) -> &'static str {
        match self {
            Severity::Fatal => "Fatal Error",
            Severity::Warning => "Warning",
            Severity::Notice => "Notice",
        }
    }

    /// The log priority associated with this severity.
    pub const fn priority(self) -> Priority {
        match self {
            Severity::Fatal => Priority::Error,
            Severity::Warning => Priority::Warning,
            Severity::Notice => Priority::Notice,
        }
    }

    /// Returns `true` for [`Severity::Fatal`].
    pub const fn is_fatal(self) -> bool {
        matches!(self, Severity::Fatal)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Priority of a message written to a log sink.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    /// Error conditions.
    Error,
    /// Warning conditions.
    Warning,
    /// Normal but significant conditions.
    Notice,
    /// Debug-level messages.
    Debug,
}

impl Priority {
    /// Lowercase name, as used in log lines.
    pub const fn as_str(self) -> &'static str {
        match self {
            Priority::Error => "error",
            Priority::Warning => "warning",
            Priority::Notice => "notice",
            Priority::Debug => "debug",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a raw code to its severity and log priority.
///
/// Returns `None` for codes the reporter does not handle.
pub const fn classify(code: ErrorCode) -> Option<(Severity, Priority)> {
    let severity = match code {
        ErrorCode::PARSE
        | ErrorCode::ERROR
        | ErrorCode::CORE_ERROR
        | ErrorCode::COMPILE_ERROR
        | ErrorCode::USER_ERROR => Severity::Fatal,
        ErrorCode::WARNING
        | ErrorCode::USER_WARNING
        | ErrorCode::COMPILE_WARNING
        | ErrorCode::RECOVERABLE_ERROR => Severity::Warning,
        ErrorCode::NOTICE | ErrorCode::USER_NOTICE => Severity::Notice,
        _ => return None,
    };
    Some((severity, severity.priority()))
}
