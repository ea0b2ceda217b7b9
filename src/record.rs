//! Error events, the records built from them, and duplicate suppression.

use std::borrow::Cow;

use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;

use crate::{
    export::{Context, Value},
    severity::{ErrorCode, Priority, Severity},
};

/// File name used when the host did not say where an error happened.
pub const INTERNAL_FILE: &str = "[internal]";

/// Line text used when the host did not provide a line number.
pub const UNKNOWN_LINE: &str = "??";

/// An error as signalled by the host, before classification.
///
/// # Examples
///
/// ```
/// use faultline::{ErrorEvent, context, severity::ErrorCode};
///
/// let event = ErrorEvent::new(ErrorCode::WARNING, "Undefined index: foo")
///     .at("/app/a.rs", 10)
///     .with_context(context! { "x" => 5 });
/// assert_eq!(event.line, Some(10));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorEvent {
    /// The raw error code.
    pub code: ErrorCode,
    /// Human-readable description.
    pub description: String,
    /// Source file, if known.
    pub file: Option<String>,
    /// Source line, if known.
    pub line: Option<u32>,
    /// Variables in scope when the error was raised.
    pub context: Context,
}

impl ErrorEvent {
    /// Creates an event without location or context.
    pub fn new(code: impl Into<ErrorCode>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            file: None,
            line: None,
            context: Context::default(),
        }
    }

    /// Sets the source location.
    #[must_use]
    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    /// Replaces the context variables.
    #[must_use]
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Adds a single context variable.
    #[must_use]
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(name.into(), value.into());
        self
    }

    /// The event's identity for duplicate suppression. Missing locations are
    /// normalized the same way records normalize them.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            code: self.code,
            description: self.description.clone(),
            file: normalize_file(self.file.as_deref()).into_owned(),
            line: normalize_line(self.line),
        }
    }
}

pub(crate) fn normalize_file(file: Option<&str>) -> Cow<'_, str> {
    match file {
        Some(file) if !file.is_empty() => Cow::Borrowed(file),
        _ => Cow::Borrowed(INTERNAL_FILE),
    }
}

pub(crate) fn normalize_line(line: Option<u32>) -> Option<u32> {
    line.filter(|&line| line != 0)
}

/// Formats an optional line number, using `??` when it is missing.
pub fn line_text(line: Option<u32>) -> Cow<'static, str> {
    match line {
        Some(line) => Cow::Owned(line.to_string()),
        None => Cow::Borrowed(UNKNOWN_LINE),
    }
}

/// A classified error that passed duplicate suppression.
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorRecord {
    /// The raw error code.
    pub code: ErrorCode,
    /// The classified severity.
    pub severity: Severity,
    /// Log priority derived from the severity.
    pub priority: Priority,
    /// Description, with any help-code suffix removed.
    pub description: String,
    /// Help code taken from a trailing `[digits]` suffix, as written.
    pub help_id: Option<String>,
    /// Source file, or `[internal]`.
    pub file: String,
    /// `file` after path-alias trimming.
    pub path: String,
    /// Source line, if known.
    pub line: Option<u32>,
    /// Variables in scope when the error was raised.
    pub context: Context,
}

impl ErrorRecord {
    /// The line number as rendered in reports.
    pub fn line_text(&self) -> Cow<'static, str> {
        line_text(self.line)
    }
}

/// The identity of an error for duplicate suppression.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    /// The raw error code.
    pub code: ErrorCode,
    /// The description exactly as raised.
    pub description: String,
    /// Source file, or `[internal]`.
    pub file: String,
    /// Source line, if known.
    pub line: Option<u32>,
}

/// Remembers every fingerprint seen so far, in the order first seen.
#[derive(Clone, Debug, Default)]
pub struct Deduplicator {
    seen: IndexSet<Fingerprint, FxBuildHasher>,
}

impl Deduplicator {
    /// Creates an empty deduplicator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `fingerprint`, returning `false` if it was seen before.
    pub fn insert(&mut self, fingerprint: Fingerprint) -> bool {
        self.seen.insert(fingerprint)
    }

    /// Whether `fingerprint` was seen before.
    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.seen.contains(fingerprint)
    }

    /// Number of distinct errors seen.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether no error was seen yet.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Fingerprints in the order they were first seen.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Fingerprint> {
        self.seen.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_location_is_normalized() {
        let fingerprint = ErrorEvent::new(ErrorCode::NOTICE, "oops").fingerprint();
        assert_eq!(fingerprint.file, INTERNAL_FILE);
        assert_eq!(fingerprint.line, None);
        assert_eq!(line_text(fingerprint.line), UNKNOWN_LINE);

        let fingerprint = ErrorEvent::new(ErrorCode::NOTICE, "oops")
            .at("", 0)
            .fingerprint();
        assert_eq!(fingerprint.file, INTERNAL_FILE);
        assert_eq!(fingerprint.line, None);
    }

    #[test]
    fn test_deduplicator_keeps_first_seen_order() {
        let mut seen = Deduplicator::new();
        let a = ErrorEvent::new(ErrorCode::WARNING, "a").at("x.rs", 1);
        let b = ErrorEvent::new(ErrorCode::WARNING, "b").at("x.rs", 1);

        assert!(seen.insert(a.fingerprint()));
        assert!(seen.insert(b.fingerprint()));
        assert!(!seen.insert(a.fingerprint()));
        assert!(!seen.insert(a.clone().with_var("ignored", 1).fingerprint()));

        let descriptions: Vec<&str> = seen.iter().map(|f| f.description.as_str()).collect();
        assert_eq!(descriptions, ["a", "b"]);
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_fingerprint_distinguishes_each_field() {
        let base = ErrorEvent::new(ErrorCode::WARNING, "a").at("x.rs", 1);
        let mut seen = Deduplicator::new();
        assert!(seen.insert(base.fingerprint()));
        let other_code = ErrorEvent {
            code: ErrorCode::USER_WARNING,
            ..base.clone()
        };
        assert!(seen.insert(other_code.fingerprint()));
        let other_description = ErrorEvent {
            description: "b".into(),
            ..base.clone()
        };
        assert!(seen.insert(other_description.fingerprint()));
        assert!(seen.insert(base.clone().at("y.rs", 1).fingerprint()));
        assert!(seen.insert(base.clone().at("x.rs", 2).fingerprint()));
        assert_eq!(seen.len(), 5);
    }
}
