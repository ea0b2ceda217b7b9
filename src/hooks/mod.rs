//! Process-wide registration of a reporter.
//!
//! Most hosts have a single reporter that every part of the program should
//! reach. [`install`] puts one into a global slot; [`raise`] and the
//! [`notice!`](crate::notice), [`warning!`](crate::warning) and
//! [`fatal!`](crate::fatal) macros then report through it, capturing the
//! caller's file and line. When nothing is installed they do nothing.
//!
//! ```
//! use faultline::{Reporter, hooks, output::SharedBuffer, templates::Channel, warning};
//!
//! let output = SharedBuffer::new();
//! let mut reporter = Reporter::builder().output(output.clone()).build();
//! reporter.set_channel(Channel::Text);
//! hooks::install(reporter).expect("a reporter is already installed");
//!
//! let disposition = warning!("cache miss for {}", "users");
//! assert!(disposition.is_handled());
//! assert!(output.contents().starts_with("Warning: 512 :: cache miss for users on line"));
//!
//! hooks::uninstall();
//! ```
//!
//! The shared reporter is guarded by a single mutex. A fatal error raised
//! while another thread holds the lock waits for it.

mod hook_lock;

use core::{fmt, panic::Location};
use std::sync::{Mutex, MutexGuard, PoisonError};

use triomphe::Arc;

use self::hook_lock::HookLock;
use crate::{
    export::Context,
    record::ErrorEvent,
    reporter::{Disposition, Reporter},
    severity::ErrorCode,
};

/// A reporter shared between threads.
pub type SharedReporter = Arc<Mutex<Reporter>>;

static REPORTER: HookLock<SharedReporter> = HookLock::new();

/// Error returned by [`install`] when a reporter is already installed.
///
/// Contains the reporter that was not installed.
pub struct AlreadyInstalledError(pub Reporter);

impl fmt::Debug for AlreadyInstalledError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlreadyInstalledError").finish()
    }
}

impl fmt::Display for AlreadyInstalledError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a reporter is already installed globally")
    }
}

impl core::error::Error for AlreadyInstalledError {}

/// Installs `reporter` globally and returns a handle to it.
pub fn install(reporter: Reporter) -> Result<SharedReporter, AlreadyInstalledError> {
    let mut slot = REPORTER.write();
    if slot.is_some() {
        return Err(AlreadyInstalledError(reporter));
    }
    let shared = Arc::new(Mutex::new(reporter));
    *slot = Some(shared.clone());
    Ok(shared)
}

/// Removes the installed reporter, returning it.
pub fn uninstall() -> Option<SharedReporter> {
    REPORTER.write().take()
}

/// A handle to the installed reporter, if any.
pub fn installed() -> Option<SharedReporter> {
    REPORTER.read().clone()
}

/// Locks a shared reporter. A poisoned lock is recovered, since a panicking
/// fatal handler leaves the reporter in a consistent state.
pub fn lock(reporter: &SharedReporter) -> MutexGuard<'_, Reporter> {
    reporter.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Reports an error at the caller's location through the installed
/// reporter.
///
/// Returns [`Disposition::Ignored`] when no reporter is installed.
#[track_caller]
pub fn raise(code: ErrorCode, description: impl Into<String>, context: Context) -> Disposition {
    let location = Location::caller();
    let Some(reporter) = installed() else {
        return Disposition::Ignored;
    };
    let event = ErrorEvent::new(code, description)
        .at(location.file(), location.line())
        .with_context(context);
    lock(&reporter).handle_error(event)
}

/// Routes panics through the installed reporter as
/// [`ErrorCode::USER_ERROR`] events.
///
/// Panics therefore end with the reporter's fatal handler. When no reporter
/// is installed, or it is busy, the previously registered panic hook runs
/// instead.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let Some(reporter) = installed() else {
            return previous(info);
        };
        let Ok(mut reporter) = reporter.try_lock() else {
            return previous(info);
        };
        let description = info.payload_as_str().unwrap_or("Box<dyn Any>");
        let mut event = ErrorEvent::new(ErrorCode::USER_ERROR, description);
        if let Some(location) = info.location() {
            event = event.at(location.file(), location.line());
        }
        reporter.handle_error(event);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    static_assertions::assert_impl_all!(SharedReporter: Send, Sync, Clone);

    #[test]
    fn test_already_installed_error() {
        let error = AlreadyInstalledError(Reporter::new());
        assert_eq!(error.to_string(), "a reporter is already installed globally");
        assert_eq!(format!("{error:?}"), "AlreadyInstalledError");
    }
}
