#![deny(
    missing_docs,
    unsafe_code,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A debug and error reporter for hosts that signal errors, warnings and
//! notices at runtime.
//!
//! ## Overview
//!
//! A [`Reporter`] receives [`ErrorEvent`]s, each carrying a raw numeric
//! [`ErrorCode`](severity::ErrorCode), a description, an optional source
//! location and the variables that were in scope. For every event it:
//!
//! 1. classifies the code into a [`Severity`](severity::Severity), ignoring
//!    codes it does not know;
//! 2. drops the event if an identical one was already reported;
//! 3. captures a trace from its [`StackSource`](stack::StackSource);
//! 4. renders the report with the templates of the active
//!    [`Channel`](templates::Channel) and writes it to the inline output;
//! 5. mirrors a one-line summary to the [`LogSink`](sink::LogSink) when
//!    logging is enabled;
//! 6. calls the fatal handler for fatal errors, which by default exits the
//!    process.
//!
//! ```
//! use faultline::{
//!     ErrorEvent, Reporter, context,
//!     output::SharedBuffer,
//!     severity::ErrorCode,
//!     templates::Channel,
//! };
//!
//! let output = SharedBuffer::new();
//! let mut reporter = Reporter::builder().output(output.clone()).build();
//! reporter.set_channel(Channel::Text);
//!
//! reporter.handle_error(
//!     ErrorEvent::new(ErrorCode::WARNING, "Undefined index: foo")
//!         .at("/app/a.rs", 10)
//!         .with_context(context! { "x" => 5 }),
//! );
//!
//! let report = output.contents();
//! assert!(report.starts_with("Warning: 2 :: Undefined index: foo on line 10 of /app/a.rs\n"));
//! assert!(report.contains("Context:\n$x = 5\n"));
//! ```
//!
//! ## Channels
//!
//! - `js` (default): HTML whose code, context and trace sections can be
//!   toggled with inline JavaScript.
//! - `html`: static HTML.
//! - `txt`: plain text.
//! - `log`: nothing inline; the report goes to the log sink.
//! - `buffered`: nothing at all; records are kept until
//!   [`Reporter::drain_buffered`].
//!
//! Templates of every channel can be adjusted with
//! [`Reporter::set_templates`].
//!
//! ## Ecosystem
//!
//! - **`faultline-backtrace`** - a [`StackSource`](stack::StackSource) backed
//!   by the native process stack.
//!
//! ## Global registration
//!
//! Hosts that want a single reporter for the whole process can install one
//! with [`hooks::install`] and raise errors with the [`notice!`], [`warning!`]
//! and [`fatal!`] macros.

#[macro_use]
mod macros;

pub mod config;
pub mod excerpt;
pub mod export;
pub mod hooks;
pub mod output;
pub mod path;
pub mod prelude;
pub mod record;
mod render;
mod reporter;
pub mod severity;
pub mod sink;
pub mod stack;
pub mod templates;
mod util;

pub use self::{
    config::ReporterConfig,
    record::{ErrorEvent, ErrorRecord},
    reporter::{
        BufferedRecord, Disposition, FatalHandler, Reporter, ReporterBuilder, exit_on_fatal,
    },
};

#[doc(hidden)]
pub mod __private {
    // Used by faultline-backtrace
    pub const FAULTLINE_LOCATION: &core::panic::Location = core::panic::Location::caller();

    use core::fmt;
    #[doc(hidden)]
    pub use std::{format_args, string::ToString};

    use crate::{Disposition, export::Context, severity::ErrorCode};

    #[doc(hidden)]
    #[inline]
    #[cold]
    #[track_caller]
    pub fn raise_fmt(code: ErrorCode, args: fmt::Arguments<'_>) -> Disposition {
        let description = match args.as_str() {
            Some(message) => message.to_string(),
            None => std::fmt::format(args),
        };
        crate::hooks::raise(code, description, Context::default())
    }
}
