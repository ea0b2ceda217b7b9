//! Call-stack capture and trace formatting.
//!
//! A [`StackSource`] produces the raw frames of the current call stack, most
//! recent first. The reporter walks those frames to build a trace: it
//! resolves each frame to a reference such as `Users::create(1)`, drops
//! wrapper frames and renders the result in one of the [`TraceFormat`]s.
//!
//! Two sources exist. [`CallStack`] is maintained by hand and suits
//! interpreter-style hosts that track their own frames; it is the default.
//! The `faultline-backtrace` crate provides a source backed by the native
//! process stack.
//!
//! ```
//! use faultline::stack::{CallStack, StackFrame, StackSource};
//!
//! let stack = CallStack::new();
//! let _main = stack.enter(StackFrame::function("main").at("/app/main.rs", 3));
//! let _run = stack.enter(StackFrame::method("Server", "run").at("/app/server.rs", 40));
//!
//! let frames = stack.capture();
//! assert_eq!(frames[0].function.as_deref(), Some("run"));
//! assert_eq!(frames[1].function.as_deref(), Some("main"));
//! ```

mod call_stack;
mod trace;

pub use self::{
    call_stack::{CallStack, FrameGuard},
    trace::{MAIN_REFERENCE, Point, Trace, TraceFormat, TraceFrame, TraceOptions},
};
pub(crate) use self::trace::{points, render_lines, walk};

use crate::export::Value;

/// A raw frame produced by a [`StackSource`].
///
/// `file` and `line` describe a position inside `function`. A frame without a
/// function stands for top-level code.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StackFrame {
    /// The class or type the function belongs to.
    pub class: Option<String>,
    /// The function name, without its class.
    pub function: Option<String>,
    /// Source file, if known.
    pub file: Option<String>,
    /// Source line, if known.
    pub line: Option<u32>,
    /// The arguments the function was called with, if the source tracks them.
    pub args: Option<Vec<Value>>,
}

impl StackFrame {
    /// A frame for a free function.
    pub fn function(name: impl Into<String>) -> Self {
        Self {
            function: Some(name.into()),
            ..Self::default()
        }
    }

    /// A frame for a method of `class`.
    pub fn method(class: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            class: Some(class.into()),
            function: Some(name.into()),
            ..Self::default()
        }
    }

    /// Sets the position inside the function.
    #[must_use]
    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    /// Sets the call arguments.
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = Value>) -> Self {
        self.args = Some(args.into_iter().collect());
        self
    }
}

/// Something that can snapshot the current call stack.
///
/// Frames are returned most recent first. Closures returning a frame list
/// implement this trait too.
pub trait StackSource: Send + 'static {
    /// Returns the frames of the current call stack.
    fn capture(&self) -> Vec<StackFrame>;
}

impl<F> StackSource for F
where
    F: Fn() -> Vec<StackFrame> + Send + 'static,
{
    fn capture(&self) -> Vec<StackFrame> {
        self()
    }
}
