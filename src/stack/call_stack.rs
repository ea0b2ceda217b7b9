use std::sync::{Mutex, MutexGuard, PoisonError};

use triomphe::Arc;

use super::{StackFrame, StackSource};

/// A call stack maintained by the host.
///
/// Clones share the same frames, so one handle can be given to the reporter
/// while the host keeps another to push and pop frames as it calls and
/// returns.
#[derive(Clone, Debug, Default)]
pub struct CallStack {
    frames: Arc<Mutex<Vec<StackFrame>>>,
}

/// Removes a frame pushed with [`CallStack::enter`] when dropped.
#[derive(Debug)]
#[must_use = "the frame is popped as soon as the guard is dropped"]
pub struct FrameGuard {
    stack: CallStack,
    depth: usize,
}

impl CallStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StackFrame>> {
        self.frames.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pushes a frame on top of the stack.
    pub fn push(&self, frame: StackFrame) {
        self.lock().push(frame);
    }

    /// Pops the topmost frame.
    pub fn pop(&self) -> Option<StackFrame> {
        self.lock().pop()
    }

    /// Pushes a frame and returns a guard that pops it, and anything pushed
    /// above it, when dropped.
    pub fn enter(&self, frame: StackFrame) -> FrameGuard {
        let mut frames = self.lock();
        let depth = frames.len();
        frames.push(frame);
        FrameGuard {
            stack: self.clone(),
            depth,
        }
    }

    /// Runs `f` with `frame` pushed on the stack.
    pub fn with_frame<R>(&self, frame: StackFrame, f: impl FnOnce() -> R) -> R {
        let _guard = self.enter(frame);
        f()
    }

    /// Number of frames on the stack.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        self.stack.lock().truncate(self.depth);
    }
}

impl StackSource for CallStack {
    fn capture(&self) -> Vec<StackFrame> {
        self.lock().iter().rev().cloned().collect()
    }
}
