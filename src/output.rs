//! Inline output streams.
//!
//! Rendered reports are written to a [`Write`] implementation, standard
//! output by default. [`SharedBuffer`] is an in-memory stream whose contents
//! stay readable after the reporter took ownership of a clone.
//!
//! ```
//! use faultline::{Reporter, output::SharedBuffer};
//!
//! let buffer = SharedBuffer::new();
//! let mut reporter = Reporter::builder().output(buffer.clone()).build();
//! reporter.dump(&vec![1, 2]);
//! assert_eq!(buffer.contents(), "array(\n\t1,\n\t2\n)\n");
//! ```

use std::{
    io::{self, Write},
    sync::{Mutex, PoisonError},
};

use triomphe::Arc;

/// The boxed stream type held by a reporter.
pub type Output = Box<dyn Write + Send>;

/// An in-memory byte stream shared between clones.
#[derive(Clone, Debug, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, decoded lossily as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock().unwrap_or_else(PoisonError::into_inner))
            .into_owned()
    }

    /// Like [`contents`](Self::contents), but also clears the buffer.
    pub fn take(&self) -> String {
        let mut guard = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        let bytes = core::mem::take(&mut *guard);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Whether nothing was written since creation or the last
    /// [`take`](Self::take).
    pub fn is_empty(&self) -> bool {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
