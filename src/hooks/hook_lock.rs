use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A process-wide slot that is empty until something is installed.
#[repr(transparent)]
pub(crate) struct HookLock<T: 'static + Send + Sync>(RwLock<Option<T>>);

impl<T: 'static + Send + Sync> HookLock<T> {
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self(RwLock::new(None))
    }

    #[inline]
    pub(crate) fn read(&'static self) -> RwLockReadGuard<'static, Option<T>> {
        self.0.read().expect("Unable to acquire hook lock")
    }

    #[inline]
    pub(crate) fn write(&'static self) -> RwLockWriteGuard<'static, Option<T>> {
        self.0.write().expect("Unable to acquire hook lock")
    }
}
