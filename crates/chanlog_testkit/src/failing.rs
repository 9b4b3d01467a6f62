//! Failure injection for storage backends.
//!
//! [`FailingBackend`] wraps another backend and fails writes, flushes or
//! syncs when its [`FailureSwitch`] says so. The switch is shared, so a test
//! can flip it after the backend has been handed to a `SegmentStore`.
//!
//! ```rust,ignore
//! let (backend, switch) = FailingBackend::wrap(Box::new(InMemoryBackend::new()));
//! let mut store = SegmentStore::with_backend(date, Box::new(backend), offset, &format)?;
//! switch.fail_appends_after(0);
//! assert!(store.append(&line).is_err());
//! ```

use chanlog_storage::{StorageBackend, StorageError, StorageResult};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared control for a [`FailingBackend`].
#[derive(Debug)]
pub struct FailureSwitch {
    fail_after_bytes: AtomicUsize,
    bytes_written: AtomicUsize,
    fail_on_sync: AtomicBool,
    failures: AtomicUsize,
}

impl FailureSwitch {
    fn new() -> Self {
        Self {
            fail_after_bytes: AtomicUsize::new(usize::MAX),
            bytes_written: AtomicUsize::new(0),
            fail_on_sync: AtomicBool::new(false),
            failures: AtomicUsize::new(0),
        }
    }

    /// Fails any append once `bytes` more bytes have been written.
    ///
    /// A write that straddles the limit is cut short at it.
    pub fn fail_appends_after(&self, bytes: usize) {
        let written = self.bytes_written.load(Ordering::SeqCst);
        self.fail_after_bytes
            .store(written.saturating_add(bytes), Ordering::SeqCst);
    }

    /// Sets whether flush and sync fail.
    pub fn set_fail_on_sync(&self, fail: bool) {
        self.fail_on_sync.store(fail, Ordering::SeqCst);
    }

    /// Stops injecting failures.
    pub fn heal(&self) {
        self.fail_after_bytes.store(usize::MAX, Ordering::SeqCst);
        self.fail_on_sync.store(false, Ordering::SeqCst);
    }

    /// Number of operations failed so far.
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }

    fn fail(&self, what: &str) -> StorageError {
        self.failures.fetch_add(1, Ordering::SeqCst);
        StorageError::Io(io::Error::new(
            io::ErrorKind::Other,
            format!("simulated failure during {what}"),
        ))
    }
}

/// A storage backend that fails on demand.
pub struct FailingBackend {
    inner: Box<dyn StorageBackend>,
    switch: Arc<FailureSwitch>,
}

impl FailingBackend {
    /// Wraps `inner`, returning the backend and its switch.
    pub fn wrap(inner: Box<dyn StorageBackend>) -> (Self, Arc<FailureSwitch>) {
        let switch = Arc::new(FailureSwitch::new());
        let backend = Self {
            inner,
            switch: Arc::clone(&switch),
        };
        (backend, switch)
    }
}

impl StorageBackend for FailingBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        self.inner.read_at(offset, len)
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        let limit = self.switch.fail_after_bytes.load(Ordering::SeqCst);
        let written = self.switch.bytes_written.load(Ordering::SeqCst);

        if written >= limit {
            return Err(self.switch.fail("write"));
        }

        if written + data.len() > limit {
            let partial = limit - written;
            self.inner.append(&data[..partial])?;
            self.switch.bytes_written.fetch_add(partial, Ordering::SeqCst);
            return Err(self.switch.fail("partial write"));
        }

        let offset = self.inner.append(data)?;
        self.switch
            .bytes_written
            .fetch_add(data.len(), Ordering::SeqCst);
        Ok(offset)
    }

    fn flush(&mut self) -> StorageResult<()> {
        if self.switch.fail_on_sync.load(Ordering::SeqCst) {
            return Err(self.switch.fail("flush"));
        }
        self.inner.flush()
    }

    fn size(&self) -> StorageResult<u64> {
        self.inner.size()
    }

    fn sync(&mut self) -> StorageResult<()> {
        if self.switch.fail_on_sync.load(Ordering::SeqCst) {
            return Err(self.switch.fail("sync"));
        }
        self.inner.sync()
    }
}
