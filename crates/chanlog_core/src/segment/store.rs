//! One day's segment: open or resume, append, finalize.

use crate::dir::{LogDir, SegmentClaim};
use crate::error::{CoreError, CoreResult};
use crate::render::LogLine;
use crate::segment::layout::SegmentFormat;
use chanlog_storage::{FileBackend, OpenMode, StorageBackend};
use chrono::{FixedOffset, NaiveDate};
use tracing::{debug, info};

/// Lifecycle state of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentState {
    /// Created by this store; the preamble was written on open.
    Fresh,
    /// Reopened after a restart; the preamble was already there.
    Resumed,
    /// Finalized; no further writes are accepted.
    Closed,
}

/// Exclusive owner of one day's segment file.
///
/// Every successful [`append`](Self::append) has been flushed to the OS
/// before it returns. A store dropped without [`finalize`](Self::finalize)
/// leaves a footerless file that the next open resumes.
pub struct SegmentStore {
    date: NaiveDate,
    state: SegmentState,
    backend: Box<dyn StorageBackend>,
    sync_on_append: bool,
    _claim: Option<SegmentClaim>,
}

impl SegmentStore {
    /// Opens the segment for `date` in `dir`, creating it if needed.
    ///
    /// A missing or empty file gets a preamble and the store starts
    /// [`Fresh`](SegmentState::Fresh). An existing non-empty file is
    /// appended to as-is and the store starts
    /// [`Resumed`](SegmentState::Resumed).
    ///
    /// # Errors
    ///
    /// Returns `SegmentAlreadyOpen` if this process already holds the day,
    /// or a storage error if the file cannot be opened or the preamble
    /// cannot be written.
    pub fn open_or_resume(
        dir: &LogDir,
        date: NaiveDate,
        offset: FixedOffset,
        format: &SegmentFormat,
    ) -> CoreResult<Self> {
        let claim = dir.claim(date)?;
        let path = dir.segment_path(date);

        let (backend, mode) = FileBackend::open_or_create(&path)?;
        if mode == OpenMode::Created {
            dir.sync_directory()?;
        }

        let mut store = Self::with_backend(date, Box::new(backend), offset, format)?;
        store._claim = Some(claim);

        info!(
            date = %date,
            path = %path.display(),
            state = ?store.state,
            "opened log segment"
        );
        Ok(store)
    }

    /// Wraps an already-open backend.
    ///
    /// The preamble is written if and only if the backend is empty.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the size cannot be read or the preamble
    /// cannot be written.
    pub fn with_backend(
        date: NaiveDate,
        backend: Box<dyn StorageBackend>,
        offset: FixedOffset,
        format: &SegmentFormat,
    ) -> CoreResult<Self> {
        let fresh = backend.size()? == 0;
        let mut store = Self {
            date,
            state: if fresh {
                SegmentState::Fresh
            } else {
                SegmentState::Resumed
            },
            backend,
            sync_on_append: false,
            _claim: None,
        };

        if fresh {
            store.write_through(format.preamble(date, offset).as_bytes())?;
            store.backend.sync()?;
        }

        Ok(store)
    }

    /// Also fsync after every appended line.
    #[must_use]
    pub fn sync_on_append(mut self, value: bool) -> Self {
        self.sync_on_append = value;
        self
    }

    /// The day this segment covers.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SegmentState {
        self.state
    }

    /// Appends a rendered line and flushes it.
    ///
    /// # Errors
    ///
    /// Returns `SegmentClosed` after [`finalize`](Self::finalize), or a
    /// storage error if the write fails. Failed writes are not retried.
    pub fn append(&mut self, line: &LogLine) -> CoreResult<u64> {
        self.ensure_open()?;
        let offset = self.write_through(line.markup.as_bytes())?;
        if self.sync_on_append {
            self.backend.sync()?;
        }
        debug!(date = %self.date, anchor = %line.anchor, offset, "appended line");
        Ok(offset)
    }

    /// Writes the footer and closes the segment for writing.
    ///
    /// # Errors
    ///
    /// Returns `SegmentClosed` if already finalized, or a storage error if
    /// the footer cannot be written and synced. On error the state is left
    /// unchanged.
    pub fn finalize(&mut self, format: &SegmentFormat) -> CoreResult<()> {
        self.ensure_open()?;
        self.write_through(format.footer().as_bytes())?;
        self.backend.sync()?;
        self.state = SegmentState::Closed;
        info!(date = %self.date, "finalized log segment");
        Ok(())
    }

    /// Syncs and releases the segment without writing a footer.
    ///
    /// The file stays resumable.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the final sync fails; the handle is
    /// released either way.
    pub fn release(mut self) -> CoreResult<()> {
        if self.state != SegmentState::Closed {
            self.backend.flush()?;
            self.backend.sync()?;
        }
        Ok(())
    }

    /// Reads the whole segment as text.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the read fails.
    pub fn contents(&self) -> CoreResult<String> {
        let bytes = self.backend.read_all()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn ensure_open(&self) -> CoreResult<()> {
        if self.state == SegmentState::Closed {
            return Err(CoreError::SegmentClosed { date: self.date });
        }
        Ok(())
    }

    fn write_through(&mut self, bytes: &[u8]) -> CoreResult<u64> {
        let offset = self.backend.append(bytes)?;
        self.backend.flush()?;
        Ok(offset)
    }
}

impl std::fmt::Debug for SegmentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentStore")
            .field("date", &self.date)
            .field("state", &self.state)
            .field("sync_on_append", &self.sync_on_append)
            .finish_non_exhaustive()
    }
}
