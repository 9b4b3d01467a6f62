//! Log directory management.
//!
//! This module handles the file system layout of a log directory:
//!
//! ```text
//! <log_dir>/
//! ├─ .lock              # Advisory lock for single-writer
//! ├─ 2024-02-29.html    # Finalized segment
//! └─ 2024-03-01.html    # Segment being written (no footer yet)
//! ```
//!
//! The lock file ensures only one process writes segments at a time. Within
//! the process, an open-segment registry ensures a day's segment is held by
//! at most one [`crate::SegmentStore`].

use crate::error::{CoreError, CoreResult};
use crate::segment::is_finalized;
use chrono::NaiveDate;
use fs2::FileExt;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const LOCK_FILE: &str = ".lock";

/// A segment file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentInfo {
    /// Day the segment covers.
    pub date: NaiveDate,
    /// Full path of the file.
    pub path: PathBuf,
    /// Whether the footer has been written.
    pub finalized: bool,
}

/// Manages the log directory and holds its exclusive lock.
///
/// # Example
///
/// ```rust,ignore
/// let dir = LogDir::open(Path::new("logs"), "html", true)?;
/// println!("today: {:?}", dir.segment_path(today));
/// ```
#[derive(Debug)]
pub struct LogDir {
    path: PathBuf,
    extension: String,
    open_segments: Arc<Mutex<HashSet<NaiveDate>>>,
    _lock_file: File,
}

impl LogDir {
    /// Opens or creates a log directory and locks it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory doesn't exist and `create_if_missing` is false
    /// - Another process holds the lock (returns `LogDirLocked`)
    /// - I/O errors occur
    pub fn open(path: &Path, extension: &str, create_if_missing: bool) -> CoreResult<Self> {
        if !path.exists() {
            if create_if_missing {
                fs::create_dir_all(path)?;
            } else {
                return Err(CoreError::invalid_config(format!(
                    "log directory does not exist: {}",
                    path.display()
                )));
            }
        }

        if !path.is_dir() {
            return Err(CoreError::invalid_config(format!(
                "path is not a directory: {}",
                path.display()
            )));
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(CoreError::LogDirLocked);
        }

        Ok(Self {
            path: path.to_path_buf(),
            extension: extension.to_string(),
            open_segments: Arc::new(Mutex::new(HashSet::new())),
            _lock_file: lock_file,
        })
    }

    /// Returns the path to the log directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the segment file extension.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Returns the path of the segment for `date`.
    #[must_use]
    pub fn segment_path(&self, date: NaiveDate) -> PathBuf {
        self.path
            .join(format!("{}.{}", date.format("%Y-%m-%d"), self.extension))
    }

    /// Lists the segments in this directory, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or a segment cannot be read.
    pub fn segments(&self) -> CoreResult<Vec<SegmentInfo>> {
        Self::inspect(&self.path, &self.extension)
    }

    /// Lists the segments in `path` without taking the lock.
    ///
    /// Files whose stem is not a `YYYY-MM-DD` date are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or a segment cannot be read.
    pub fn inspect(path: &Path, extension: &str) -> CoreResult<Vec<SegmentInfo>> {
        let mut found = Vec::new();

        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let file_path = entry.path();
            if file_path.extension().and_then(|e| e.to_str()) != Some(extension) {
                continue;
            }
            let Some(stem) = file_path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Ok(date) = NaiveDate::parse_from_str(stem, "%Y-%m-%d") else {
                continue;
            };

            let contents = fs::read(&file_path)?;
            found.push(SegmentInfo {
                date,
                finalized: is_finalized(&String::from_utf8_lossy(&contents)),
                path: file_path,
            });
        }

        found.sort_by_key(|info| info.date);
        Ok(found)
    }

    /// Marks the segment for `date` as open in this process.
    ///
    /// The returned guard releases the mark when dropped.
    ///
    /// # Errors
    ///
    /// Returns `SegmentAlreadyOpen` if the day is already held.
    pub fn claim(&self, date: NaiveDate) -> CoreResult<SegmentClaim> {
        if !self.open_segments.lock().insert(date) {
            return Err(CoreError::SegmentAlreadyOpen { date });
        }
        Ok(SegmentClaim {
            date,
            registry: Arc::clone(&self.open_segments),
        })
    }

    /// Returns true if the segment for `date` is held in this process.
    #[must_use]
    pub fn is_claimed(&self, date: NaiveDate) -> bool {
        self.open_segments.lock().contains(&date)
    }

    /// Syncs the directory so a newly created segment survives a crash.
    #[cfg(unix)]
    pub fn sync_directory(&self) -> CoreResult<()> {
        let dir = File::open(&self.path)?;
        dir.sync_all()?;
        Ok(())
    }

    /// Syncs the directory so a newly created segment survives a crash.
    #[cfg(not(unix))]
    pub fn sync_directory(&self) -> CoreResult<()> {
        // NTFS journals metadata; directory handles cannot be fsynced
        Ok(())
    }
}

/// Proof that one day's segment is held in this process.
#[derive(Debug)]
pub struct SegmentClaim {
    date: NaiveDate,
    registry: Arc<Mutex<HashSet<NaiveDate>>>,
}

impl SegmentClaim {
    /// The claimed day.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Drop for SegmentClaim {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.date);
    }
}
