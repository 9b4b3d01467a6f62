//! File-based storage backend for segment files.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// How [`FileBackend::open_or_create`] obtained its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// The file did not exist and was created empty.
    Created,
    /// The file already existed and was opened for appending.
    Existing,
}

/// A file-based storage backend.
///
/// The file is opened in append mode, so every `append` lands at the end of
/// the file even if another handle has grown it in the meantime.
///
/// # Durability
///
/// - `flush()` calls `File::flush()` to push data to the OS
/// - `sync()` calls `File::sync_all()` to ensure data is on disk
///
/// # Example
///
/// ```no_run
/// use chanlog_storage::{StorageBackend, FileBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::open(Path::new("2024-03-01.html")).unwrap();
/// backend.append(b"<tr></tr>\n").unwrap();
/// backend.flush().unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    file: RwLock<File>,
    size: RwLock<u64>,
}

impl FileBackend {
    /// Opens or creates a file backend at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or created.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;
        Self::from_file(path, file)
    }

    /// Creates a brand-new file, failing if it already exists.
    ///
    /// # Errors
    ///
    /// Returns an `AlreadyExists` I/O error if the file is present.
    pub fn create_new(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create_new(true)
            .open(path)?;
        Self::from_file(path, file)
    }

    /// Creates the file if it is missing, otherwise opens it for appending.
    ///
    /// The existence check and the creation are a single atomic
    /// `create_new` call, so two racing callers never both see `Created`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can neither be created nor opened.
    pub fn open_or_create(path: &Path) -> StorageResult<(Self, OpenMode)> {
        match Self::create_new(path) {
            Ok(backend) => Ok((backend, OpenMode::Created)),
            Err(StorageError::Io(e)) if e.kind() == io::ErrorKind::AlreadyExists => {
                Ok((Self::open(path)?, OpenMode::Existing))
            }
            Err(e) => Err(e),
        }
    }

    /// Opens or creates a file backend, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or file cannot be opened.
    pub fn open_with_create_dirs(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open(path)
    }

    fn from_file(path: &Path, file: File) -> StorageResult<Self> {
        let size = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file: RwLock::new(file),
            size: RwLock::new(size),
        })
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for FileBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let size = *self.size.read();
        let end = offset.saturating_add(len as u64);

        if offset > size || end > size {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        if len == 0 {
            return Ok(Vec::new());
        }

        let mut file = self.file.write();
        file.seek(SeekFrom::Start(offset))?;

        let mut buffer = vec![0u8; len];
        file.read_exact(&mut buffer)?;

        Ok(buffer)
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        if data.is_empty() {
            return Ok(*self.size.read());
        }

        let mut file = self.file.write();
        let mut size = self.size.write();

        let offset = *size;
        if let Err(e) = file.write_all(data) {
            // a short write leaves its prefix on disk
            resync_size(&file, &mut size);
            return Err(e.into());
        }
        *size += data.len() as u64;

        Ok(offset)
    }

    fn flush(&mut self) -> StorageResult<()> {
        let mut file = self.file.write();
        file.flush()?;
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(*self.size.read())
    }

    fn sync(&mut self) -> StorageResult<()> {
        let file = self.file.write();
        file.sync_all()?;
        Ok(())
    }
}

/// Reloads the cached size from the file's metadata.
///
/// Leaves the cache untouched when the metadata cannot be read.
fn resync_size(file: &File, size: &mut u64) {
    if let Ok(meta) = file.metadata() {
        *size = meta.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn resync_picks_up_bytes_written_behind_the_cache() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seg.html");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.append(b"<tr>").unwrap();

        // stands in for the prefix a failed write_all leaves behind
        let mut other = OpenOptions::new().append(true).open(&path).unwrap();
        other.write_all(b"</t").unwrap();
        assert_eq!(backend.size().unwrap(), 4);

        {
            let file = backend.file.read();
            let mut size = backend.size.write();
            resync_size(&file, &mut size);
        }
        assert_eq!(backend.size().unwrap(), 7);
        assert_eq!(backend.read_all().unwrap(), b"<tr></t");

        let offset = backend.append(b"r>").unwrap();
        assert_eq!(offset, 7);
        assert_eq!(backend.read_all().unwrap(), b"<tr></tr>");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn failed_append_keeps_size_in_step_with_file() {
        let path = Path::new("/dev/full");
        let Ok(mut backend) = FileBackend::open(path) else {
            return;
        };

        assert!(matches!(backend.append(b"<tr></tr>"), Err(StorageError::Io(_))));
        assert_eq!(backend.size().unwrap(), std::fs::metadata(path).unwrap().len());
    }

    #[test]
    fn file_create_new() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("2024-03-01.html");

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 0);
        assert!(path.exists());
    }

    #[test]
    fn file_append_and_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seg.html");

        let mut backend = FileBackend::open(&path).unwrap();

        let offset1 = backend.append(b"<tr>").unwrap();
        assert_eq!(offset1, 0);

        let offset2 = backend.append(b"</tr>").unwrap();
        assert_eq!(offset2, 4);

        assert_eq!(backend.size().unwrap(), 9);
        assert_eq!(backend.read_all().unwrap(), b"<tr></tr>");
    }

    #[test]
    fn file_read_past_end_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seg.html");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.append(b"hello").unwrap();

        let result = backend.read_at(10, 5);
        assert!(matches!(result, Err(StorageError::ReadPastEnd { .. })));
    }

    #[test]
    fn file_reopen_appends_after_existing_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seg.html");

        {
            let mut backend = FileBackend::open(&path).unwrap();
            backend.append(b"first\n").unwrap();
            backend.flush().unwrap();
        }

        {
            let mut backend = FileBackend::open(&path).unwrap();
            assert_eq!(backend.size().unwrap(), 6);
            let offset = backend.append(b"second\n").unwrap();
            assert_eq!(offset, 6);
        }

        let content = std::fs::read(&path).unwrap();
        assert_eq!(content, b"first\nsecond\n");
    }

    #[test]
    fn create_new_refuses_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seg.html");
        std::fs::write(&path, b"already here").unwrap();

        let result = FileBackend::create_new(&path);
        assert!(
            matches!(result, Err(StorageError::Io(ref e)) if e.kind() == io::ErrorKind::AlreadyExists)
        );
    }

    #[test]
    fn open_or_create_reports_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seg.html");

        let (mut backend, mode) = FileBackend::open_or_create(&path).unwrap();
        assert_eq!(mode, OpenMode::Created);
        backend.append(b"x").unwrap();
        drop(backend);

        let (backend, mode) = FileBackend::open_or_create(&path).unwrap();
        assert_eq!(mode, OpenMode::Existing);
        assert_eq!(backend.size().unwrap(), 1);
    }

    #[test]
    fn appended_bytes_visible_without_sync() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seg.html");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.append(b"visible").unwrap();
        backend.flush().unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"visible");
    }

    #[test]
    fn file_create_with_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("logs").join("seg.html");

        let backend = FileBackend::open_with_create_dirs(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 0);
        assert_eq!(backend.path(), path);
    }

    #[test]
    fn file_flush_and_sync() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seg.html");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.append(b"data").unwrap();

        assert!(backend.flush().is_ok());
        assert!(backend.sync().is_ok());
    }
}
