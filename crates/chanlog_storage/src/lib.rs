//! # chanlog storage
//!
//! Append-only byte stores backing chanlog's daily log segments.
//!
//! Backends are **opaque byte stores** - they know nothing about HTML,
//! segments, preambles or footers. The core crate owns all format
//! interpretation.
//!
//! ## Design Principles
//!
//! - Backends only append, never rewrite
//! - `flush` makes every appended byte visible to other readers of the file
//! - `sync` additionally asks the OS to put the bytes on disk
//! - Must be `Send + Sync` so a writer can live behind a lock
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing
//! - [`FileBackend`] - For segment files on disk
//!
//! ## Example
//!
//! ```rust
//! use chanlog_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! let offset = backend.append(b"<tr></tr>").unwrap();
//! let data = backend.read_at(offset, 9).unwrap();
//! assert_eq!(&data, b"<tr></tr>");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::{FileBackend, OpenMode};
pub use memory::InMemoryBackend;
