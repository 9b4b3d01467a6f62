//! Error types for chanlog core.

use chrono::NaiveDate;
use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in chanlog core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] chanlog_storage::StorageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An event is missing a field its line template needs.
    #[error("malformed event: {message}")]
    MalformedEvent {
        /// Which field was missing or empty.
        message: String,
    },

    /// A free-form date phrase could not be resolved to a calendar day.
    #[error("cannot resolve date from {input:?}")]
    ResolutionFailure {
        /// The phrase as given.
        input: String,
    },

    /// The segment has been finalized and accepts no further writes.
    #[error("segment {date} is closed")]
    SegmentClosed {
        /// Day of the closed segment.
        date: NaiveDate,
    },

    /// A segment for this day is already open in this process.
    #[error("segment {date} is already open")]
    SegmentAlreadyOpen {
        /// Day of the segment.
        date: NaiveDate,
    },

    /// The writer has no active segment (after shutdown or a failed rotation).
    #[error("no active segment")]
    NoActiveSegment,

    /// Another process holds the log directory.
    #[error("log directory locked: another process is writing to it")]
    LogDirLocked,

    /// Configuration is unusable.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong.
        message: String,
    },
}

impl CoreError {
    /// Creates a malformed event error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedEvent {
            message: message.into(),
        }
    }

    /// Creates a resolution failure error.
    pub fn resolution_failure(input: impl Into<String>) -> Self {
        Self::ResolutionFailure {
            input: input.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Returns true for errors raised by the file handle or file system.
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            Self::Storage(_) | Self::Io(_) | Self::SegmentClosed { .. } | Self::NoActiveSegment
        )
    }
}
