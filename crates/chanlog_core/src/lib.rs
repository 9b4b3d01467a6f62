//! # chanlog core
//!
//! Durable daily HTML logs for IRC channels.
//!
//! This crate provides:
//! - The [`EventRecord`] model of everything worth logging
//! - Status markers (`@`, `%`, `+`, `:`) via [`StatusResolver`]
//! - Rendering of events into escaped table rows ([`Renderer`])
//! - Append-only daily segments that survive restarts ([`SegmentStore`])
//! - Day-boundary rotation ([`RotationScheduler`], [`RotationTicker`])
//! - The serialized write path tying it together ([`LogWriter`])
//! - Date phrase lookup for log links ([`DateQuery`])
//!
//! ```rust,ignore
//! let writer = LogWriter::open(&config, Arc::new(NoChannels), SystemClock.now())?;
//! writer.record(&event)?;
//! writer.shutdown()?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod dir;
mod error;
mod event;
mod query;
mod render;
mod rotation;
mod segment;
mod status;
mod writer;

pub use config::Config;
pub use dir::{LogDir, SegmentClaim, SegmentInfo};
pub use error::{CoreError, CoreResult};
pub use event::{EventRecord, ModeFlag, Timestamp};
pub use query::{parse_date_phrase, DateQuery, UNRESOLVED_REPLY};
pub use render::{escape_html, mode_change_string, LogLine, Marks, Renderer};
pub use rotation::{check, Clock, RotationDecision, RotationScheduler, RotationTicker, SystemClock};
pub use segment::{is_finalized, SegmentFormat, SegmentState, SegmentStore, DEFAULT_STYLESHEET};
pub use status::{ChannelDirectory, Marker, MemberTable, NoChannels, Privileges, StatusResolver};
pub use writer::{LogWriter, Recorded};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
