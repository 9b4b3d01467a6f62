//! # chanlog testkit
//!
//! Test utilities for chanlog.
//!
//! This crate provides:
//! - Temporary log directories and a hand-driven clock
//! - Builders for every kind of event
//! - Property-based generators using proptest
//! - A storage backend that fails on demand
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chanlog_testkit::prelude::*;
//!
//! #[test]
//! fn logs_a_message() {
//!     let logs = TempLogDir::new();
//!     let writer = logs.open_writer(utc(2024, 3, 1, 9, 0, 0));
//!     writer.record(&message(utc(2024, 3, 1, 9, 0, 1), "alice", "hi")).unwrap();
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod failing;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::failing::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use failing::*;
pub use fixtures::*;
pub use generators::*;
