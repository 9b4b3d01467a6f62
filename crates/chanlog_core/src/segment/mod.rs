//! Daily log segments.
//!
//! A segment is one calendar day's HTML file, `YYYY-MM-DD.<ext>`:
//!
//! ```text
//! | preamble (once, at creation) | row | row | ... | footer (once, at rotation) |
//! ```
//!
//! A file without its footer is the segment currently being written, or
//! one abandoned by a crash. Reopening such a file appends after the last
//! row and never writes a second preamble.

mod layout;
mod store;

pub use layout::{is_finalized, SegmentFormat, DEFAULT_STYLESHEET};
pub use store::{SegmentState, SegmentStore};
