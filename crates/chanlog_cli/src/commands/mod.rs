//! Command implementations.

pub mod link;
pub mod list;
pub mod run;
