//! Link command implementation.

use chanlog_core::{Config, DateQuery};
use chrono::Local;

/// Returns the reply for `phrase`, resolved against the local date.
pub fn run(config: &Config, phrase: &str) -> String {
    DateQuery::from_config(config).reply(phrase, Local::now().date_naive())
}
