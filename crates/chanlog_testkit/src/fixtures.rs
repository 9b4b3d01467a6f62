//! Test fixtures: temporary log directories, a manual clock, event builders.

use chanlog_core::{
    ChannelDirectory, Clock, Config, EventRecord, LogWriter, ModeFlag, NoChannels, Timestamp,
};
use chrono::{Duration, FixedOffset, NaiveDate, TimeZone};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Channel used by the event builders.
pub const CHANNEL: &str = "#rust";

/// Nick the fixtures configure as the program's own.
pub const OWN_NICK: &str = "scribe";

/// A log directory that is removed when dropped.
pub struct TempLogDir {
    config: Config,
    _temp_dir: TempDir,
}

impl TempLogDir {
    /// Creates an empty log directory with a test configuration.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = Config::new()
            .log_dir(temp_dir.path())
            .title(CHANNEL)
            .own_nick(OWN_NICK)
            .base_url("https://logs.example.org/rust");
        Self {
            config,
            _temp_dir: temp_dir,
        }
    }

    /// The directory path.
    pub fn path(&self) -> &Path {
        self._temp_dir.path()
    }

    /// The configuration pointing at this directory.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Path of the segment for `date`.
    pub fn segment_path(&self, date: NaiveDate) -> PathBuf {
        self.path()
            .join(format!("{}.{}", date.format("%Y-%m-%d"), self.config.extension))
    }

    /// Opens a writer with no channel state.
    pub fn open_writer(&self, now: Timestamp) -> LogWriter {
        self.open_writer_with(Arc::new(NoChannels), now)
    }

    /// Opens a writer backed by `directory`.
    pub fn open_writer_with(&self, directory: Arc<dyn ChannelDirectory>, now: Timestamp) -> LogWriter {
        LogWriter::open(&self.config, directory, now).expect("Failed to open log writer")
    }

    /// Reads the segment for `date`.
    pub fn read(&self, date: NaiveDate) -> String {
        std::fs::read_to_string(self.segment_path(date)).expect("Failed to read segment")
    }
}

impl Default for TempLogDir {
    fn default() -> Self {
        Self::new()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    /// Starts at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Jumps to `now`.
    pub fn set(&self, now: Timestamp) {
        *self.now.lock() = now;
    }

    /// Moves forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}

/// A UTC timestamp.
pub fn utc(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Timestamp {
    FixedOffset::east_opt(0)
        .and_then(|utc| utc.with_ymd_and_hms(year, month, day, hour, min, sec).single())
        .expect("Invalid timestamp")
}

/// A plain message in [`CHANNEL`].
pub fn message(timestamp: Timestamp, actor: &str, text: &str) -> EventRecord {
    EventRecord::Message {
        timestamp,
        actor: actor.into(),
        status_scope: Some(CHANNEL.into()),
        text: text.into(),
        is_action: false,
    }
}

/// A `/me` action in [`CHANNEL`].
pub fn action(timestamp: Timestamp, actor: &str, text: &str) -> EventRecord {
    EventRecord::Message {
        timestamp,
        actor: actor.into(),
        status_scope: Some(CHANNEL.into()),
        text: text.into(),
        is_action: true,
    }
}

/// A message sent by the program.
pub fn own_message(timestamp: Timestamp, text: &str, is_private: bool) -> EventRecord {
    EventRecord::OwnMessage {
        timestamp,
        bot_name: OWN_NICK.into(),
        text: text.into(),
        is_notice: false,
        is_private,
    }
}

/// A topic change in [`CHANNEL`].
pub fn topic(timestamp: Timestamp, actor: &str, topic: &str) -> EventRecord {
    EventRecord::Topic {
        timestamp,
        actor: actor.into(),
        status_scope: Some(CHANNEL.into()),
        topic: topic.into(),
    }
}

/// A nick change seen in [`CHANNEL`].
pub fn nick_change(timestamp: Timestamp, old_nick: &str, new_nick: &str) -> EventRecord {
    EventRecord::NickChange {
        timestamp,
        old_nick: old_nick.into(),
        new_nick: new_nick.into(),
        old_status_scope: Some(CHANNEL.into()),
        new_status_scope: Some(CHANNEL.into()),
    }
}

/// A join to [`CHANNEL`].
pub fn join(timestamp: Timestamp, actor: &str) -> EventRecord {
    EventRecord::Join {
        timestamp,
        actor: actor.into(),
        status_scope: Some(CHANNEL.into()),
        channel: CHANNEL.into(),
    }
}

/// A part from [`CHANNEL`].
pub fn leave(timestamp: Timestamp, actor: &str, reason: &str) -> EventRecord {
    EventRecord::Leave {
        timestamp,
        actor: actor.into(),
        status_scope: Some(CHANNEL.into()),
        reason: reason.into(),
        channel: Some(CHANNEL.into()),
    }
}

/// A network quit.
pub fn quit(timestamp: Timestamp, actor: &str, reason: &str) -> EventRecord {
    EventRecord::Leave {
        timestamp,
        actor: actor.into(),
        status_scope: None,
        reason: reason.into(),
        channel: None,
    }
}

/// A mode change in [`CHANNEL`].
pub fn mode_change(
    timestamp: Timestamp,
    actor: &str,
    added: Vec<ModeFlag>,
    removed: Vec<ModeFlag>,
) -> EventRecord {
    EventRecord::ModeChange {
        timestamp,
        actor: actor.into(),
        status_scope: Some(CHANNEL.into()),
        added,
        removed,
    }
}
