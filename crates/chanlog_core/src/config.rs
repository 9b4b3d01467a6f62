//! Writer configuration.

use crate::error::{CoreError, CoreResult};
use crate::render::is_valid_time_format;
use crate::segment::DEFAULT_STYLESHEET;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for opening a [`crate::LogWriter`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the `YYYY-MM-DD.<ext>` segment files.
    pub log_dir: PathBuf,

    /// Whether to create `log_dir` if it doesn't exist.
    pub create_if_missing: bool,

    /// Public URL the log directory is served under, without trailing slash.
    pub base_url: String,

    /// Channel label used in each segment's title.
    pub title: String,

    /// Segment file extension, without the dot.
    pub extension: String,

    /// `strftime` format for the displayed time column.
    pub time_format: String,

    /// Markup injected into each segment's `<head>`.
    pub extra_head: String,

    /// The program's own nick; lines from it get the `:` marker.
    pub own_nick: String,

    /// How often the rotation ticker checks for a day change.
    pub rotation_interval: Duration,

    /// Whether to fsync after every appended line, on top of the flush.
    pub sync_on_append: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            create_if_missing: true,
            base_url: "http://localhost".to_string(),
            title: "#chanlog".to_string(),
            extension: "html".to_string(),
            time_format: "%H:%M:%S".to_string(),
            extra_head: DEFAULT_STYLESHEET.to_string(),
            own_nick: "chanlog".to_string(),
            rotation_interval: Duration::from_secs(60),
            sync_on_append: false,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the log directory.
    #[must_use]
    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    /// Sets whether to create the log directory if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets the public base URL. A trailing slash is stripped.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Sets the channel label shown in segment titles.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the segment file extension.
    #[must_use]
    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.extension = ext.into();
        self
    }

    /// Sets the displayed time format.
    #[must_use]
    pub fn time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    /// Replaces the extra `<head>` markup.
    #[must_use]
    pub fn extra_head(mut self, head: impl Into<String>) -> Self {
        self.extra_head = head.into();
        self
    }

    /// Sets the program's own nick.
    #[must_use]
    pub fn own_nick(mut self, nick: impl Into<String>) -> Self {
        self.own_nick = nick.into();
        self
    }

    /// Sets the rotation check interval.
    #[must_use]
    pub const fn rotation_interval(mut self, interval: Duration) -> Self {
        self.rotation_interval = interval;
        self
    }

    /// Sets whether every appended line is fsynced.
    #[must_use]
    pub const fn sync_on_append(mut self, value: bool) -> Self {
        self.sync_on_append = value;
        self
    }

    /// Checks that the configuration can be used to open a writer.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> CoreResult<()> {
        if self.extension.is_empty() || self.extension.contains(['/', '.']) {
            return Err(CoreError::invalid_config(
                "extension must be non-empty and contain no '.' or '/'",
            ));
        }
        if self.time_format.is_empty() || !is_valid_time_format(&self.time_format) {
            return Err(CoreError::invalid_config(format!(
                "invalid time format {:?}",
                self.time_format
            )));
        }
        if self.own_nick.is_empty() {
            return Err(CoreError::invalid_config("own nick must not be empty"));
        }
        if self.rotation_interval.is_zero() {
            return Err(CoreError::invalid_config(
                "rotation interval must be greater than zero",
            ));
        }
        Ok(())
    }
}
