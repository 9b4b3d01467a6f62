//! JSON config file layered under command-line flags.

use chanlog_core::Config;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// On-disk configuration. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub log_dir: Option<PathBuf>,
    pub create_if_missing: Option<bool>,
    pub base_url: Option<String>,
    pub title: Option<String>,
    pub extension: Option<String>,
    pub time_format: Option<String>,
    pub extra_head: Option<String>,
    pub own_nick: Option<String>,
    pub rotation_interval_secs: Option<u64>,
    pub sync_on_append: Option<bool>,
}

impl ConfigFile {
    /// Overlays the fields that are set onto `config`.
    pub fn apply(self, mut config: Config) -> Config {
        if let Some(dir) = self.log_dir {
            config = config.log_dir(dir);
        }
        if let Some(create) = self.create_if_missing {
            config = config.create_if_missing(create);
        }
        if let Some(url) = self.base_url {
            config = config.base_url(url);
        }
        if let Some(title) = self.title {
            config = config.title(title);
        }
        if let Some(ext) = self.extension {
            config = config.extension(ext);
        }
        if let Some(format) = self.time_format {
            config = config.time_format(format);
        }
        if let Some(head) = self.extra_head {
            config = config.extra_head(head);
        }
        if let Some(nick) = self.own_nick {
            config = config.own_nick(nick);
        }
        if let Some(secs) = self.rotation_interval_secs {
            config = config.rotation_interval(Duration::from_secs(secs));
        }
        if let Some(sync) = self.sync_on_append {
            config = config.sync_on_append(sync);
        }
        config
    }
}

/// Reads `path` if given and layers it over the defaults.
pub fn load(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = fs::read_to_string(path)
        .map_err(|e| format!("cannot read config {}: {e}", path.display()))?;
    let file: ConfigFile = serde_json::from_str(&text)
        .map_err(|e| format!("invalid config {}: {e}", path.display()))?;
    Ok(file.apply(Config::default()))
}
