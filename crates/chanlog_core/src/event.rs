//! Loggable channel events.
//!
//! Every variant carries only what its line template needs. The
//! `status_scope` fields name the channel in which the actor's privilege
//! marker is looked up; `None` means "no channel to look in" and always
//! yields an empty marker.

use chrono::{DateTime, FixedOffset};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Wall-clock time with the offset it was observed in, second resolution.
pub type Timestamp = DateTime<FixedOffset>;

/// One mode flag with its optional argument, e.g. `o alice` or `m`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ModeFlag {
    /// The mode letter.
    pub flag: char,
    /// Argument such as a nick or ban mask.
    #[cfg_attr(feature = "serde", serde(default))]
    pub argument: Option<String>,
}

impl ModeFlag {
    /// A flag without argument.
    #[must_use]
    pub const fn bare(flag: char) -> Self {
        Self {
            flag,
            argument: None,
        }
    }

    /// A flag with an argument.
    #[must_use]
    pub fn with_argument(flag: char, argument: impl Into<String>) -> Self {
        Self {
            flag,
            argument: Some(argument.into()),
        }
    }
}

/// A single loggable occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(tag = "type", rename_all = "snake_case")
)]
pub enum EventRecord {
    /// A channel message or `/me` action from someone else.
    Message {
        /// When it was received.
        timestamp: Timestamp,
        /// Sender nick.
        actor: String,
        /// Channel to resolve the sender's marker in.
        status_scope: Option<String>,
        /// Message body.
        text: String,
        /// Whether this was a `/me` action.
        #[cfg_attr(feature = "serde", serde(default))]
        is_action: bool,
    },

    /// A message the program itself sent.
    OwnMessage {
        /// When it was sent.
        timestamp: Timestamp,
        /// The program's nick at send time.
        bot_name: String,
        /// Message body.
        text: String,
        /// Sent as NOTICE rather than PRIVMSG.
        #[cfg_attr(feature = "serde", serde(default))]
        is_notice: bool,
        /// Addressed to a single user; never logged.
        #[cfg_attr(feature = "serde", serde(default))]
        is_private: bool,
    },

    /// A topic change.
    Topic {
        /// When the topic changed.
        timestamp: Timestamp,
        /// Who changed it.
        actor: String,
        /// Channel to resolve the actor's marker in.
        status_scope: Option<String>,
        /// The new topic text.
        topic: String,
    },

    /// A nick change.
    NickChange {
        /// When the change was seen.
        timestamp: Timestamp,
        /// Nick before the change.
        old_nick: String,
        /// Nick after the change.
        new_nick: String,
        /// Channel to resolve the old nick's marker in.
        old_status_scope: Option<String>,
        /// Channel to resolve the new nick's marker in.
        new_status_scope: Option<String>,
    },

    /// Someone joined a channel.
    Join {
        /// When they joined.
        timestamp: Timestamp,
        /// Who joined.
        actor: String,
        /// Channel to resolve the actor's marker in.
        status_scope: Option<String>,
        /// The joined channel.
        channel: String,
    },

    /// Someone parted a channel or quit the network.
    Leave {
        /// When they left.
        timestamp: Timestamp,
        /// Who left.
        actor: String,
        /// Channel to resolve the actor's marker in.
        status_scope: Option<String>,
        /// Part or quit message, may be empty.
        #[cfg_attr(feature = "serde", serde(default))]
        reason: String,
        /// The parted channel; `None` for a network-wide quit.
        #[cfg_attr(feature = "serde", serde(default))]
        channel: Option<String>,
    },

    /// Channel or user modes changed.
    ModeChange {
        /// When the change was seen.
        timestamp: Timestamp,
        /// Who set the modes.
        actor: String,
        /// Channel to resolve the actor's marker in.
        status_scope: Option<String>,
        /// Flags set, in order.
        #[cfg_attr(feature = "serde", serde(default))]
        added: Vec<ModeFlag>,
        /// Flags unset, in order.
        #[cfg_attr(feature = "serde", serde(default))]
        removed: Vec<ModeFlag>,
    },
}

impl EventRecord {
    /// Returns the event's timestamp.
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Self::Message { timestamp, .. }
            | Self::OwnMessage { timestamp, .. }
            | Self::Topic { timestamp, .. }
            | Self::NickChange { timestamp, .. }
            | Self::Join { timestamp, .. }
            | Self::Leave { timestamp, .. }
            | Self::ModeChange { timestamp, .. } => *timestamp,
        }
    }

    /// Short variant name for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Message { is_action: true, .. } => "action",
            Self::Message { .. } => "message",
            Self::OwnMessage { .. } => "own_message",
            Self::Topic { .. } => "topic",
            Self::NickChange { .. } => "nick",
            Self::Join { .. } => "join",
            Self::Leave { .. } => "leave",
            Self::ModeChange { .. } => "mode",
        }
    }

    /// Whether this event must never reach a segment.
    #[must_use]
    pub const fn is_suppressed(&self) -> bool {
        matches!(self, Self::OwnMessage { is_private: true, .. })
    }
}
