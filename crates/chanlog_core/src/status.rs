//! Privilege markers shown next to nicks.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Single-character privilege indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// No privilege, or nothing to look it up in.
    None,
    /// Voiced (`+`).
    Voice,
    /// Half-operator (`%`).
    HalfOp,
    /// Operator (`@`).
    Op,
    /// The program itself (`:`).
    OwnNick,
}

impl Marker {
    /// The marker as rendered in front of a nick.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Voice => "+",
            Self::HalfOp => "%",
            Self::Op => "@",
            Self::OwnNick => ":",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a channel reports about one member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Privileges {
    /// Holds `+o`.
    pub op: bool,
    /// Holds `+h`.
    pub half_op: bool,
    /// Holds `+v`.
    pub voice: bool,
}

/// Channel-state lookup provided by the network layer.
///
/// Implementations must answer from memory; the resolver calls this while
/// the writer lock is held.
pub trait ChannelDirectory: Send + Sync {
    /// Returns `nick`'s privileges in `channel`, or `None` if the channel
    /// or the member is unknown.
    fn privileges(&self, channel: &str, nick: &str) -> Option<Privileges>;
}

/// A directory that knows no channels.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoChannels;

impl ChannelDirectory for NoChannels {
    fn privileges(&self, _channel: &str, _nick: &str) -> Option<Privileges> {
        None
    }
}

/// A directory fed explicitly with membership updates.
#[derive(Debug, Default)]
pub struct MemberTable {
    members: RwLock<HashMap<(String, String), Privileges>>,
}

impl MemberTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `nick`'s privileges in `channel`.
    pub fn set(&self, channel: &str, nick: &str, privileges: Privileges) {
        self.members
            .write()
            .insert((channel.to_string(), nick.to_string()), privileges);
    }

    /// Forgets `nick` in `channel`.
    pub fn remove(&self, channel: &str, nick: &str) {
        self.members
            .write()
            .remove(&(channel.to_string(), nick.to_string()));
    }

    /// Number of known (channel, nick) pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    /// Returns true if no members are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }
}

impl ChannelDirectory for MemberTable {
    fn privileges(&self, channel: &str, nick: &str) -> Option<Privileges> {
        self.members
            .read()
            .get(&(channel.to_string(), nick.to_string()))
            .copied()
    }
}

/// Derives a [`Marker`] for a nick in a channel.
pub struct StatusResolver {
    own_nick: RwLock<String>,
    directory: Arc<dyn ChannelDirectory>,
}

impl StatusResolver {
    /// Creates a resolver for the given identity and directory.
    pub fn new(own_nick: impl Into<String>, directory: Arc<dyn ChannelDirectory>) -> Self {
        Self {
            own_nick: RwLock::new(own_nick.into()),
            directory,
        }
    }

    /// The identity currently treated as "self".
    #[must_use]
    pub fn own_nick(&self) -> String {
        self.own_nick.read().clone()
    }

    /// Changes the identity treated as "self".
    pub fn set_own_nick(&self, nick: impl Into<String>) {
        *self.own_nick.write() = nick.into();
    }

    /// Resolves the marker for `user` in `channel`.
    ///
    /// Precedence is own nick, then op, half-op, voice. A missing user or
    /// channel always yields [`Marker::None`].
    #[must_use]
    pub fn resolve(&self, user: Option<&str>, channel: Option<&str>) -> Marker {
        let (Some(user), Some(channel)) = (user, channel) else {
            return Marker::None;
        };

        if *self.own_nick.read() == user {
            return Marker::OwnNick;
        }

        match self.directory.privileges(channel, user) {
            Some(p) if p.op => Marker::Op,
            Some(p) if p.half_op => Marker::HalfOp,
            Some(p) if p.voice => Marker::Voice,
            _ => Marker::None,
        }
    }
}

impl fmt::Debug for StatusResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusResolver")
            .field("own_nick", &*self.own_nick.read())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> (StatusResolver, Arc<MemberTable>) {
        let table = Arc::new(MemberTable::new());
        table.set(
            "#rust",
            "oscar",
            Privileges {
                op: true,
                half_op: true,
                voice: true,
            },
        );
        table.set(
            "#rust",
            "hank",
            Privileges {
                half_op: true,
                voice: true,
                ..Privileges::default()
            },
        );
        table.set(
            "#rust",
            "vera",
            Privileges {
                voice: true,
                ..Privileges::default()
            },
        );
        table.set("#rust", "nobody", Privileges::default());
        table.set(
            "#rust",
            "scribe",
            Privileges {
                op: true,
                ..Privileges::default()
            },
        );
        (StatusResolver::new("scribe", table.clone()), table)
    }

    #[test]
    fn precedence_highest_first() {
        let (resolver, _) = resolver();
        assert_eq!(resolver.resolve(Some("scribe"), Some("#rust")), Marker::OwnNick);
        assert_eq!(resolver.resolve(Some("oscar"), Some("#rust")), Marker::Op);
        assert_eq!(resolver.resolve(Some("hank"), Some("#rust")), Marker::HalfOp);
        assert_eq!(resolver.resolve(Some("vera"), Some("#rust")), Marker::Voice);
        assert_eq!(resolver.resolve(Some("nobody"), Some("#rust")), Marker::None);
        assert_eq!(resolver.resolve(Some("stranger"), Some("#rust")), Marker::None);
    }

    #[test]
    fn absent_channel_or_user_yields_none() {
        let (resolver, _) = resolver();
        assert_eq!(resolver.resolve(Some("scribe"), None), Marker::None);
        assert_eq!(resolver.resolve(Some("oscar"), None), Marker::None);
        assert_eq!(resolver.resolve(None, Some("#rust")), Marker::None);
    }

    #[test]
    fn own_nick_can_change() {
        let (resolver, _) = resolver();
        resolver.set_own_nick("scribe_");
        assert_eq!(resolver.own_nick(), "scribe_");
        assert_eq!(resolver.resolve(Some("scribe_"), Some("#rust")), Marker::OwnNick);
        assert_eq!(resolver.resolve(Some("scribe"), Some("#rust")), Marker::Op);
    }

    #[test]
    fn member_table_updates() {
        let (resolver, table) = resolver();
        table.remove("#rust", "vera");
        assert_eq!(resolver.resolve(Some("vera"), Some("#rust")), Marker::None);
        assert_eq!(table.len(), 4);
        assert!(!table.is_empty());
    }

    #[test]
    fn marker_strings() {
        assert_eq!(Marker::None.to_string(), "");
        assert_eq!(Marker::Voice.as_str(), "+");
        assert_eq!(Marker::HalfOp.as_str(), "%");
        assert_eq!(Marker::Op.as_str(), "@");
        assert_eq!(Marker::OwnNick.as_str(), ":");
    }

    #[test]
    fn no_channels_knows_nothing() {
        let resolver = StatusResolver::new("scribe", Arc::new(NoChannels));
        assert_eq!(resolver.resolve(Some("oscar"), Some("#rust")), Marker::None);
    }
}
