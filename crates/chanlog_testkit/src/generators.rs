//! Property-based test generators using proptest.
//!
//! Generated events are always well-formed: non-empty nicks and channels,
//! mode changes with at least one flag.

use crate::fixtures::{utc, CHANNEL, OWN_NICK};
use chanlog_core::{EventRecord, ModeFlag, Timestamp};
use proptest::prelude::*;

/// Strategy for IRC nicks.
pub fn nick_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z\\[\\]`_^{|}][a-zA-Z0-9\\[\\]`_^{|}-]{0,15}")
        .expect("Invalid regex")
}

/// Strategy for free text, biased toward characters that need escaping.
pub fn text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            3 => prop::char::range('a', 'z'),
            1 => prop::sample::select(vec!['<', '>', '&', '"', '\'', ' ', 'é', '“']),
        ],
        0..64,
    )
    .prop_map(|chars: Vec<char>| chars.into_iter().collect::<String>())
}

/// Strategy for a time of day on 2024-03-01, UTC.
pub fn timestamp_strategy() -> impl Strategy<Value = Timestamp> {
    (0u32..24, 0u32..60, 0u32..60).prop_map(|(h, m, s)| utc(2024, 3, 1, h, m, s))
}

/// Strategy for mode flags.
pub fn mode_flag_strategy() -> impl Strategy<Value = ModeFlag> {
    (
        prop::sample::select(vec!['o', 'h', 'v', 'b', 'k', 'm', 't']),
        prop::option::of(nick_strategy()),
    )
        .prop_map(|(flag, argument)| ModeFlag { flag, argument })
}

/// Strategy for any loggable event, suppressed ones included.
pub fn event_strategy() -> impl Strategy<Value = EventRecord> {
    prop_oneof![
        (timestamp_strategy(), nick_strategy(), text_strategy(), any::<bool>()).prop_map(
            |(timestamp, actor, text, is_action)| EventRecord::Message {
                timestamp,
                actor,
                status_scope: Some(CHANNEL.into()),
                text,
                is_action,
            }
        ),
        (timestamp_strategy(), text_strategy(), any::<bool>(), any::<bool>()).prop_map(
            |(timestamp, text, is_notice, is_private)| EventRecord::OwnMessage {
                timestamp,
                bot_name: OWN_NICK.into(),
                text,
                is_notice,
                is_private,
            }
        ),
        (timestamp_strategy(), nick_strategy(), text_strategy()).prop_map(
            |(timestamp, actor, topic)| EventRecord::Topic {
                timestamp,
                actor,
                status_scope: Some(CHANNEL.into()),
                topic,
            }
        ),
        (timestamp_strategy(), nick_strategy(), nick_strategy()).prop_map(
            |(timestamp, old_nick, new_nick)| EventRecord::NickChange {
                timestamp,
                old_nick,
                new_nick,
                old_status_scope: Some(CHANNEL.into()),
                new_status_scope: Some(CHANNEL.into()),
            }
        ),
        (timestamp_strategy(), nick_strategy()).prop_map(|(timestamp, actor)| {
            EventRecord::Join {
                timestamp,
                actor,
                status_scope: Some(CHANNEL.into()),
                channel: CHANNEL.into(),
            }
        }),
        (
            timestamp_strategy(),
            nick_strategy(),
            text_strategy(),
            any::<bool>()
        )
            .prop_map(|(timestamp, actor, reason, quit)| EventRecord::Leave {
                timestamp,
                actor,
                status_scope: (!quit).then(|| CHANNEL.to_string()),
                reason,
                channel: (!quit).then(|| CHANNEL.to_string()),
            }),
        (
            timestamp_strategy(),
            nick_strategy(),
            prop::collection::vec(mode_flag_strategy(), 1..4),
            prop::collection::vec(mode_flag_strategy(), 0..4),
        )
            .prop_map(|(timestamp, actor, added, removed)| EventRecord::ModeChange {
                timestamp,
                actor,
                status_scope: Some(CHANNEL.into()),
                added,
                removed,
            }),
    ]
}
