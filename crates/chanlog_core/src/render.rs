//! Turns events into HTML table rows.
//!
//! Rendering is pure: no I/O, no clock, no channel lookups. Markers are
//! resolved by the caller and passed in.

use crate::error::{CoreError, CoreResult};
use crate::event::{EventRecord, ModeFlag, Timestamp};
use crate::status::Marker;
use chrono::format::{Item, StrftimeItems};
use std::fmt::Write;

/// Anchor ids are always derived from this format, whatever is displayed.
const ANCHOR_FORMAT: &str = "%H:%M:%S";

/// One rendered line record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// The row's `id`, `msg-HH:MM:SS`. Not unique within a second.
    pub anchor: String,
    /// The complete row, newline-terminated.
    pub markup: String,
}

/// Markers for the nicks that appear in a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marks {
    /// Marker for the acting nick (the old nick for nick changes).
    pub actor: Marker,
    /// Marker for the new nick of a nick change; ignored otherwise.
    pub new_nick: Marker,
}

impl Marks {
    /// Marks for events with a single nick.
    #[must_use]
    pub const fn single(actor: Marker) -> Self {
        Self {
            actor,
            new_nick: Marker::None,
        }
    }

    /// No markers at all.
    #[must_use]
    pub const fn none() -> Self {
        Self::single(Marker::None)
    }
}

/// Escapes text for interpolation into HTML element content or attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Formats a mode change as `-<removed>+<added>`.
///
/// Each run concatenates its flags in order, each followed by its argument
/// if any, with trailing whitespace trimmed. An empty run is omitted
/// entirely.
#[must_use]
pub fn mode_change_string(added: &[ModeFlag], removed: &[ModeFlag]) -> String {
    fn run(sign: char, flags: &[ModeFlag]) -> String {
        if flags.is_empty() {
            return String::new();
        }
        let mut out = String::from(sign);
        for flag in flags {
            out.push(flag.flag);
            if let Some(argument) = &flag.argument {
                out.push(' ');
                out.push_str(argument);
            }
        }
        out.trim_end().to_string()
    }

    let mut change = run('-', removed);
    change.push_str(&run('+', added));
    change
}

/// Returns true if `format` is a strftime string chrono can render.
#[must_use]
pub fn is_valid_time_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Stateless line renderer.
#[derive(Debug, Clone)]
pub struct Renderer {
    time_format: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            time_format: ANCHOR_FORMAT.to_string(),
        }
    }
}

impl Renderer {
    /// Creates a renderer displaying times with `time_format`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if chrono cannot render the format.
    pub fn new(time_format: impl Into<String>) -> CoreResult<Self> {
        let time_format = time_format.into();
        if time_format.is_empty() || !is_valid_time_format(&time_format) {
            return Err(CoreError::invalid_config(format!(
                "invalid time format {time_format:?}"
            )));
        }
        Ok(Self { time_format })
    }

    /// Renders `event` as one table row.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedEvent`] if a field the template needs
    /// is empty. Nothing is rendered in that case.
    pub fn render(&self, event: &EventRecord, marks: Marks) -> CoreResult<LogLine> {
        let (nick_cell, class, body) = match event {
            EventRecord::Message {
                actor,
                text,
                is_action: false,
                ..
            } => {
                require("message actor", actor)?;
                (
                    format!("{}{}", marks.actor, escape_html(actor)),
                    "msgmessage",
                    escape_html(text),
                )
            }
            EventRecord::Message {
                actor,
                text,
                is_action: true,
                ..
            } => {
                require("action actor", actor)?;
                (
                    "*".to_string(),
                    "msgaction",
                    format!("{}&nbsp;{}", nick_span(marks.actor, actor), escape_html(text)),
                )
            }
            EventRecord::OwnMessage { bot_name, text, .. } => {
                require("own message nick", bot_name)?;
                (
                    format!("{}{}", Marker::OwnNick, escape_html(bot_name)),
                    "msgmessage",
                    escape_html(text),
                )
            }
            EventRecord::Topic { actor, topic, .. } => {
                require("topic actor", actor)?;
                (
                    "*".to_string(),
                    "msgtopic",
                    format!(
                        "{}&nbsp;changed the topic to “{}”.",
                        nick_span(marks.actor, actor),
                        escape_html(topic)
                    ),
                )
            }
            EventRecord::NickChange {
                old_nick, new_nick, ..
            } => {
                require("old nick", old_nick)?;
                require("new nick", new_nick)?;
                (
                    "--".to_string(),
                    "msgnickchange",
                    format!(
                        "{}&nbsp;is now known as {}.",
                        nick_span(marks.actor, old_nick),
                        nick_span(marks.new_nick, new_nick)
                    ),
                )
            }
            EventRecord::Join { actor, channel, .. } => {
                require("join actor", actor)?;
                require("join channel", channel)?;
                (
                    "--&gt;".to_string(),
                    "msgjoin",
                    format!(
                        "{}&nbsp;entered {}.",
                        nick_span(marks.actor, actor),
                        escape_html(channel)
                    ),
                )
            }
            EventRecord::Leave {
                actor,
                reason,
                channel,
                ..
            } => {
                require("leave actor", actor)?;
                let place = match channel {
                    Some(channel) => {
                        require("leave channel", channel)?;
                        escape_html(channel)
                    }
                    None => "the IRC network".to_string(),
                };
                (
                    "&lt;--".to_string(),
                    "msgleave",
                    format!(
                        "{}&nbsp;left {} ({}).",
                        nick_span(marks.actor, actor),
                        place,
                        escape_html(reason)
                    ),
                )
            }
            EventRecord::ModeChange {
                actor,
                added,
                removed,
                ..
            } => {
                require("mode actor", actor)?;
                if added.is_empty() && removed.is_empty() {
                    return Err(CoreError::malformed("mode change without flags"));
                }
                (
                    "--".to_string(),
                    "msgmode",
                    format!(
                        "Mode {} by {}.",
                        escape_html(&mode_change_string(added, removed)),
                        nick_span(marks.actor, actor)
                    ),
                )
            }
        };

        self.row(event.timestamp(), &nick_cell, class, &body)
    }

    fn row(&self, timestamp: Timestamp, nick_cell: &str, class: &str, body: &str) -> CoreResult<LogLine> {
        let anchor = format!("msg-{}", timestamp.format(ANCHOR_FORMAT));

        let mut display = String::new();
        write!(display, "{}", timestamp.format(&self.time_format)).map_err(|_| {
            CoreError::invalid_config(format!("invalid time format {:?}", self.time_format))
        })?;

        let markup = format!(
            concat!(
                "        <tr id=\"{anchor}\">\n",
                "          <td class=\"msgtime\"><a href=\"#{anchor}\">{display}</a></td>\n",
                "          <td class=\"msgnick\">{nick}</td>\n",
                "          <td class=\"{class}\">{body}</td>\n",
                "        </tr>\n",
            ),
            anchor = anchor,
            display = display,
            nick = nick_cell,
            class = class,
            body = body,
        );

        Ok(LogLine { anchor, markup })
    }
}

fn nick_span(marker: Marker, nick: &str) -> String {
    format!("<span class=\"actionnick\">{}{}</span>", marker, escape_html(nick))
}

fn require(field: &str, value: &str) -> CoreResult<()> {
    if value.is_empty() {
        return Err(CoreError::malformed(format!("{field} is empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use proptest::prelude::*;

    fn at(h: u32, m: u32, s: u32) -> Timestamp {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, h, m, s)
            .unwrap()
    }

    fn message(text: &str) -> EventRecord {
        EventRecord::Message {
            timestamp: at(9, 5, 7),
            actor: "alice".into(),
            status_scope: Some("#rust".into()),
            text: text.into(),
            is_action: false,
        }
    }

    fn unescape_html(text: &str) -> String {
        text.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&")
    }

    fn cell<'a>(markup: &'a str, class: &str) -> &'a str {
        let open = format!("<td class=\"{class}\">");
        let start = markup.find(&open).unwrap() + open.len();
        let end = markup[start..].find("</td>").unwrap() + start;
        &markup[start..end]
    }

    #[test]
    fn message_row_shape() {
        let line = Renderer::default()
            .render(&message("hello"), Marks::single(Marker::Op))
            .unwrap();

        assert_eq!(line.anchor, "msg-09:05:07");
        assert_eq!(
            line.markup,
            concat!(
                "        <tr id=\"msg-09:05:07\">\n",
                "          <td class=\"msgtime\"><a href=\"#msg-09:05:07\">09:05:07</a></td>\n",
                "          <td class=\"msgnick\">@alice</td>\n",
                "          <td class=\"msgmessage\">hello</td>\n",
                "        </tr>\n",
            )
        );
    }

    #[test]
    fn display_format_does_not_change_anchor() {
        let renderer = Renderer::new("%H:%M").unwrap();
        let line = renderer.render(&message("hi"), Marks::none()).unwrap();
        assert_eq!(line.anchor, "msg-09:05:07");
        assert!(line.markup.contains("<a href=\"#msg-09:05:07\">09:05</a>"));
    }

    #[test]
    fn invalid_time_format_rejected() {
        assert!(Renderer::new("%Q").is_err());
        assert!(Renderer::new("").is_err());
        assert!(is_valid_time_format("%H:%M:%S"));
    }

    #[test]
    fn message_text_is_escaped() {
        let line = Renderer::default()
            .render(&message("</td><script>alert('x') & \"y\"</script>"), Marks::none())
            .unwrap();
        let body = cell(&line.markup, "msgmessage");
        assert!(!body.contains('<'));
        assert_eq!(
            body,
            "&lt;/td&gt;&lt;script&gt;alert(&#39;x&#39;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
    }

    #[test]
    fn action_row() {
        let event = EventRecord::Message {
            timestamp: at(1, 2, 3),
            actor: "bob".into(),
            status_scope: None,
            text: "waves <3".into(),
            is_action: true,
        };
        let line = Renderer::default().render(&event, Marks::single(Marker::Voice)).unwrap();
        assert!(line.markup.contains("<td class=\"msgnick\">*</td>"));
        assert_eq!(
            cell(&line.markup, "msgaction"),
            "<span class=\"actionnick\">+bob</span>&nbsp;waves &lt;3"
        );
    }

    #[test]
    fn own_message_uses_self_marker() {
        let event = EventRecord::OwnMessage {
            timestamp: at(1, 2, 3),
            bot_name: "scribe".into(),
            text: "beep".into(),
            is_notice: true,
            is_private: false,
        };
        let line = Renderer::default().render(&event, Marks::single(Marker::Op)).unwrap();
        assert!(line.markup.contains("<td class=\"msgnick\">:scribe</td>"));
        assert_eq!(cell(&line.markup, "msgmessage"), "beep");
    }

    #[test]
    fn topic_row() {
        let event = EventRecord::Topic {
            timestamp: at(1, 2, 3),
            actor: "carol".into(),
            status_scope: Some("#rust".into()),
            topic: "Rust & friends".into(),
        };
        let line = Renderer::default().render(&event, Marks::single(Marker::HalfOp)).unwrap();
        assert_eq!(
            cell(&line.markup, "msgtopic"),
            "<span class=\"actionnick\">%carol</span>&nbsp;changed the topic to “Rust &amp; friends”."
        );
    }

    #[test]
    fn nick_change_uses_both_markers() {
        let event = EventRecord::NickChange {
            timestamp: at(1, 2, 3),
            old_nick: "dave".into(),
            new_nick: "dave_away".into(),
            old_status_scope: Some("#rust".into()),
            new_status_scope: Some("#rust".into()),
        };
        let marks = Marks {
            actor: Marker::Op,
            new_nick: Marker::Voice,
        };
        let line = Renderer::default().render(&event, marks).unwrap();
        assert_eq!(
            cell(&line.markup, "msgnickchange"),
            "<span class=\"actionnick\">@dave</span>&nbsp;is now known as <span class=\"actionnick\">+dave_away</span>."
        );
    }

    #[test]
    fn join_row() {
        let event = EventRecord::Join {
            timestamp: at(1, 2, 3),
            actor: "erin".into(),
            status_scope: Some("#rust".into()),
            channel: "#rust".into(),
        };
        let line = Renderer::default().render(&event, Marks::none()).unwrap();
        assert!(line.markup.contains("<td class=\"msgnick\">--&gt;</td>"));
        assert_eq!(
            cell(&line.markup, "msgjoin"),
            "<span class=\"actionnick\">erin</span>&nbsp;entered #rust."
        );
    }

    #[test]
    fn leave_channel_and_network() {
        let part = EventRecord::Leave {
            timestamp: at(1, 2, 3),
            actor: "frank".into(),
            status_scope: Some("#rust".into()),
            reason: "bye <all>".into(),
            channel: Some("#rust".into()),
        };
        let line = Renderer::default().render(&part, Marks::none()).unwrap();
        assert!(line.markup.contains("<td class=\"msgnick\">&lt;--</td>"));
        assert_eq!(
            cell(&line.markup, "msgleave"),
            "<span class=\"actionnick\">frank</span>&nbsp;left #rust (bye &lt;all&gt;)."
        );

        let quit = EventRecord::Leave {
            timestamp: at(1, 2, 3),
            actor: "frank".into(),
            status_scope: None,
            reason: "Ping timeout".into(),
            channel: None,
        };
        let line = Renderer::default().render(&quit, Marks::none()).unwrap();
        assert_eq!(
            cell(&line.markup, "msgleave"),
            "<span class=\"actionnick\">frank</span>&nbsp;left the IRC network (Ping timeout)."
        );
    }

    #[test]
    fn mode_change_removed_first() {
        let added = vec![ModeFlag::with_argument('o', "alice")];
        let removed = vec![ModeFlag::with_argument('b', "*!*@host")];
        assert_eq!(mode_change_string(&added, &removed), "-b *!*@host+o alice");
    }

    #[test]
    fn mode_change_single_runs() {
        assert_eq!(
            mode_change_string(&[ModeFlag::bare('m'), ModeFlag::bare('n')], &[]),
            "+mn"
        );
        assert_eq!(
            mode_change_string(&[], &[ModeFlag::with_argument('v', "bob"), ModeFlag::bare('t')]),
            "-v bobt"
        );
        assert_eq!(
            mode_change_string(
                &[ModeFlag::with_argument('o', "a"), ModeFlag::with_argument('o', "b")],
                &[]
            ),
            "+o ao b"
        );
        assert_eq!(mode_change_string(&[], &[]), "");
    }

    #[test]
    fn mode_change_row() {
        let event = EventRecord::ModeChange {
            timestamp: at(1, 2, 3),
            actor: "oscar".into(),
            status_scope: Some("#rust".into()),
            added: vec![ModeFlag::with_argument('o', "alice")],
            removed: vec![ModeFlag::with_argument('b', "*!*@host")],
        };
        let line = Renderer::default().render(&event, Marks::single(Marker::Op)).unwrap();
        assert_eq!(
            cell(&line.markup, "msgmode"),
            "Mode -b *!*@host+o alice by <span class=\"actionnick\">@oscar</span>."
        );
    }

    #[test]
    fn malformed_events_fail_closed() {
        let renderer = Renderer::default();

        let empty_actor = EventRecord::Message {
            timestamp: at(1, 2, 3),
            actor: String::new(),
            status_scope: None,
            text: "x".into(),
            is_action: false,
        };
        assert!(matches!(
            renderer.render(&empty_actor, Marks::none()),
            Err(CoreError::MalformedEvent { .. })
        ));

        let empty_part_channel = EventRecord::Leave {
            timestamp: at(1, 2, 3),
            actor: "frank".into(),
            status_scope: None,
            reason: String::new(),
            channel: Some(String::new()),
        };
        assert!(matches!(
            renderer.render(&empty_part_channel, Marks::none()),
            Err(CoreError::MalformedEvent { .. })
        ));

        let no_flags = EventRecord::ModeChange {
            timestamp: at(1, 2, 3),
            actor: "oscar".into(),
            status_scope: None,
            added: vec![],
            removed: vec![],
        };
        assert!(matches!(
            renderer.render(&no_flags, Marks::none()),
            Err(CoreError::MalformedEvent { .. })
        ));
    }

    proptest! {
        #[test]
        fn escaped_message_body_restores_original(text in "\\PC*") {
            let line = Renderer::default().render(&message(&text), Marks::none()).unwrap();
            let body = cell(&line.markup, "msgmessage");
            prop_assert!(!body.contains('<'));
            prop_assert!(!body.contains('>'));
            prop_assert_eq!(unescape_html(body), text);
        }
    }
}
