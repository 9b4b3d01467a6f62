//! Lines accepted on stdin by `chanlog run`.
//!
//! Each line is a JSON object with a `type` field. Event types map onto
//! [`EventRecord`]; the control types below keep channel state current.

use chanlog_core::EventRecord;
use serde::Deserialize;

/// Non-event input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Control {
    /// Sets a member's privileges in a channel.
    Member {
        channel: String,
        nick: String,
        #[serde(default)]
        op: bool,
        #[serde(default)]
        half_op: bool,
        #[serde(default)]
        voice: bool,
    },
    /// Removes a member from a channel.
    Gone { channel: String, nick: String },
    /// The program's nick changed.
    OwnNick { nick: String },
}

impl Control {
    const TYPES: [&'static str; 3] = ["member", "gone", "own_nick"];
}

/// One parsed stdin line.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Event(EventRecord),
    Control(Control),
}

/// Parses one line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Input>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let value: serde_json::Value = serde_json::from_str(line)?;
    let is_control = value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .is_some_and(|kind| Control::TYPES.contains(&kind));

    let input = if is_control {
        Input::Control(serde_json::from_value(value)?)
    } else {
        Input::Event(serde_json::from_value(value)?)
    };
    Ok(Some(input))
}
