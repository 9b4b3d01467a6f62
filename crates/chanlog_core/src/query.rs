//! Maps free-form date text to a segment link.
//!
//! Phrases are read in a past context: a bare weekday means the last one
//! before today, and a month-day pair means its most recent occurrence that
//! is not in the future.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use chrono::{Datelike, Days, Month, NaiveDate, Weekday};

/// Reply given when a phrase names no date.
pub const UNRESOLVED_REPLY: &str = "I really have no idea which logfile you want…";

/// Parses a date phrase relative to `today`.
///
/// Returns `None` if the phrase is not understood. An empty phrase means
/// today.
#[must_use]
pub fn parse_date_phrase(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let normalized = text
        .trim()
        .trim_end_matches(['?', '!', '.'])
        .to_lowercase()
        .replace(',', " ");
    let words: Vec<&str> = normalized.split_whitespace().collect();

    match words.as_slice() {
        [] | ["today" | "now"] => Some(today),
        ["yesterday"] => today.pred_opt(),
        ["tomorrow"] => today.succ_opt(),
        ["last", "week"] => today.checked_sub_days(Days::new(7)),
        [count, unit, "ago"] => {
            let count = parse_count(count)?;
            let days = match *unit {
                "day" | "days" => count,
                "week" | "weeks" => count.checked_mul(7)?,
                _ => return None,
            };
            today.checked_sub_days(Days::new(days))
        }
        ["last", day] => weekday_before(today, day.parse::<Weekday>().ok()?),
        [single] => {
            if let Ok(weekday) = single.parse::<Weekday>() {
                return weekday_before(today, weekday);
            }
            parse_numeric(single)
        }
        [first, second] => {
            let (month, day) = match (first.parse::<Month>(), second.parse::<Month>()) {
                (Ok(month), _) => (month, parse_day(second)?),
                (_, Ok(month)) => (month, parse_day(first)?),
                _ => return None,
            };
            most_recent(today, month.number_from_month(), day)
        }
        _ => None,
    }
}

fn parse_numeric(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y/%m/%d"))
        .ok()
}

fn parse_count(word: &str) -> Option<u64> {
    let count = match word {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        _ => word.parse().ok()?,
    };
    Some(count)
}

fn parse_day(word: &str) -> Option<u32> {
    let digits = word
        .strip_suffix("st")
        .or_else(|| word.strip_suffix("nd"))
        .or_else(|| word.strip_suffix("rd"))
        .or_else(|| word.strip_suffix("th"))
        .unwrap_or(word);
    let day: u32 = digits.parse().ok()?;
    (1..=31).contains(&day).then_some(day)
}

fn weekday_before(today: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    let back = (today.weekday().num_days_from_monday() + 7 - weekday.num_days_from_monday()) % 7;
    let back = if back == 0 { 7 } else { back };
    today.checked_sub_days(Days::new(u64::from(back)))
}

fn most_recent(today: NaiveDate, month: u32, day: u32) -> Option<NaiveDate> {
    // Feb 29 may be up to eight years back
    (0..=8)
        .filter_map(|back| NaiveDate::from_ymd_opt(today.year() - back, month, day))
        .find(|date| *date <= today)
}

/// Answers "which log do you mean" requests with a URL.
#[derive(Debug, Clone)]
pub struct DateQuery {
    base_url: String,
    extension: String,
}

impl DateQuery {
    /// Creates a query for segments published under `base_url`.
    pub fn new(base_url: impl Into<String>, extension: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            extension: extension.into(),
        }
    }

    /// Takes the base URL and extension from a [`Config`].
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.base_url.clone(), config.extension.clone())
    }

    /// Resolves `phrase` to a calendar date.
    ///
    /// # Errors
    ///
    /// Returns `ResolutionFailure` if the phrase names no date.
    pub fn resolve(&self, phrase: &str, today: NaiveDate) -> CoreResult<NaiveDate> {
        parse_date_phrase(phrase, today).ok_or_else(|| CoreError::resolution_failure(phrase))
    }

    /// The public URL of the segment for `date`.
    #[must_use]
    pub fn link(&self, date: NaiveDate) -> String {
        format!(
            "{}/{}.{}",
            self.base_url,
            date.format("%Y-%m-%d"),
            self.extension
        )
    }

    /// The user-visible reply: a link, or [`UNRESOLVED_REPLY`].
    #[must_use]
    pub fn reply(&self, phrase: &str, today: NaiveDate) -> String {
        match self.resolve(phrase, today) {
            Ok(date) => self.link(date),
            Err(_) => UNRESOLVED_REPLY.to_string(),
        }
    }
}
