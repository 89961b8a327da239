//! Message timestamp classification and display labels
//!
//! Classification compares calendar fields in the time zone of `now`:
//!
//! | Class       | Condition                              | Label        |
//! |-------------|----------------------------------------|--------------|
//! | `Today`     | same year and same day-of-year         | `3:07 PM`    |
//! | `SameYear`  | same year                              | `Mar 4`      |
//! | `OtherYear` | anything else                          | `Mar 4 2023` |

use chrono::{DateTime, Datelike, LocalResult, TimeZone};

/// How a message date relates to the current date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateClass {
    Today,
    SameYear,
    OtherYear,
}

impl DateClass {
    /// `chrono` format string for this class
    pub fn format_str(&self) -> &'static str {
        match self {
            Self::Today => "%-I:%M %p",
            Self::SameYear => "%b %-d",
            Self::OtherYear => "%b %-d %Y",
        }
    }
}

/// Day header used when grouping messages inside a conversation
pub const DAY_HEADER_FORMAT: &str = "%A, %b %d, %Y";

/// Clock label shown under each message
pub const MESSAGE_TIME_FORMAT: &str = "%I:%M %p";

/// Classify `message` against `now`; today wins over same year
pub fn classify<Tz: TimeZone>(message: &DateTime<Tz>, now: &DateTime<Tz>) -> DateClass {
    if message.year() == now.year() && message.ordinal() == now.ordinal() {
        DateClass::Today
    } else if message.year() == now.year() {
        DateClass::SameYear
    } else {
        DateClass::OtherYear
    }
}

/// Convert epoch milliseconds into `tz`
///
/// Returns `None` for instants chrono cannot represent.
pub fn from_millis<Tz: TimeZone>(millis: i64, tz: &Tz) -> Option<DateTime<Tz>> {
    match tz.timestamp_millis_opt(millis) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => None,
    }
}

/// Conversation list label for a message timestamp
pub fn format_timestamp<Tz>(millis: i64, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match from_millis(millis, &now.timezone()) {
        Some(dt) => {
            let class = classify(&dt, now);
            dt.format(class.format_str()).to_string()
        }
        None => String::new(),
    }
}

/// Day header label, e.g. `Sunday, Jul 23, 2023`
pub fn day_header<Tz>(millis: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    from_millis(millis, tz)
        .map(|dt| dt.format(DAY_HEADER_FORMAT).to_string())
        .unwrap_or_default()
}

/// Clock label, e.g. `03:07 PM`
pub fn message_time<Tz>(millis: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    from_millis(millis, tz)
        .map(|dt| dt.format(MESSAGE_TIME_FORMAT).to_string())
        .unwrap_or_default()
}

/// Group items under their day header
///
/// Groups appear in first-seen order and keep item order within each group.
pub fn group_by_day<'a, T, Tz, F>(items: &'a [T], tz: &Tz, millis: F) -> Vec<(String, Vec<&'a T>)>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
    F: Fn(&T) -> i64,
{
    let mut groups: Vec<(String, Vec<&'a T>)> = Vec::new();

    for item in items {
        let header = day_header(millis(item), tz);
        match groups.iter_mut().find(|(h, _)| *h == header) {
            Some((_, members)) => members.push(item),
            None => groups.push((header, vec![item])),
        }
    }

    groups
}
