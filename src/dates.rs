//! Calendar-day helpers shared by every resolver.
//!
//! The engine works on whole days only. Anything carrying a time of day is
//! normalized to its local calendar day before it reaches a resolver, and
//! dates cross the crate boundary as canonical `YYYY-MM-DD` date-keys.

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, NaiveDateTime};

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Normalize a local timestamp to its calendar day.
pub fn calendar_day(datetime: DateTime<Local>) -> NaiveDate {
    datetime.date_naive()
}

/// Today's local calendar day.
pub fn today() -> NaiveDate {
    calendar_day(Local::now())
}

/// Encode a calendar day as a `YYYY-MM-DD` date-key.
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Parse a date-key into a calendar day.
///
/// Accepts the canonical `YYYY-MM-DD` form as well as ISO 8601 datetimes
/// (`YYYY-MM-DDTHH:MM[:SS]`, optionally with an offset), which are reduced
/// to the calendar day they name in their own offset, never the host's zone.
/// Returns `None` for anything else.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_KEY_FORMAT) {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.date());
        }
    }

    None
}

/// Whole days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Calendar months from `earlier` to `later`, ignoring the day of month:
/// `(y2 - y1) * 12 + (m2 - m1)`.
pub fn months_between(later: NaiveDate, earlier: NaiveDate) -> i64 {
    (i64::from(later.year()) - i64::from(earlier.year())) * 12
        + (i64::from(later.month()) - i64::from(earlier.month()))
}

pub fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

/// Day of week with Sunday as 0, matching the stored `dayOfWeek` field.
pub fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// First day (Sunday) of the week containing `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(weekday_index(date))))
        .unwrap_or(NaiveDate::MIN)
}

/// Last day (Saturday) of the week containing `date`.
pub fn end_of_week(date: NaiveDate) -> NaiveDate {
    add_days(start_of_week(date), 6)
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(date)
}

/// Months elapsed since January of year 0.
///
/// Used to step through months without worrying about day overflow.
pub(crate) fn month_ordinal(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

/// Build the date for `day` within the month identified by `ordinal`
/// (see [`month_ordinal`]). Returns `None` if the month has no such day.
pub(crate) fn date_in_month(ordinal: i64, day: u32) -> Option<NaiveDate> {
    let year = i32::try_from(ordinal.div_euclid(12)).ok()?;
    let month = u32::try_from(ordinal.rem_euclid(12)).ok()? + 1;
    NaiveDate::from_ymd_opt(year, month, day)
}
