//! Recurrence resolution: which calendar days a chore lands on.
//!
//! All functions here are pure and agree with each other: every date
//! produced by [`get_next_due_date`] or [`get_due_dates_in_range`] satisfies
//! [`is_due_on_date`], and no due day is ever skipped.

use chrono::{Datelike, NaiveDate};

use crate::dates::{
    add_days, date_in_month, days_between, month_ordinal, months_between, weekday_index,
};
use crate::entities::{Chore, Frequency};

/// Weekday the chore is due on: explicit `dayOfWeek`, else the start date's
/// weekday, else Sunday.
fn effective_day_of_week(chore: &Chore) -> u32 {
    chore
        .recurrence
        .day_of_week
        .or_else(|| chore.start_date.map(weekday_index))
        .unwrap_or(0)
}

/// Day of month the chore is due on: explicit `dayOfMonth`, else the start
/// date's day, else the 1st.
fn effective_day_of_month(chore: &Chore) -> u32 {
    chore
        .recurrence
        .day_of_month
        .or_else(|| chore.start_date.map(|d| d.day()))
        .unwrap_or(1)
}

fn interval(chore: &Chore) -> i64 {
    i64::from(chore.recurrence.interval.max(1))
}

/// Whether the chore's recurrence lands on `date`.
pub fn is_due_on_date(chore: &Chore, date: NaiveDate) -> bool {
    if let Some(start) = chore.start_date {
        if date < start {
            return false;
        }
    }

    let n = interval(chore);
    match chore.recurrence.frequency {
        Frequency::Daily => match chore.start_date {
            Some(start) => days_between(start, date).rem_euclid(n) == 0,
            None => true,
        },
        Frequency::Once => chore.once_due_date() == Some(date),
        Frequency::Weekly => {
            if weekday_index(date) != effective_day_of_week(chore) {
                return false;
            }
            match chore.start_date {
                Some(start) => days_between(start, date).div_euclid(7).rem_euclid(n) == 0,
                None => true,
            }
        }
        Frequency::Monthly => {
            if date.day() != effective_day_of_month(chore) {
                return false;
            }
            match chore.start_date {
                Some(start) => months_between(date, start).rem_euclid(n) == 0,
                None => true,
            }
        }
        Frequency::Other => true,
    }
}

/// Earliest due date on or after `from_date` (and never before the start
/// date).
///
/// Returns `None` when there is no such date: a `once` chore whose day has
/// passed, or a monthly rule on a day that never occurs in an eligible month.
pub fn get_next_due_date(chore: &Chore, from_date: NaiveDate) -> Option<NaiveDate> {
    let from = match chore.start_date {
        Some(start) if from_date < start => start,
        _ => from_date,
    };

    let n = interval(chore);
    match chore.recurrence.frequency {
        Frequency::Daily => match chore.start_date {
            Some(start) => {
                let offset = days_between(start, from).rem_euclid(n);
                let skip = if offset == 0 { 0 } else { n - offset };
                Some(add_days(from, skip.unsigned_abs()))
            }
            None => Some(from),
        },
        Frequency::Once => chore.once_due_date().filter(|due| *due >= from),
        Frequency::Weekly => {
            // One full interval of weeks always contains the next occurrence.
            let horizon = 7 * n + 7;
            (0..horizon)
                .map(|offset| add_days(from, offset.unsigned_abs()))
                .find(|candidate| is_due_on_date(chore, *candidate))
        }
        Frequency::Monthly => next_monthly(chore, from),
        Frequency::Other => Some(from),
    }
}

fn next_monthly(chore: &Chore, from: NaiveDate) -> Option<NaiveDate> {
    let day = effective_day_of_month(chore);
    let n = interval(chore);
    let first_month = month_ordinal(from);
    let start_month = chore.start_date.map(month_ordinal);

    // The (month, interval) pattern repeats every lcm(12, n) <= 12n months.
    (0..=12 * n + 12)
        .map(|step| first_month + step)
        .filter(|month| match start_month {
            Some(start) => (month - start).rem_euclid(n) == 0,
            None => true,
        })
        .filter_map(|month| date_in_month(month, day))
        .find(|candidate| *candidate >= from)
}

/// Next due date strictly after `date`. Always `None` for `once` chores.
pub fn get_next_due_after(chore: &Chore, date: NaiveDate) -> Option<NaiveDate> {
    if chore.recurrence.frequency == Frequency::Once {
        return None;
    }
    let next_day = date.succ_opt()?;
    get_next_due_date(chore, next_day)
}

/// Every due date in `[start, end]`, ascending.
pub fn get_due_dates_in_range(chore: &Chore, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    if end < start {
        return dates;
    }

    let mut cursor = get_next_due_date(chore, start);
    while let Some(date) = cursor {
        if date > end {
            break;
        }
        dates.push(date);
        if chore.recurrence.frequency == Frequency::Once {
            break;
        }
        cursor = date.succ_opt().and_then(|next| get_next_due_date(chore, next));
    }
    dates
}
