//! Rotation resolution: whose turn it is on a rotating chore.
//!
//! Once a chore has been completed the stored cursor (`rotationIndex`) is
//! authoritative and moves exactly one step per completion. Before that, the
//! turn is derived from the time elapsed since the rotation's base date.

use chrono::NaiveDate;

use crate::dates::{date_key, days_between, months_between};
use crate::entities::{Chore, CycleType};
use crate::recurrence::get_next_due_after;

/// Base date for calendar-derived turns when a chore has neither a rotation
/// start date nor a start date.
pub const ROTATION_EPOCH: (i32, u32, u32) = (2024, 1, 1);

pub fn rotation_epoch() -> NaiveDate {
    let (year, month, day) = ROTATION_EPOCH;
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

/// Normalize any cursor into `[0, len)`. `len` must be non-zero.
fn wrap(cursor: i64, len: usize) -> usize {
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    // rem_euclid with a positive divisor is always in [0, len)
    usize::try_from(cursor.rem_euclid(len)).unwrap_or(0)
}

/// Index into `rotation.members` of whoever is up on `date`.
///
/// Returns 0 for chores without members.
pub fn get_rotation_index(chore: &Chore, date: NaiveDate) -> usize {
    let Some(rotation) = chore.rotation.as_ref() else {
        return 0;
    };
    let len = rotation.members.len();
    if len == 0 {
        return 0;
    }

    if let Some(cursor) = chore.stored_rotation_cursor() {
        return wrap(cursor, len);
    }

    let base = rotation
        .start_date
        .or(chore.start_date)
        .unwrap_or_else(rotation_epoch);
    let diff_days = days_between(base, date);

    let steps = match rotation.cycle_type {
        CycleType::Daily | CycleType::EveryXDays => {
            diff_days.div_euclid(i64::from(rotation.every_days.max(1)))
        }
        CycleType::Weekly => diff_days.div_euclid(7 * i64::from(rotation.cycle_length.max(1))),
        CycleType::Monthly => {
            months_between(date, base).div_euclid(i64::from(rotation.cycle_length.max(1)))
        }
    };

    tracing::trace!(
        subject = %chore.subject,
        base = %date_key(base),
        steps,
        "derived rotation turn from calendar"
    );
    wrap(steps, len)
}

/// The member holding the rotation on `date`, if any.
pub fn current_member(chore: &Chore, date: NaiveDate) -> Option<&str> {
    chore
        .rotation_members()
        .get(get_rotation_index(chore, date))
        .map(String::as_str)
}

/// The `assigned` cache value that needs no date: the stored cursor's holder,
/// or the first member when no cursor was ever recorded.
pub fn cached_assignee(chore: &Chore) -> Vec<String> {
    let members = chore.rotation_members();
    if members.is_empty() {
        return Vec::new();
    }
    let index = chore
        .stored_rotation_cursor()
        .map(|cursor| wrap(cursor, members.len()))
        .unwrap_or(0);
    vec![members[index].clone()]
}

/// Rebuild the `assigned` cache of a rotating chore for `date`.
///
/// Fixed chores are returned unchanged.
pub fn refresh_assigned(chore: &Chore, date: NaiveDate) -> Chore {
    if !chore.is_rotating() {
        return chore.clone();
    }
    Chore {
        assigned: current_member(chore, date)
            .map(|member| vec![member.to_string()])
            .unwrap_or_default(),
        ..chore.clone()
    }
}

/// Record a completion of a rotating chore on `date` and pass the turn on.
///
/// The previous cursor is kept in `rotationIndexPrev` so the completed chore
/// can keep showing who did it. Fixed chores and rotations without members
/// are returned unchanged.
pub fn advance_rotation(chore: &Chore, date: NaiveDate) -> Chore {
    let len = chore.rotation_members().len();
    if !chore.is_rotating() || len == 0 {
        return chore.clone();
    }

    let current = get_rotation_index(chore, date);
    let next = (current + 1) % len;

    let advanced = Chore {
        rotation_index_prev: i64::try_from(current).ok(),
        rotation_index: i64::try_from(next).ok(),
        rotation_position: None,
        rotation_cursor: None,
        last_completed_date: Some(date),
        completed_through: get_next_due_after(chore, date),
        completed: true,
        completed_by: Some(Vec::new()),
        ..chore.clone()
    };

    tracing::debug!(
        subject = %chore.subject,
        from = current,
        to = next,
        "advanced rotation"
    );
    refresh_assigned(&advanced, date)
}
