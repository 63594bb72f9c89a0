//! Postpone overrides: moving one due instance of a chore to another day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::completion::{get_assigned_members, is_chore_complete};
use crate::dates::add_days;
use crate::entities::Chore;
use crate::recurrence::is_due_on_date;

/// The instance of `subject` originally due on `from_date` is moved to `to_date`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostponeEntry {
    pub subject: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

impl PostponeEntry {
    pub fn new(subject: impl Into<String>, from_date: NaiveDate, to_date: NaiveDate) -> Self {
        Self {
            subject: subject.into(),
            from_date,
            to_date,
        }
    }

    fn same_instance(&self, subject: &str, from_date: NaiveDate) -> bool {
        self.subject == subject && self.from_date == from_date
    }
}

/// Record a postponement, replacing any earlier one for the same
/// `(subject, from_date)` instance.
pub fn postpone(entries: &[PostponeEntry], entry: PostponeEntry) -> Vec<PostponeEntry> {
    let mut next: Vec<PostponeEntry> = entries
        .iter()
        .filter(|e| !e.same_instance(&entry.subject, entry.from_date))
        .cloned()
        .collect();
    next.push(entry);
    next
}

/// Union of two postpone lists; identical entries collapse to one, keeping
/// the order of first appearance.
pub fn merge_postpones(left: &[PostponeEntry], right: &[PostponeEntry]) -> Vec<PostponeEntry> {
    let mut merged: Vec<PostponeEntry> = Vec::with_capacity(left.len() + right.len());
    for entry in left.iter().chain(right) {
        if !merged.contains(entry) {
            merged.push(entry.clone());
        }
    }
    merged
}

/// Where the instance of `subject` due on `from_date` was moved, if anywhere.
pub fn postponed_to(
    entries: &[PostponeEntry],
    subject: &str,
    from_date: NaiveDate,
) -> Option<NaiveDate> {
    entries
        .iter()
        .rev()
        .find(|e| e.same_instance(subject, from_date))
        .map(|e| e.to_date)
}

/// Original due date of an instance of `subject` moved onto `date`.
pub fn postponed_from(
    entries: &[PostponeEntry],
    subject: &str,
    date: NaiveDate,
) -> Option<NaiveDate> {
    entries
        .iter()
        .find(|e| e.subject == subject && e.to_date == date && e.from_date != date)
        .map(|e| e.from_date)
}

/// Whether `chore` shows up on `date` once postponements are applied: either
/// it is natively due and was not moved away, or an instance was moved onto
/// this day.
pub fn is_due_with_postpones(chore: &Chore, entries: &[PostponeEntry], date: NaiveDate) -> bool {
    if postponed_from(entries, &chore.subject, date).is_some() {
        return true;
    }
    if !is_due_on_date(chore, date) {
        return false;
    }
    match postponed_to(entries, &chore.subject, date) {
        Some(target) => target == date,
        None => true,
    }
}

/// Drop the postponements of `subject` that land on `date`: the instance was
/// completed late or abandoned.
pub fn clear_postpones(
    entries: &[PostponeEntry],
    subject: &str,
    date: NaiveDate,
) -> Vec<PostponeEntry> {
    entries
        .iter()
        .filter(|e| !(e.subject == subject && e.to_date == date))
        .cloned()
        .collect()
}

/// Drop postponements targeting days before `cutoff`.
pub fn prune_postpones(entries: &[PostponeEntry], cutoff: NaiveDate) -> Vec<PostponeEntry> {
    entries
        .iter()
        .filter(|e| e.to_date >= cutoff)
        .cloned()
        .collect()
}

/// Day-boundary rollover: push every chore that was due and left undone on
/// `day` to the following day.
///
/// Entries that moved an instance onto `day` are replaced by the new
/// `day -> day + 1` entry. An existing entry for `(subject, day)` is left as
/// it is. Rotations are not advanced.
pub fn auto_postpone_undone(
    chores: &[Chore],
    entries: &[PostponeEntry],
    day: NaiveDate,
) -> Vec<PostponeEntry> {
    let next_day = add_days(day, 1);
    let mut result = entries.to_vec();
    let mut rolled = 0usize;

    for chore in chores {
        if !is_due_with_postpones(chore, entries, day) {
            continue;
        }
        let assigned = get_assigned_members(chore, day);
        if is_chore_complete(chore, Some(&assigned), day) {
            continue;
        }

        if result.iter().any(|e| e.same_instance(&chore.subject, day)) {
            continue;
        }
        result.retain(|e| !(e.subject == chore.subject && e.to_date == day));
        result.push(PostponeEntry::new(chore.subject.clone(), day, next_day));
        rolled += 1;
    }

    tracing::debug!(day = %day, rolled, "auto-postponed undone chores");
    result
}
