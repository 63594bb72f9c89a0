//! Day, week and month views over a chore list.
//!
//! These compose the resolvers into what a calendar screen renders: which
//! chores appear on a day (postponements included), who is on each, and
//! whether it is done.

use chrono::NaiveDate;
use serde::Serialize;

use crate::completion::{get_assigned_members, is_chore_complete};
use crate::dates::{add_days, end_of_month, end_of_week, start_of_month, start_of_week};
use crate::entities::Chore;
use crate::postpone::{is_due_with_postpones, postponed_from, PostponeEntry};
use crate::recurrence::get_next_due_date;

/// One chore as it appears on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledChore {
    pub subject: String,
    pub assigned: Vec<String>,
    pub complete: bool,
    /// Set when this instance was moved here from an earlier day.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postponed_from: Option<NaiveDate>,
}

/// Everything scheduled on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayAgenda {
    pub date: NaiveDate,
    pub chores: Vec<ScheduledChore>,
}

impl DayAgenda {
    pub fn is_empty(&self) -> bool {
        self.chores.is_empty()
    }

    /// Chores on this day that are still open.
    pub fn outstanding(&self) -> impl Iterator<Item = &ScheduledChore> {
        self.chores.iter().filter(|c| !c.complete)
    }
}

/// Chores showing up on `date`, in list order.
pub fn chores_for_date(
    chores: &[Chore],
    postpones: &[PostponeEntry],
    date: NaiveDate,
) -> Vec<ScheduledChore> {
    chores
        .iter()
        .filter(|chore| is_due_with_postpones(chore, postpones, date))
        .map(|chore| {
            let assigned = get_assigned_members(chore, date);
            let complete = is_chore_complete(chore, Some(&assigned), date);
            ScheduledChore {
                subject: chore.subject.clone(),
                assigned,
                complete,
                postponed_from: postponed_from(postpones, &chore.subject, date),
            }
        })
        .collect()
}

/// One [`DayAgenda`] per day in `[start, end]`, including empty days.
pub fn agenda(
    chores: &[Chore],
    postpones: &[PostponeEntry],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<DayAgenda> {
    let mut days = Vec::new();
    let mut date = start;
    while date <= end {
        days.push(DayAgenda {
            date,
            chores: chores_for_date(chores, postpones, date),
        });
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    days
}

/// Agenda for the Sunday-to-Saturday week containing `date`.
pub fn week_agenda(
    chores: &[Chore],
    postpones: &[PostponeEntry],
    date: NaiveDate,
) -> Vec<DayAgenda> {
    agenda(chores, postpones, start_of_week(date), end_of_week(date))
}

/// Agenda for the calendar month containing `date`.
pub fn month_agenda(
    chores: &[Chore],
    postpones: &[PostponeEntry],
    date: NaiveDate,
) -> Vec<DayAgenda> {
    agenda(chores, postpones, start_of_month(date), end_of_month(date))
}

/// The next `limit` due dates of `chore` on or after `from`.
pub fn upcoming_due_dates(chore: &Chore, from: NaiveDate, limit: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(limit);
    let mut cursor = get_next_due_date(chore, from);
    while let Some(date) = cursor {
        if dates.len() >= limit {
            break;
        }
        dates.push(date);
        cursor = get_next_due_date(chore, add_days(date, 1)).filter(|next| *next > date);
    }
    dates
}
