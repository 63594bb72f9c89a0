//! Completion and assignment resolution.
//!
//! Composes recurrence, rotation and the stored progress fields to answer
//! "who is on this chore on day D" and "does it count as done on day D", and
//! implements the toggle transitions the UI triggers.

use chrono::NaiveDate;

use crate::entities::Chore;
use crate::recurrence::get_next_due_after;
use crate::rotation::{advance_rotation, get_rotation_index};

/// Whether the chore's last completion is still in effect on `date`.
///
/// Legacy records without `completedThrough` behave differently by
/// assignment type: fixed chores stay complete, while rotating chores that
/// also lack `lastCompletedDate` are treated as not complete so the rotation
/// can move on.
pub fn is_completion_active(chore: &Chore, date: NaiveDate) -> bool {
    if !chore.completed {
        return false;
    }

    if let Some(through) = chore.completed_through {
        return date < through;
    }

    if !chore.is_rotating() {
        return true;
    }

    match chore.last_completed_date {
        None => false,
        Some(last) => match get_next_due_after(chore, last) {
            Some(next_due) => date < next_due,
            None => true,
        },
    }
}

/// Members responsible for the chore on `date`.
///
/// For a rotating chore whose completion is still active this is whoever
/// just completed it, not whoever is up next.
pub fn get_assigned_members(chore: &Chore, date: NaiveDate) -> Vec<String> {
    if !chore.is_rotating() {
        return chore.assigned.clone();
    }

    let members = chore.rotation_members();
    if members.is_empty() {
        return Vec::new();
    }
    let len = members.len();
    let index = get_rotation_index(chore, date);

    let holder = if is_completion_active(chore, date) {
        match chore.rotation_index_prev {
            Some(prev) => wrap_prev(prev, len),
            // No recorded previous cursor: step back from the current one
            None => (index + len - 1) % len,
        }
    } else {
        index
    };

    vec![members[holder].clone()]
}

fn wrap_prev(prev: i64, len: usize) -> usize {
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    usize::try_from(prev.rem_euclid(len)).unwrap_or(0)
}

fn resolve_assigned<'a>(chore: &'a Chore, assigned_override: Option<&'a [String]>) -> &'a [String] {
    assigned_override.unwrap_or(chore.assigned.as_slice())
}

/// Members who have checked the chore off.
///
/// A stored `completedBy` list is authoritative, even when empty. Without
/// one, a completed chore counts as done by everyone assigned.
pub fn get_completed_by(chore: &Chore, assigned_override: Option<&[String]>) -> Vec<String> {
    if let Some(completed_by) = &chore.completed_by {
        return completed_by.clone();
    }
    if chore.completed {
        resolve_assigned(chore, assigned_override).to_vec()
    } else {
        Vec::new()
    }
}

/// Whether the chore counts as complete on `date`.
///
/// Chores with several assignees need every one of them in `completedBy`.
/// Single-assignee chores follow [`is_completion_active`].
pub fn is_chore_complete(
    chore: &Chore,
    assigned_override: Option<&[String]>,
    date: NaiveDate,
) -> bool {
    let assigned = resolve_assigned(chore, assigned_override);
    if assigned.len() > 1 {
        let completed_by = get_completed_by(chore, Some(assigned));
        assigned.iter().all(|member| completed_by.contains(member))
    } else {
        is_completion_active(chore, date)
    }
}

/// Mark the chore done on `date`: rotating chores pass the turn on, fixed
/// chores record who completed it and until when the completion holds.
fn complete(chore: &Chore, date: NaiveDate, completed_by: Vec<String>) -> Chore {
    if chore.is_rotating() && !chore.rotation_members().is_empty() {
        return advance_rotation(chore, date);
    }
    Chore {
        completed: true,
        completed_by: Some(completed_by),
        last_completed_date: Some(date),
        completed_through: get_next_due_after(chore, date),
        ..chore.clone()
    }
}

fn clear_completion(chore: &Chore) -> Chore {
    Chore {
        completed: false,
        completed_by: None,
        ..chore.clone()
    }
}

/// Toggle the whole chore on `date`.
///
/// Completing passes the rotation on (rotating chores). Un-completing clears
/// `completed` and `completedBy` and never rolls the rotation back.
pub fn toggle_completion(chore: &Chore, date: NaiveDate) -> Chore {
    let assigned = get_assigned_members(chore, date);
    if is_chore_complete(chore, Some(&assigned), date) {
        clear_completion(chore)
    } else {
        complete(chore, date, assigned)
    }
}

/// Toggle one member's check-in on `date`.
///
/// Only multi-assignee chores track individual check-ins; for anything else
/// this is the same as [`toggle_completion`]. The chore becomes complete
/// when the last assignee checks in, which is also the only point where a
/// rotation advances.
pub fn toggle_member_completion(chore: &Chore, member: &str, date: NaiveDate) -> Chore {
    let assigned = get_assigned_members(chore, date);
    if assigned.len() <= 1 {
        return toggle_completion(chore, date);
    }

    let was_complete = is_chore_complete(chore, Some(&assigned), date);
    let mut completed_by = get_completed_by(chore, Some(&assigned));
    if let Some(pos) = completed_by.iter().position(|m| m == member) {
        completed_by.remove(pos);
    } else {
        completed_by.push(member.to_string());
    }
    let now_complete = assigned.iter().all(|m| completed_by.contains(m));

    if now_complete && !was_complete {
        return complete(chore, date, completed_by);
    }

    Chore {
        completed: now_complete,
        completed_by: Some(completed_by),
        ..chore.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{AssignmentType, CycleType, Recurrence, Rotation};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn fixed(assigned: &[&str]) -> Chore {
        Chore {
            subject: "Laundry".to_string(),
            assigned: names(assigned),
            recurrence: Recurrence::daily(1),
            start_date: Some(d(2025, 1, 1)),
            ..Default::default()
        }
    }

    fn rotating(members: &[&str]) -> Chore {
        Chore {
            subject: "Dishes".to_string(),
            assignment_type: AssignmentType::Rotating,
            assigned: names(&members[..1]),
            rotation: Some(Rotation::new(members.iter().copied(), CycleType::Weekly)),
            recurrence: Recurrence::daily(1),
            start_date: Some(d(2025, 1, 1)),
            ..Default::default()
        }
    }

    #[test]
    fn test_incomplete_chore_is_not_active() {
        assert!(!is_completion_active(&fixed(&["A"]), d(2025, 1, 1)));
    }

    #[test]
    fn test_completed_through_is_exclusive() {
        let mut chore = fixed(&["A"]);
        chore.completed = true;
        chore.completed_through = Some(d(2025, 1, 5));

        assert!(is_completion_active(&chore, d(2025, 1, 4)));
        assert!(!is_completion_active(&chore, d(2025, 1, 5)));
    }

    #[test]
    fn test_legacy_fixed_completion_never_expires() {
        let mut chore = fixed(&["A"]);
        chore.completed = true;
        assert!(is_completion_active(&chore, d(2030, 1, 1)));
    }

    #[test]
    fn test_legacy_rotating_completion_without_dates_is_inactive() {
        let mut chore = rotating(&["A", "B"]);
        chore.completed = true;
        assert!(!is_completion_active(&chore, d(2025, 1, 1)));
    }

    #[test]
    fn test_legacy_rotating_completion_uses_last_completed_date() {
        let mut chore = rotating(&["A", "B"]);
        chore.recurrence = Recurrence::daily(3);
        chore.completed = true;
        chore.last_completed_date = Some(d(2025, 1, 1));

        assert!(is_completion_active(&chore, d(2025, 1, 3)));
        assert!(!is_completion_active(&chore, d(2025, 1, 4)));
    }

    #[test]
    fn test_legacy_rotating_once_stays_active() {
        let mut chore = rotating(&["A", "B"]);
        chore.recurrence = Recurrence::once();
        chore.completed = true;
        chore.last_completed_date = Some(d(2025, 1, 1));
        assert!(is_completion_active(&chore, d(2026, 1, 1)));
    }

    #[test]
    fn test_fixed_assignees_returned_verbatim() {
        let chore = fixed(&["A", "B"]);
        assert_eq!(get_assigned_members(&chore, d(2025, 1, 1)), names(&["A", "B"]));
    }

    #[test]
    fn test_rotating_shows_upcoming_member_when_incomplete() {
        let mut chore = rotating(&["A", "B", "C"]);
        chore.rotation_index = Some(1);
        assert_eq!(get_assigned_members(&chore, d(2025, 1, 1)), names(&["B"]));
    }

    #[test]
    fn test_completion_shows_previous_member_until_expiry() {
        let mut chore = rotating(&["A", "B", "C"]);
        chore.rotation_index = Some(1);

        let done = advance_rotation(&chore, d(2025, 1, 1));
        assert_eq!(done.rotation_index, Some(2));
        assert_eq!(done.rotation_index_prev, Some(1));
        assert!(is_completion_active(&done, d(2025, 1, 1)));
        assert_eq!(get_assigned_members(&done, d(2025, 1, 1)), names(&["B"]));

        // Next day the completion has expired and C is up
        assert!(!is_completion_active(&done, d(2025, 1, 2)));
        assert_eq!(get_assigned_members(&done, d(2025, 1, 2)), names(&["C"]));
    }

    #[test]
    fn test_active_completion_without_prev_steps_back() {
        let mut chore = rotating(&["A", "B", "C"]);
        chore.completed = true;
        chore.completed_through = Some(d(2025, 1, 2));
        chore.rotation_index = Some(0);
        assert_eq!(get_assigned_members(&chore, d(2025, 1, 1)), names(&["C"]));
    }

    #[test]
    fn test_rotating_without_members_has_no_assignees() {
        let mut chore = rotating(&["A"]);
        chore.rotation = None;
        assert!(get_assigned_members(&chore, d(2025, 1, 1)).is_empty());
    }

    #[test]
    fn test_completed_by_is_authoritative_when_present() {
        let mut chore = fixed(&["A", "B"]);
        chore.completed = true;
        chore.completed_by = Some(vec![]);
        assert!(get_completed_by(&chore, None).is_empty());
    }

    #[test]
    fn test_completed_by_derived_from_assigned() {
        let mut chore = fixed(&["A", "B"]);
        assert!(get_completed_by(&chore, None).is_empty());
        chore.completed = true;
        assert_eq!(get_completed_by(&chore, None), names(&["A", "B"]));
        let override_list = names(&["Z"]);
        assert_eq!(get_completed_by(&chore, Some(&override_list)), names(&["Z"]));
    }

    #[test]
    fn test_multi_assignee_needs_everyone() {
        let mut chore = fixed(&["A", "B"]);
        chore.completed_by = Some(names(&["A"]));
        assert!(!is_chore_complete(&chore, None, d(2025, 1, 1)));

        chore.completed_by = Some(names(&["A", "B"]));
        assert!(is_chore_complete(&chore, None, d(2025, 1, 1)));
    }

    #[test]
    fn test_single_assignee_uses_completion_window() {
        let mut chore = fixed(&["A"]);
        chore.completed = true;
        chore.completed_through = Some(d(2025, 1, 2));
        assert!(is_chore_complete(&chore, None, d(2025, 1, 1)));
        assert!(!is_chore_complete(&chore, None, d(2025, 1, 2)));
    }

    #[test]
    fn test_toggle_fixed_single_assignee() {
        let chore = fixed(&["A"]);
        let done = toggle_completion(&chore, d(2025, 1, 1));
        assert!(done.completed);
        assert_eq!(done.completed_through, Some(d(2025, 1, 2)));
        assert!(is_chore_complete(&done, None, d(2025, 1, 1)));

        let undone = toggle_completion(&done, d(2025, 1, 1));
        assert!(!undone.completed);
        assert_eq!(undone.completed_by, None);
    }

    #[test]
    fn test_toggle_rotating_advances_and_uncompleting_keeps_cursor() {
        let chore = rotating(&["A", "B"]);
        let day = d(2025, 1, 1);

        let done = toggle_completion(&chore, day);
        assert_eq!(done.rotation_index, Some(1));
        assert_eq!(done.rotation_index_prev, Some(0));
        assert_eq!(get_assigned_members(&done, day), names(&["A"]));

        let undone = toggle_completion(&done, day);
        assert!(!undone.completed);
        assert_eq!(undone.rotation_index, Some(1));
        assert_eq!(get_assigned_members(&undone, day), names(&["B"]));
    }

    #[test]
    fn test_member_toggle_partial_then_full() {
        let chore = fixed(&["A", "B"]);
        let day = d(2025, 1, 1);

        let partial = toggle_member_completion(&chore, "A", day);
        assert!(!partial.completed);
        assert_eq!(partial.completed_by, Some(names(&["A"])));
        assert!(!is_chore_complete(&partial, None, day));

        let full = toggle_member_completion(&partial, "B", day);
        assert!(full.completed);
        assert!(is_chore_complete(&full, None, day));
        assert_eq!(full.last_completed_date, Some(day));

        let back = toggle_member_completion(&full, "A", day);
        assert!(!back.completed);
        assert_eq!(back.completed_by, Some(names(&["B"])));
    }

    #[test]
    fn test_member_toggle_on_single_assignee_toggles_chore() {
        let chore = fixed(&["A"]);
        let done = toggle_member_completion(&chore, "A", d(2025, 1, 1));
        assert!(done.completed);
    }
}
