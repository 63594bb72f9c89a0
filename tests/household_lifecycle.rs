//! End-to-end lifecycle of a small household.
//!
//! Import a chore file, look at the day, tick chores off, let the day roll
//! over, then persist and restore everything:
//! 1. Imported records map onto canonical chores whatever aliases they use.
//! 2. Completing a rotating chore passes the turn on but keeps showing the
//!    completer for the rest of the period.
//! 3. Definition updates and save/restore never lose progress.

use chorewheel_core::progress::definition_only;
use chorewheel_core::{
    apply_progress, auto_postpone_undone, chores_for_date, extract_progress,
    get_assigned_members, is_chore_complete, lint_chores, merge_chores, parse_snapshot,
    toggle_completion, toggle_member_completion, Chore, HouseholdSnapshot, PostponeEntry,
    RawImportedChore,
};
use chrono::NaiveDate;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

const IMPORT: &str = r#"[
    {
        "subject": "Dishes",
        "rotation": {"members": ["Alice", "Bob", "Cara"], "cycleType": "daily"},
        "frequency": "daily",
        "startDate": "2025-01-06"
    },
    {
        "subject": "Trash",
        "assigned": "Dan",
        "frequency": "weekly",
        "dayOfWeek": 3,
        "startDate": "2025-01-01"
    },
    {
        "subject": "Laundry",
        "assignment": {"type": "fixed", "members": ["Alice", "Bob"]},
        "frequency": "daily",
        "startDate": "2025-01-06"
    }
]"#;

fn imported_household() -> Vec<Chore> {
    let raw: Vec<RawImportedChore> = serde_json::from_str(IMPORT).unwrap();
    merge_chores(&[], &raw)
}

fn chore<'a>(chores: &'a [Chore], subject: &str) -> &'a Chore {
    chores.iter().find(|c| c.subject == subject).unwrap()
}

fn update(chores: &mut [Chore], subject: &str, f: impl FnOnce(&Chore) -> Chore) {
    let slot = chores.iter_mut().find(|c| c.subject == subject).unwrap();
    *slot = f(&*slot);
}

#[test]
fn test_import_maps_aliases() {
    let chores = imported_household();
    assert_eq!(chores.len(), 3);

    let dishes = chore(&chores, "Dishes");
    assert!(dishes.is_rotating());
    assert_eq!(dishes.assigned, names(&["Alice"]));

    assert_eq!(chore(&chores, "Trash").assigned, names(&["Dan"]));
    assert_eq!(chore(&chores, "Laundry").assigned, names(&["Alice", "Bob"]));
    assert!(lint_chores(&chores).is_clean());
}

#[test]
fn test_day_view_before_any_completion() {
    let chores = imported_household();
    let wednesday = chores_for_date(&chores, &[], d(2025, 1, 8));

    let subjects: Vec<&str> = wednesday.iter().map(|c| c.subject.as_str()).collect();
    assert_eq!(subjects, vec!["Dishes", "Trash", "Laundry"]);
    // Two days after the rotation start the daily turn is on the third member
    assert_eq!(wednesday[0].assigned, names(&["Cara"]));
    assert!(wednesday.iter().all(|c| !c.complete));
}

#[test]
fn test_full_day_lifecycle() {
    let wednesday = d(2025, 1, 8);
    let thursday = d(2025, 1, 9);
    let mut chores = imported_household();

    // Cara does the dishes: the turn passes to Alice, Cara stays shown today
    update(&mut chores, "Dishes", |c| toggle_completion(c, wednesday));
    let dishes = chore(&chores, "Dishes");
    assert!(is_chore_complete(dishes, None, wednesday));
    assert_eq!(get_assigned_members(dishes, wednesday), names(&["Cara"]));
    assert_eq!(dishes.assigned, names(&["Alice"]));
    assert_eq!(get_assigned_members(dishes, thursday), names(&["Alice"]));
    assert!(!is_chore_complete(dishes, None, thursday));

    // Laundry needs both assignees
    update(&mut chores, "Laundry", |c| toggle_member_completion(c, "Alice", wednesday));
    assert!(!is_chore_complete(chore(&chores, "Laundry"), None, wednesday));
    update(&mut chores, "Laundry", |c| toggle_member_completion(c, "Bob", wednesday));
    let laundry = chore(&chores, "Laundry");
    assert!(is_chore_complete(laundry, None, wednesday));
    assert_eq!(laundry.last_completed_date, Some(wednesday));

    // Nobody took the trash out: it rolls over to Thursday
    let postpones = auto_postpone_undone(&chores, &[], wednesday);
    assert_eq!(
        postpones,
        vec![PostponeEntry::new("Trash", wednesday, thursday)]
    );
    let thursday_view = chores_for_date(&chores, &postpones, thursday);
    let trash = thursday_view.iter().find(|c| c.subject == "Trash").unwrap();
    assert_eq!(trash.postponed_from, Some(wednesday));
    assert_eq!(trash.assigned, names(&["Dan"]));
}

#[test]
fn test_definition_update_and_restore_keep_progress() {
    let wednesday = d(2025, 1, 8);
    let mut chores = imported_household();
    update(&mut chores, "Dishes", |c| toggle_completion(c, wednesday));
    let progress = extract_progress(&chores);

    // A re-import touching only the description leaves progress alone
    let edit: Vec<RawImportedChore> =
        serde_json::from_str(r#"[{"subject": "Dishes", "description": "After dinner"}]"#).unwrap();
    let merged = merge_chores(&chores, &edit);
    let dishes = chore(&merged, "Dishes");
    assert_eq!(dishes.description, "After dinner");
    assert_eq!(dishes.rotation_index, Some(0));
    assert_eq!(dishes.rotation_index_prev, Some(2));
    assert!(dishes.completed);

    // Definitions and progress stored apart come back together unchanged
    let definitions: Vec<Chore> = chores.iter().map(definition_only).collect();
    assert_eq!(apply_progress(&definitions, &progress), chores);

    // And so does a full snapshot
    let postpones = auto_postpone_undone(&chores, &[], wednesday);
    let mut snapshot = HouseholdSnapshot::new(chores.clone(), postpones);
    snapshot.progress = progress;
    let restored = parse_snapshot(&snapshot.to_json().unwrap()).unwrap();
    assert_eq!(restored, snapshot);
    assert_eq!(
        get_assigned_members(chore(&restored.chores, "Dishes"), wednesday),
        names(&["Cara"])
    );
}
