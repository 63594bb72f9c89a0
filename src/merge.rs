//! Applying imported chore definitions to a live chore list.
//!
//! The merge is deliberately one-sided: imported records update definitions
//! (only the fields they actually carry) and add new chores, while runtime
//! progress on existing chores is never touched and chores missing from the
//! import are kept as they are.

use crate::entities::{Chore, ChoreList};
use crate::import::{map_imported_chore_with, ImportConfig, RawImportedChore};
use crate::rotation::cached_assignee;

/// Merge imported definitions into `current`, matching by subject.
pub fn merge_chores(current: &[Chore], imported: &[RawImportedChore]) -> ChoreList {
    merge_chores_with(current, imported, &ImportConfig::default())
}

/// [`merge_chores`] with explicit import options.
pub fn merge_chores_with(
    current: &[Chore],
    imported: &[RawImportedChore],
    config: &ImportConfig,
) -> ChoreList {
    let mut merged: ChoreList = current.to_vec();
    let mut updated = 0usize;
    let mut added = 0usize;

    for raw in imported {
        let subject = raw.resolved_subject(config);
        if let Some(existing) = merged.iter_mut().find(|c| c.subject == subject) {
            *existing = apply_definition(existing, raw);
            updated += 1;
        } else {
            merged.push(map_imported_chore_with(raw, config));
            added += 1;
        }
    }

    tracing::debug!(
        existing = current.len(),
        imported = imported.len(),
        updated,
        added,
        "merged imported chores"
    );
    merged
}

/// Overwrite the definition fields `raw` carries, keeping all progress.
///
/// Assignment and recurrence are replaced as whole blocks as soon as any of
/// their fields is present.
fn apply_definition(current: &Chore, raw: &RawImportedChore) -> Chore {
    let mut next = current.clone();

    if let Some(description) = &raw.description {
        next.description = description.clone();
    }
    if let Some(notes) = &raw.notes {
        next.notes = notes.clone();
    }
    if raw.start_date.is_some() {
        next.start_date = raw.start_date;
    }

    if raw.has_assignment_fields() {
        let (assignment_type, assigned, rotation) = raw.resolved_assignment();
        next.assignment_type = assignment_type;
        next.rotation = rotation;
        next.assigned = assigned;
        if next.is_rotating() {
            // Existing cursor still applies to the new member list
            next.assigned = cached_assignee(&next);
        }
    }

    if raw.has_recurrence_fields() {
        next.recurrence = raw.resolved_recurrence();
        next.due_date = raw.due_date;
        next.next_due_date = raw.next_due_date;
        next.next_due = raw.next_due;
    }

    next
}
