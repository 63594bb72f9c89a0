//! Separating chore definitions from runtime progress.
//!
//! A chore carries two kinds of data:
//! - its *definition* (subject, assignment, recurrence) which changes through
//!   imports and edits
//! - its *progress* (completion state, rotation cursor) which changes every
//!   time someone ticks a chore off
//!
//! Persisting them separately lets a definition update land without
//! clobbering in-flight completion state. [`extract_progress`] and
//! [`apply_progress`] are inverse operations over a chore list.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entities::{Chore, ChoreList};
use crate::serde_utils::{lenient_date, lenient_flag, lenient_index, lenient_names};

/// Runtime progress of a single chore.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoreProgress {
    #[serde(default, deserialize_with = "lenient_flag")]
    pub completed: bool,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_names"
    )]
    pub completed_by: Option<Vec<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_date"
    )]
    pub last_completed_date: Option<NaiveDate>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_date"
    )]
    pub completed_through: Option<NaiveDate>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_index"
    )]
    pub rotation_index: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_index"
    )]
    pub rotation_index_prev: Option<i64>,
}

/// Progress of every chore, keyed by subject.
pub type ProgressMap = BTreeMap<String, ChoreProgress>;

impl ChoreProgress {
    /// Progress as currently recorded on `chore`. Legacy cursor aliases are
    /// folded into `rotation_index`.
    pub fn of(chore: &Chore) -> Self {
        Self {
            completed: chore.completed,
            completed_by: chore.completed_by.clone(),
            last_completed_date: chore.last_completed_date,
            completed_through: chore.completed_through,
            rotation_index: chore.stored_rotation_cursor(),
            rotation_index_prev: chore.rotation_index_prev,
        }
    }

    /// Copy this progress onto `chore`, replacing whatever it had.
    pub fn apply_to(&self, chore: &Chore) -> Chore {
        Chore {
            completed: self.completed,
            completed_by: self.completed_by.clone(),
            last_completed_date: self.last_completed_date,
            completed_through: self.completed_through,
            rotation_index: self.rotation_index,
            rotation_position: None,
            rotation_cursor: None,
            rotation_index_prev: self.rotation_index_prev,
            ..chore.clone()
        }
    }
}

/// Split a chore into its definition (progress reset) and its progress.
pub fn split_chore(chore: &Chore) -> (Chore, ChoreProgress) {
    (definition_only(chore), ChoreProgress::of(chore))
}

/// The chore with every progress field reset.
pub fn definition_only(chore: &Chore) -> Chore {
    chore.reset_progress()
}

/// Collect the progress of every chore.
pub fn extract_progress(chores: &[Chore]) -> ProgressMap {
    chores
        .iter()
        .map(|chore| (chore.subject.clone(), ChoreProgress::of(chore)))
        .collect()
}

/// Re-attach stored progress to chores by subject.
///
/// Chores without an entry in `progress` are returned unchanged; entries for
/// subjects that no longer exist are ignored.
pub fn apply_progress(chores: &[Chore], progress: &ProgressMap) -> ChoreList {
    chores
        .iter()
        .map(|chore| match progress.get(&chore.subject) {
            Some(entry) => entry.apply_to(chore),
            None => chore.clone(),
        })
        .collect()
}
