//! Chorewheel Core Library
//!
//! This library provides the scheduling model and logic for household chores:
//! when a chore is due, whose turn it is, and whether it is done. It is
//! designed to be consumed by multiple frontends (mobile app, web, CLI)
//! without containing any storage or UI concerns. Every operation takes the
//! calendar day it is evaluated for and returns new values instead of
//! mutating its inputs.
//!
//! # Modules
//!
//! - `dates`: Calendar-day helpers and `YYYY-MM-DD` date keys
//! - `entities`: Core domain types (Chore, Recurrence, Rotation)
//! - `recurrence`: Due-date resolution
//! - `rotation`: Rotation cursor, turn calculation and advancement
//! - `completion`: Completion state, per-member completion and toggles
//! - `import`: Tolerant mapping of imported records
//! - `merge`: Applying imported definitions to a live list
//! - `progress`: Separating definitions from runtime progress
//! - `postpone`: Moving single due instances to another day
//! - `schedule`: Day, week and month agendas
//! - `lint`: Validation and diagnostics
//! - `snapshot`: Save/restore file format
//! - `serde_utils`: Lenient deserializers for hand-edited data

pub mod dates;
pub use dates::{date_key, parse_date_key, today};

pub mod entities;
pub use entities::{
    AssignmentType, Chore, ChoreList, CycleType, Frequency, Recurrence, Rotation,
};

pub mod recurrence;
pub use recurrence::{get_due_dates_in_range, get_next_due_date, is_due_on_date};

pub mod rotation;
pub use rotation::{advance_rotation, get_rotation_index};

pub mod completion;
pub use completion::{
    get_assigned_members, get_completed_by, is_chore_complete, toggle_completion,
    toggle_member_completion,
};

pub mod import;
pub use import::{map_imported_chore, ImportConfig, RawImportedChore};

pub mod merge;
pub use merge::merge_chores;

pub mod progress;
pub use progress::{apply_progress, extract_progress, ChoreProgress, ProgressMap};

pub mod postpone;
pub use postpone::{auto_postpone_undone, PostponeEntry};

pub mod schedule;
pub use schedule::{chores_for_date, DayAgenda, ScheduledChore};

pub mod lint;
pub use lint::{lint_chores, LintDiagnostic, LintResults, LintSeverity, ValidationError};

pub mod snapshot;
pub use snapshot::{parse_snapshot, HouseholdSnapshot, SnapshotError};

pub mod serde_utils;
