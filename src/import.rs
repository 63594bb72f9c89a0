//! Tolerant mapping of imported chore records into [`Chore`].
//!
//! Import files come from several generations of the app and spell the same
//! concept in different ways (`rotation.members`, `assignment.order`,
//! `rotationMembers`, ...). All of those aliases are resolved here, once,
//! with a fixed precedence per concept:
//!
//! 1. structured nested fields (`rotation.*`, `assignment.*`, `recurrence.*`)
//! 2. flat legacy fields (`rotationMembers`, `frequency`, ...)
//! 3. defaults
//!
//! Nothing in this module fails: unusable values are dropped with a warning
//! and the concept falls through to the next candidate.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::entities::{
    first_present, AssignmentType, Chore, CycleType, Frequency, Recurrence, Rotation,
};
use crate::serde_utils::{
    lenient_block, lenient_bool, lenient_date, lenient_index, lenient_names, lenient_string,
    lenient_u32,
};

/// Subject given to imported records that don't name one.
pub const UNTITLED_SUBJECT: &str = "Untitled";

/// Options for [`map_imported_chore_with`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportConfig {
    /// Subject used when a record has none.
    pub untitled_subject: String,
    /// Start date applied to records without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_start_date: Option<NaiveDate>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            untitled_subject: UNTITLED_SUBJECT.to_string(),
            default_start_date: None,
        }
    }
}

/// `assignment: {...}` block of an imported record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAssignment {
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_names")]
    pub order: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_names")]
    pub members: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_names")]
    pub assigned: Option<Vec<String>>,
}

/// `rotation: {...}` block of an imported record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRotation {
    #[serde(default, deserialize_with = "lenient_names")]
    pub members: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_names")]
    pub group: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cycle_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub cycle_length: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub every_days: Option<u32>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
}

/// `recurrence: {...}` block of an imported record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecurrence {
    #[serde(default, deserialize_with = "lenient_string")]
    pub frequency: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub interval: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub day_of_week: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub day_of_month: Option<u32>,
}

/// A chore record as found in an import or restore file.
///
/// Every field is optional; presence matters to [`crate::merge::merge_chores`],
/// which only overwrites what a record actually carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawImportedChore {
    #[serde(default, deserialize_with = "lenient_string")]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub notes: Option<String>,

    // Assignment
    #[serde(default, deserialize_with = "lenient_string")]
    pub assignment_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_names")]
    pub assigned: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_block")]
    pub assignment: Option<RawAssignment>,
    #[serde(default, deserialize_with = "lenient_block")]
    pub rotation: Option<RawRotation>,
    #[serde(default, deserialize_with = "lenient_names")]
    pub rotation_group: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_names")]
    pub rotation_members: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cycle_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub cycle_length: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub every_days: Option<u32>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub rotation_start_date: Option<NaiveDate>,

    // Recurrence
    #[serde(default, deserialize_with = "lenient_block")]
    pub recurrence: Option<RawRecurrence>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub frequency: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub interval: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub day_of_week: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub day_of_month: Option<u32>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub next_due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub next_due: Option<NaiveDate>,

    #[serde(default, deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,

    // Progress
    #[serde(default, deserialize_with = "lenient_bool")]
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "lenient_names")]
    pub completed_by: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub last_completed_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub completed_through: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_index")]
    pub rotation_index: Option<i64>,
    #[serde(default, deserialize_with = "lenient_index")]
    pub rotation_position: Option<i64>,
    #[serde(default, deserialize_with = "lenient_index")]
    pub rotation_cursor: Option<i64>,
    #[serde(default, deserialize_with = "lenient_index")]
    pub rotation_index_prev: Option<i64>,
}

impl RawImportedChore {
    /// Decode a record from an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Whether the record carries any assignment-related field.
    pub fn has_assignment_fields(&self) -> bool {
        self.assignment_type.is_some()
            || self.assigned.is_some()
            || self.assignment.is_some()
            || self.rotation.is_some()
            || self.rotation_group.is_some()
            || self.rotation_members.is_some()
            || self.cycle_type.is_some()
            || self.cycle_length.is_some()
            || self.every_days.is_some()
            || self.rotation_start_date.is_some()
    }

    /// Whether the record carries any recurrence-related field.
    pub fn has_recurrence_fields(&self) -> bool {
        self.recurrence.is_some()
            || self.frequency.is_some()
            || self.interval.is_some()
            || self.day_of_week.is_some()
            || self.day_of_month.is_some()
            || self.due_date.is_some()
            || self.next_due_date.is_some()
            || self.next_due.is_some()
    }

    /// Subject with the placeholder applied, without the rest of the mapping.
    pub fn resolved_subject(&self, config: &ImportConfig) -> String {
        self.subject
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| config.untitled_subject.clone())
    }

    /// Rotation member list, in precedence order.
    fn resolved_members(&self) -> Option<Vec<String>> {
        let rotation = self.rotation.as_ref();
        let assignment = self.assignment.as_ref();
        first_present([
            rotation.and_then(|r| r.members.clone()),
            rotation.and_then(|r| r.group.clone()),
            assignment.and_then(|a| a.order.clone()),
            assignment.and_then(|a| a.members.clone()),
            self.rotation_members.clone(),
            self.rotation_group.clone(),
        ])
    }

    fn resolved_assignment_type(&self) -> AssignmentType {
        let declared = first_present([
            self.assignment.as_ref().and_then(|a| a.kind.as_deref()),
            self.assignment_type.as_deref(),
        ]);
        if let Some(declared) = declared {
            match AssignmentType::from_str(declared) {
                Ok(kind) => return kind,
                Err(e) => tracing::warn!(subject = ?self.subject, "{}", e),
            }
        }

        // Undeclared: any rotation member list means a rotating chore
        let has_rotation = self.rotation.is_some()
            || self.assignment.as_ref().is_some_and(|a| a.order.is_some())
            || self.rotation_members.is_some()
            || self.rotation_group.is_some();
        if has_rotation && self.resolved_members().is_some_and(|m| !m.is_empty()) {
            AssignmentType::Rotating
        } else {
            AssignmentType::Fixed
        }
    }

    fn resolved_rotation(&self, members: Vec<String>) -> Rotation {
        let rotation = self.rotation.as_ref();
        let cycle_type = first_present([
            rotation.and_then(|r| r.cycle_type.as_deref()),
            self.cycle_type.as_deref(),
        ])
        .and_then(|raw| match CycleType::from_str(raw) {
            Ok(cycle_type) => Some(cycle_type),
            Err(e) => {
                tracing::warn!(subject = ?self.subject, "{}", e);
                None
            }
        })
        .unwrap_or_default();

        Rotation {
            members,
            cycle_type,
            cycle_length: first_present([rotation.and_then(|r| r.cycle_length), self.cycle_length])
                .unwrap_or(1)
                .max(1),
            every_days: first_present([rotation.and_then(|r| r.every_days), self.every_days])
                .unwrap_or(1)
                .max(1),
            start_date: first_present([
                rotation.and_then(|r| r.start_date),
                self.rotation_start_date,
            ]),
        }
    }

    /// Assignment block: `(assignmentType, assigned, rotation)`.
    pub(crate) fn resolved_assignment(&self) -> (AssignmentType, Vec<String>, Option<Rotation>) {
        match self.resolved_assignment_type() {
            AssignmentType::Rotating => {
                let members = first_present([self.resolved_members(), self.assigned.clone()])
                    .unwrap_or_default();
                let assigned = members.first().cloned().into_iter().collect();
                let rotation = self.resolved_rotation(members);
                (AssignmentType::Rotating, assigned, Some(rotation))
            }
            AssignmentType::Fixed => {
                let assignment = self.assignment.as_ref();
                let assigned = first_present([
                    assignment.and_then(|a| a.assigned.clone()),
                    assignment.and_then(|a| a.members.clone()),
                    self.assigned.clone(),
                ])
                .unwrap_or_default();
                (AssignmentType::Fixed, assigned, None)
            }
        }
    }

    /// Recurrence block.
    pub(crate) fn resolved_recurrence(&self) -> Recurrence {
        let nested = self.recurrence.as_ref();

        let frequency = first_present([
            nested.and_then(|r| r.frequency.as_deref()),
            self.frequency.as_deref(),
        ])
        .and_then(|raw| match Frequency::from_str(raw) {
            Ok(frequency) => Some(frequency),
            Err(e) => {
                tracing::warn!(subject = ?self.subject, "{}, using daily", e);
                None
            }
        })
        .unwrap_or_default();

        let day_of_week = first_present([nested.and_then(|r| r.day_of_week), self.day_of_week])
            .filter(|dow| {
                let valid = *dow <= 6;
                if !valid {
                    tracing::warn!(
                        subject = ?self.subject,
                        day_of_week = dow,
                        "ignoring out-of-range dayOfWeek"
                    );
                }
                valid
            });
        let day_of_month = first_present([nested.and_then(|r| r.day_of_month), self.day_of_month])
            .filter(|dom| {
                let valid = (1..=31).contains(dom);
                if !valid {
                    tracing::warn!(
                        subject = ?self.subject,
                        day_of_month = dom,
                        "ignoring out-of-range dayOfMonth"
                    );
                }
                valid
            });

        Recurrence {
            frequency,
            interval: first_present([nested.and_then(|r| r.interval), self.interval])
                .unwrap_or(1)
                .max(1),
            day_of_week,
            day_of_month,
        }
    }
}

/// Map an imported record into a canonical chore with default options.
pub fn map_imported_chore(raw: &RawImportedChore) -> Chore {
    map_imported_chore_with(raw, &ImportConfig::default())
}

/// Map an imported record into a canonical chore.
///
/// For rotating chores `assigned` is always the first rotation member,
/// whatever the record says.
pub fn map_imported_chore_with(raw: &RawImportedChore, config: &ImportConfig) -> Chore {
    let (assignment_type, assigned, rotation) = raw.resolved_assignment();

    Chore {
        subject: raw.resolved_subject(config),
        description: raw.description.clone().unwrap_or_default(),
        notes: raw.notes.clone().unwrap_or_default(),
        assignment_type,
        assigned,
        rotation,
        recurrence: raw.resolved_recurrence(),
        start_date: first_present([raw.start_date, config.default_start_date]),
        due_date: raw.due_date,
        next_due_date: raw.next_due_date,
        next_due: raw.next_due,
        completed: raw.completed.unwrap_or(false),
        completed_by: raw.completed_by.clone(),
        last_completed_date: raw.last_completed_date,
        completed_through: raw.completed_through,
        rotation_index: raw.rotation_index,
        rotation_position: raw.rotation_position,
        rotation_cursor: raw.rotation_cursor,
        rotation_index_prev: raw.rotation_index_prev,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawImportedChore {
        serde_json::from_str(json).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_empty_record_gets_defaults() {
        let chore = map_imported_chore(&raw("{}"));
        assert_eq!(chore.subject, "Untitled");
        assert_eq!(chore.assignment_type, AssignmentType::Fixed);
        assert!(chore.assigned.is_empty());
        assert!(chore.rotation.is_none());
        assert_eq!(chore.recurrence, Recurrence::default());
        assert!(!chore.completed);
    }

    #[test]
    fn test_blank_subject_uses_configured_placeholder() {
        let config = ImportConfig {
            untitled_subject: "New chore".to_string(),
            default_start_date: Some(d(2025, 1, 1)),
        };
        let chore = map_imported_chore_with(&raw(r#"{"subject": "   "}"#), &config);
        assert_eq!(chore.subject, "New chore");
        assert_eq!(chore.start_date, Some(d(2025, 1, 1)));
    }

    #[test]
    fn test_nested_rotation_members_win_over_flat_aliases() {
        let chore = map_imported_chore(&raw(
            r#"{
                "subject": "Trash",
                "assignmentType": "rotating",
                "rotation": {"members": ["Alice", "Bob"]},
                "rotationMembers": ["Zed"],
                "assignment": {"order": ["Yan"]}
            }"#,
        ));
        assert_eq!(chore.rotation_members(), ["Alice", "Bob"]);
        assert_eq!(chore.assigned, vec!["Alice".to_string()]);
    }

    #[test]
    fn test_assignment_order_wins_over_flat_members() {
        let chore = map_imported_chore(&raw(
            r#"{"assignment": {"type": "rotating", "order": "Cara, Dan"},
                "rotationGroup": ["Zed"]}"#,
        ));
        assert!(chore.is_rotating());
        assert_eq!(chore.rotation_members(), ["Cara", "Dan"]);
    }

    #[test]
    fn test_rotation_group_aliases() {
        let nested = map_imported_chore(&raw(r#"{"rotation": {"group": ["A", "B"]}}"#));
        assert!(nested.is_rotating());
        assert_eq!(nested.rotation_members(), ["A", "B"]);

        let flat = map_imported_chore(&raw(r#"{"rotationGroup": "A,B,C"}"#));
        assert!(flat.is_rotating());
        assert_eq!(flat.rotation_members(), ["A", "B", "C"]);
    }

    #[test]
    fn test_rotating_assigned_is_never_user_supplied() {
        let chore = map_imported_chore(&raw(
            r#"{"assignmentType": "rotating", "assigned": ["Bob"],
                "rotationMembers": ["Alice", "Bob"]}"#,
        ));
        assert_eq!(chore.assigned, vec!["Alice".to_string()]);
    }

    #[test]
    fn test_rotating_falls_back_to_assigned_as_members() {
        let chore = map_imported_chore(&raw(
            r#"{"assignmentType": "rotating", "assigned": ["Bob", "Cara"]}"#,
        ));
        assert_eq!(chore.rotation_members(), ["Bob", "Cara"]);
        assert_eq!(chore.assigned, vec!["Bob".to_string()]);
    }

    #[test]
    fn test_rotation_settings_precedence_and_defaults() {
        let chore = map_imported_chore(&raw(
            r#"{
                "assignmentType": "rotating",
                "rotation": {"members": ["A", "B"], "cycleType": "everyXDays", "everyDays": "3"},
                "cycleType": "monthly",
                "cycleLength": 0,
                "rotationStartDate": "2025-02-01"
            }"#,
        ));
        let rotation = chore.rotation.unwrap();
        assert_eq!(rotation.cycle_type, CycleType::EveryXDays);
        assert_eq!(rotation.every_days, 3);
        assert_eq!(rotation.cycle_length, 1);
        assert_eq!(rotation.start_date, Some(d(2025, 2, 1)));
    }

    #[test]
    fn test_unknown_cycle_type_defaults_to_weekly() {
        let chore = map_imported_chore(&raw(
            r#"{"assignmentType": "rotating", "rotationMembers": ["A"], "cycleType": "lunar"}"#,
        ));
        assert_eq!(chore.rotation.unwrap().cycle_type, CycleType::Weekly);
    }

    #[test]
    fn test_fixed_assignees_from_assignment_block() {
        let chore = map_imported_chore(&raw(
            r#"{"assignment": {"type": "fixed", "assigned": ["A", "B"]}, "assigned": ["Z"]}"#,
        ));
        assert_eq!(chore.assignment_type, AssignmentType::Fixed);
        assert_eq!(chore.assigned, vec!["A".to_string(), "B".to_string()]);
        assert!(chore.rotation.is_none());
    }

    #[test]
    fn test_recurrence_nested_wins_over_flat() {
        let chore = map_imported_chore(&raw(
            r#"{
                "recurrence": {"frequency": "weekly", "dayOfWeek": 3},
                "frequency": "monthly",
                "interval": "2",
                "dayOfWeek": 5
            }"#,
        ));
        assert_eq!(chore.recurrence.frequency, Frequency::Weekly);
        assert_eq!(chore.recurrence.interval, 2);
        assert_eq!(chore.recurrence.day_of_week, Some(3));
    }

    #[test]
    fn test_bad_recurrence_values_fall_back() {
        let chore = map_imported_chore(&raw(
            r#"{"frequency": "hourly", "interval": 0, "dayOfWeek": 9, "dayOfMonth": 40}"#,
        ));
        assert_eq!(chore.recurrence, Recurrence::default());
    }

    #[test]
    fn test_progress_fields_carried_over() {
        let chore = map_imported_chore(&raw(
            r#"{
                "subject": "Vacuum",
                "completed": "true",
                "completedBy": ["Alice"],
                "lastCompletedDate": "2025-06-15",
                "completedThrough": "garbage",
                "rotationIndex": 2.0
            }"#,
        ));
        assert!(chore.completed);
        assert_eq!(chore.completed_by, Some(vec!["Alice".to_string()]));
        assert_eq!(chore.last_completed_date, Some(d(2025, 6, 15)));
        assert_eq!(chore.completed_through, None);
        assert_eq!(chore.rotation_index, Some(2));
    }

    #[test]
    fn test_assignment_order_alone_means_rotating() {
        let chore = map_imported_chore(&raw(
            r#"{"subject": "Trash", "assignment": {"order": ["Alice", "Bob"]}}"#,
        ));
        assert_eq!(chore.assignment_type, AssignmentType::Rotating);
        assert_eq!(chore.rotation_members(), ["Alice", "Bob"]);
        assert_eq!(chore.assigned, vec!["Alice".to_string()]);

        // Plain assignment members without a type stay fixed
        let fixed = map_imported_chore(&raw(r#"{"assignment": {"members": ["Alice", "Bob"]}}"#));
        assert_eq!(fixed.assignment_type, AssignmentType::Fixed);
        assert_eq!(fixed.assigned, vec!["Alice".to_string(), "Bob".to_string()]);
    }

    #[test]
    fn test_wrong_shaped_blocks_are_ignored() {
        let chore = map_imported_chore(&raw(
            r#"{"subject": "Dishes", "rotation": "weekly", "rotationMembers": ["A", "B"]}"#,
        ));
        assert!(chore.is_rotating());
        assert_eq!(chore.rotation_members(), ["A", "B"]);
        assert_eq!(chore.rotation.unwrap().cycle_type, CycleType::Weekly);

        let record = raw(r#"{"subject": "Trash", "recurrence": "weekly", "assignment": 4}"#);
        assert!(record.recurrence.is_none());
        assert!(record.assignment.is_none());
        assert!(!record.has_recurrence_fields());
        assert_eq!(map_imported_chore(&record).recurrence, Recurrence::default());
    }

    #[test]
    fn test_field_presence_detection() {
        let description_only = raw(r#"{"subject": "A", "description": "new"}"#);
        assert!(!description_only.has_assignment_fields());
        assert!(!description_only.has_recurrence_fields());

        let with_due = raw(r#"{"subject": "A", "dueDate": "2025-01-01"}"#);
        assert!(with_due.has_recurrence_fields());

        let with_cycle = raw(r#"{"subject": "A", "cycleLength": 2}"#);
        assert!(with_cycle.has_assignment_fields());
    }
}
