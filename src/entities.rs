use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::serde_utils::{
    lenient_block, lenient_block_or_default, lenient_count, lenient_date, lenient_flag,
    lenient_index, lenient_name_list, lenient_names, lenient_token, lenient_u32,
};

pub type ChoreList = Vec<Chore>;

/// Return the first candidate that holds a value.
///
/// Several concepts have historical aliases stored side by side (for example
/// `dueDate`, `nextDueDate` and `nextDue`). Callers list them in priority
/// order and this picks the winner, so every fallback chain reads the same.
pub fn first_present<T>(candidates: impl IntoIterator<Item = Option<T>>) -> Option<T> {
    candidates.into_iter().flatten().next()
}

/// How a chore's assignees are determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentType {
    /// `assigned` holds the full, fixed assignee set.
    #[default]
    Fixed,
    /// Members take turns; `assigned` caches whoever is currently up.
    Rotating,
}

/// Recurrence frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Once,
    /// Any frequency this version doesn't know about. Always due.
    Other,
}

/// How often the rotation cursor moves when it is derived from the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleType {
    Daily,
    #[default]
    Weekly,
    Monthly,
    #[serde(rename = "every-x-days")]
    EveryXDays,
}

impl FromStr for AssignmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "fixed" | "static" | "single" | "shared" => Ok(AssignmentType::Fixed),
            "rotating" | "rotation" | "rotate" => Ok(AssignmentType::Rotating),
            other => Err(format!("unknown assignment type: {}", other)),
        }
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "daily" | "day" => Ok(Frequency::Daily),
            "weekly" | "week" => Ok(Frequency::Weekly),
            "monthly" | "month" => Ok(Frequency::Monthly),
            "once" | "oneoff" | "onetime" | "none" => Ok(Frequency::Once),
            "other" => Ok(Frequency::Other),
            other => Err(format!("unknown frequency: {}", other)),
        }
    }
}

impl FromStr for CycleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "daily" | "day" => Ok(CycleType::Daily),
            "weekly" | "week" => Ok(CycleType::Weekly),
            "monthly" | "month" => Ok(CycleType::Monthly),
            "everyxdays" | "everydays" | "custom" => Ok(CycleType::EveryXDays),
            other => Err(format!("unknown cycle type: {}", other)),
        }
    }
}

// Stored values go through the loose parsers too, so a hand-edited or
// newer file degrades to a default instead of failing the whole record.

impl<'de> Deserialize<'de> for AssignmentType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient_token(deserializer, AssignmentType::Fixed)
    }
}

impl<'de> Deserialize<'de> for Frequency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient_token(deserializer, Frequency::Other)
    }
}

impl<'de> Deserialize<'de> for CycleType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient_token(deserializer, CycleType::Weekly)
    }
}

/// Lowercase and strip separators so `every-x-days`, `everyXDays` and
/// `every_x_days` compare equal.
fn normalize_token(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Once => "once",
            Frequency::Other => "other",
        };
        write!(f, "{}", name)
    }
}

fn default_one() -> u32 {
    1
}

/// Which calendar days a chore is due on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default = "default_one", deserialize_with = "lenient_count")]
    pub interval: u32,
    /// 0-6, Sunday = 0. Weekly rules only.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_u32"
    )]
    pub day_of_week: Option<u32>,
    /// 1-31. Monthly rules only.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_u32"
    )]
    pub day_of_month: Option<u32>,
}

impl Default for Recurrence {
    fn default() -> Self {
        Self {
            frequency: Frequency::Daily,
            interval: 1,
            day_of_week: None,
            day_of_month: None,
        }
    }
}

impl Recurrence {
    pub fn daily(interval: u32) -> Self {
        Self {
            frequency: Frequency::Daily,
            interval,
            ..Default::default()
        }
    }

    pub fn weekly(interval: u32, day_of_week: u32) -> Self {
        Self {
            frequency: Frequency::Weekly,
            interval,
            day_of_week: Some(day_of_week),
            day_of_month: None,
        }
    }

    pub fn monthly(interval: u32, day_of_month: u32) -> Self {
        Self {
            frequency: Frequency::Monthly,
            interval,
            day_of_week: None,
            day_of_month: Some(day_of_month),
        }
    }

    pub fn once() -> Self {
        Self {
            frequency: Frequency::Once,
            ..Default::default()
        }
    }
}

/// Ordered members taking turns on a chore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rotation {
    #[serde(default, deserialize_with = "lenient_name_list")]
    pub members: Vec<String>,
    #[serde(default)]
    pub cycle_type: CycleType,
    #[serde(default = "default_one", deserialize_with = "lenient_count")]
    pub cycle_length: u32,
    #[serde(default = "default_one", deserialize_with = "lenient_count")]
    pub every_days: u32,
    /// Base date for calendar-derived turns. Falls back to the chore's start date.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_date"
    )]
    pub start_date: Option<NaiveDate>,
}

impl Default for Rotation {
    fn default() -> Self {
        Self {
            members: Vec::new(),
            cycle_type: CycleType::Weekly,
            cycle_length: 1,
            every_days: 1,
            start_date: None,
        }
    }
}

impl Rotation {
    pub fn new<S: Into<String>>(
        members: impl IntoIterator<Item = S>,
        cycle_type: CycleType,
    ) -> Self {
        Self {
            members: members.into_iter().map(Into::into).collect(),
            cycle_type,
            ..Default::default()
        }
    }
}

/// A chore definition plus its embedded runtime progress.
///
/// `subject` is the identity: there is no separate id, and two chores with
/// the same subject are the same chore.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chore {
    pub subject: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub assignment_type: AssignmentType,
    /// Fixed chores: every assignee. Rotating chores: a one-element cache of
    /// the current cursor holder, see [`crate::rotation::refresh_assigned`].
    #[serde(default, deserialize_with = "lenient_name_list")]
    pub assigned: Vec<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_block"
    )]
    pub rotation: Option<Rotation>,
    #[serde(default, deserialize_with = "lenient_block_or_default")]
    pub recurrence: Recurrence,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_date"
    )]
    pub start_date: Option<NaiveDate>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_date"
    )]
    pub due_date: Option<NaiveDate>,
    /// Legacy alias of `due_date`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_date"
    )]
    pub next_due_date: Option<NaiveDate>,
    /// Legacy alias of `due_date`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_date"
    )]
    pub next_due: Option<NaiveDate>,

    // Progress
    #[serde(default, deserialize_with = "lenient_flag")]
    pub completed: bool,
    /// Authoritative once present, even when empty.
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
    /// The completion stays in effect on days strictly before this one.
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
    /// Legacy alias of `rotation_index`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_index"
    )]
    pub rotation_position: Option<i64>,
    /// Legacy alias of `rotation_index`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_index"
    )]
    pub rotation_cursor: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_index"
    )]
    pub rotation_index_prev: Option<i64>,
}

impl Chore {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Default::default()
        }
    }

    pub fn is_rotating(&self) -> bool {
        self.assignment_type == AssignmentType::Rotating
    }

    /// Rotation members in turn order (empty when there is no rotation).
    pub fn rotation_members(&self) -> &[String] {
        self.rotation
            .as_ref()
            .map(|r| r.members.as_slice())
            .unwrap_or(&[])
    }

    /// The stored rotation cursor: `rotationIndex`, then `rotationPosition`,
    /// then `rotationCursor`.
    pub fn stored_rotation_cursor(&self) -> Option<i64> {
        first_present([
            self.rotation_index,
            self.rotation_position,
            self.rotation_cursor,
        ])
    }

    /// The single due date of a `once` chore: `dueDate`, then `nextDueDate`,
    /// then `nextDue`, then `startDate`.
    pub fn once_due_date(&self) -> Option<NaiveDate> {
        first_present([
            self.due_date,
            self.next_due_date,
            self.next_due,
            self.start_date,
        ])
    }

    /// Drop every progress field, keeping only the definition.
    pub fn reset_progress(&self) -> Chore {
        Chore {
            completed: false,
            completed_by: None,
            last_completed_date: None,
            completed_through: None,
            rotation_index: None,
            rotation_position: None,
            rotation_cursor: None,
            rotation_index_prev: None,
            ..self.clone()
        }
    }
}

impl fmt::Display for Chore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", if self.completed { "x" } else { " " }, self.subject)?;
        if !self.assigned.is_empty() {
            write!(f, " @{}", self.assigned.join(","))?;
        }
        write!(f, " R:{}", self.recurrence.frequency)?;
        if self.recurrence.interval > 1 {
            write!(f, "/{}", self.recurrence.interval)?;
        }
        Ok(())
    }
}

/// Find a chore by subject.
pub fn find_chore<'a>(chores: &'a [Chore], subject: &str) -> Option<&'a Chore> {
    chores.iter().find(|c| c.subject == subject)
}
