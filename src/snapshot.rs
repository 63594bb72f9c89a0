//! Household save/restore files.
//!
//! The current format is an object:
//!
//! ```json
//! { "version": 1, "chores": [...], "postpones": [...], "progress": {...} }
//! ```
//!
//! Older exports were a bare array of chore records. Those are still
//! accepted and go through the import mapping, so every alias the importer
//! understands works there too.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::ChoreList;
use crate::import::{map_imported_chore, RawImportedChore};
use crate::postpone::PostponeEntry;
use crate::progress::ProgressMap;

/// Version written by [`HouseholdSnapshot::to_json`].
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("unsupported snapshot format: expected an object or an array of chores")]
    UnsupportedFormat,
    #[error(
        "unsupported snapshot version {0} (newest supported is {max})",
        max = SNAPSHOT_VERSION
    )]
    UnsupportedVersion(u32),
    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn current_version() -> u32 {
    SNAPSHOT_VERSION
}

/// Everything needed to restore a household.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdSnapshot {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub chores: ChoreList,
    #[serde(default)]
    pub postpones: Vec<PostponeEntry>,
    /// Progress stored apart from the definitions, keyed by subject.
    #[serde(default, skip_serializing_if = "ProgressMap::is_empty")]
    pub progress: ProgressMap,
}

impl Default for HouseholdSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            chores: Vec::new(),
            postpones: Vec::new(),
            progress: ProgressMap::new(),
        }
    }
}

impl HouseholdSnapshot {
    pub fn new(chores: ChoreList, postpones: Vec<PostponeEntry>) -> Self {
        Self {
            chores,
            postpones,
            ..Default::default()
        }
    }

    /// Pretty-printed JSON in the current format.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Decode a snapshot in either the current or the legacy array format.
pub fn parse_snapshot(json: &str) -> Result<HouseholdSnapshot, SnapshotError> {
    match serde_json::from_str::<Value>(json)? {
        Value::Object(map) => {
            let version = match map.get("version") {
                None => SNAPSHOT_VERSION,
                Some(v) => v
                    .as_u64()
                    .and_then(|v| u32::try_from(v).ok())
                    .ok_or(SnapshotError::UnsupportedFormat)?,
            };
            if version == 0 || version > SNAPSHOT_VERSION {
                return Err(SnapshotError::UnsupportedVersion(version));
            }
            Ok(serde_json::from_value(Value::Object(map))?)
        }
        Value::Array(records) => {
            let mut chores = ChoreList::with_capacity(records.len());
            for record in records {
                if !record.is_object() {
                    return Err(SnapshotError::UnsupportedFormat);
                }
                chores.push(map_imported_chore(&RawImportedChore::from_value(record)?));
            }
            tracing::debug!(chores = chores.len(), "read legacy array snapshot");
            Ok(HouseholdSnapshot::new(chores, Vec::new()))
        }
        _ => Err(SnapshotError::UnsupportedFormat),
    }
}
