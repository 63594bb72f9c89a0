use crate::entities::{Chore, Frequency};
use crate::rotation::cached_assignee;
use std::collections::HashSet;

/// Minimum rotation size worth calling a rotation.
pub const MIN_ROTATION_MEMBERS: usize = 2;

/// A chore definition the app should refuse to save.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("subject required")]
    MissingSubject,
    #[error("duplicate subject: {0}")]
    DuplicateSubject(String),
    #[error(
        "rotation requires at least {min} members ({subject} has {members})",
        min = MIN_ROTATION_MEMBERS
    )]
    RotationTooSmall { subject: String, members: usize },
    #[error("interval must be at least 1 ({0})")]
    InvalidInterval(String),
    #[error("day of week {day} out of range 0-6 ({subject})")]
    InvalidDayOfWeek { subject: String, day: u32 },
    #[error("day of month {day} out of range 1-31 ({subject})")]
    InvalidDayOfMonth { subject: String, day: u32 },
    #[error("one-off chore has no due date ({0})")]
    MissingDueDate(String),
}

impl ValidationError {
    /// Stable diagnostic code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingSubject => "E001",
            ValidationError::RotationTooSmall { .. } => "E002",
            ValidationError::MissingDueDate(_) => "E003",
            ValidationError::InvalidDayOfWeek { .. } => "E004",
            ValidationError::InvalidDayOfMonth { .. } => "E005",
            ValidationError::InvalidInterval(_) => "E006",
            ValidationError::DuplicateSubject(_) => "E007",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LintSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LintDiagnostic {
    pub code: String,
    pub severity: LintSeverity,
    pub message: String,
    /// Subject of the chore the diagnostic is about.
    pub subject: String,
}

impl LintDiagnostic {
    pub fn new(code: &str, severity: LintSeverity, message: String, subject: &str) -> Self {
        Self {
            code: code.to_string(),
            severity,
            message,
            subject: subject.to_string(),
        }
    }

    pub fn error(code: &str, message: String, subject: &str) -> Self {
        Self::new(code, LintSeverity::Error, message, subject)
    }

    pub fn warning(code: &str, message: String, subject: &str) -> Self {
        Self::new(code, LintSeverity::Warning, message, subject)
    }

    pub fn info(code: &str, message: String, subject: &str) -> Self {
        Self::new(code, LintSeverity::Info, message, subject)
    }
}

impl From<(&ValidationError, &str)> for LintDiagnostic {
    fn from((error, subject): (&ValidationError, &str)) -> Self {
        LintDiagnostic::error(error.code(), format!("{} ({}).", error, error.code()), subject)
    }
}

/// Structured lint results grouped by severity
#[derive(Debug, Clone, Default)]
pub struct LintResults {
    pub errors: Vec<LintDiagnostic>,
    pub warnings: Vec<LintDiagnostic>,
    pub info: Vec<LintDiagnostic>,
}

impl LintResults {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty() && self.info.is_empty()
    }
}

/// IntoIterator for ergonomic `for diag in results` usage
impl IntoIterator for LintResults {
    type Item = LintDiagnostic;
    type IntoIter = std::vec::IntoIter<LintDiagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        let mut all = Vec::with_capacity(self.errors.len() + self.warnings.len() + self.info.len());
        all.extend(self.errors);
        all.extend(self.warnings);
        all.extend(self.info);
        all.into_iter()
    }
}

// ============================================================================
// Check Registries
// ============================================================================

/// Chore-level check that blocks saving
pub type ChoreValidation = fn(&Chore) -> Result<(), ValidationError>;

/// Chore-level advisory check
pub type ChoreCheck = fn(&Chore) -> Option<LintDiagnostic>;

/// Error checks (E001-E006). E007 is list-level.
pub const CHORE_VALIDATIONS: &[ChoreValidation] = &[
    check_subject,       // E001
    check_rotation_size, // E002
    check_once_due_date, // E003
    check_day_of_week,   // E004
    check_day_of_month,  // E005
    check_interval,      // E006
];

/// Warning checks (W001-W003)
pub const CHORE_WARNING_CHECKS: &[ChoreCheck] = &[
    check_month_end_day,              // W001
    check_fixed_without_assignees,    // W002
    check_completion_window_inverted, // W003
];

/// Info checks (I001-I002)
pub const CHORE_INFO_CHECKS: &[ChoreCheck] = &[
    check_legacy_cursor,       // I001
    check_stale_assignee_cache, // I002
];

// ============================================================================
// Error checks
// ============================================================================

fn check_subject(chore: &Chore) -> Result<(), ValidationError> {
    if chore.subject.trim().is_empty() {
        return Err(ValidationError::MissingSubject);
    }
    Ok(())
}

fn check_rotation_size(chore: &Chore) -> Result<(), ValidationError> {
    let members = chore.rotation_members().len();
    if chore.is_rotating() && members < MIN_ROTATION_MEMBERS {
        return Err(ValidationError::RotationTooSmall {
            subject: chore.subject.clone(),
            members,
        });
    }
    Ok(())
}

fn check_once_due_date(chore: &Chore) -> Result<(), ValidationError> {
    if chore.recurrence.frequency == Frequency::Once && chore.once_due_date().is_none() {
        return Err(ValidationError::MissingDueDate(chore.subject.clone()));
    }
    Ok(())
}

fn check_day_of_week(chore: &Chore) -> Result<(), ValidationError> {
    match chore.recurrence.day_of_week {
        Some(day) if day > 6 => Err(ValidationError::InvalidDayOfWeek {
            subject: chore.subject.clone(),
            day,
        }),
        _ => Ok(()),
    }
}

fn check_day_of_month(chore: &Chore) -> Result<(), ValidationError> {
    match chore.recurrence.day_of_month {
        Some(day) if !(1..=31).contains(&day) => Err(ValidationError::InvalidDayOfMonth {
            subject: chore.subject.clone(),
            day,
        }),
        _ => Ok(()),
    }
}

fn check_interval(chore: &Chore) -> Result<(), ValidationError> {
    if chore.recurrence.interval == 0 {
        return Err(ValidationError::InvalidInterval(chore.subject.clone()));
    }
    Ok(())
}

// ============================================================================
// Advisory checks
// ============================================================================

/// Monthly rule on a day some months lack (W001)
fn check_month_end_day(chore: &Chore) -> Option<LintDiagnostic> {
    match (chore.recurrence.frequency, chore.recurrence.day_of_month) {
        (Frequency::Monthly, Some(day)) if (29..=31).contains(&day) => Some(LintDiagnostic::warning(
            "W001",
            format!(
                "Monthly on day {} is skipped in months without that day (W001).",
                day
            ),
            &chore.subject,
        )),
        _ => None,
    }
}

/// Fixed chore nobody is assigned to (W002)
fn check_fixed_without_assignees(chore: &Chore) -> Option<LintDiagnostic> {
    if !chore.is_rotating() && chore.assigned.is_empty() {
        Some(LintDiagnostic::warning(
            "W002",
            "Chore has no assignees (W002).".to_string(),
            &chore.subject,
        ))
    } else {
        None
    }
}

/// Completion expiry before the completion itself (W003)
fn check_completion_window_inverted(chore: &Chore) -> Option<LintDiagnostic> {
    match (chore.last_completed_date, chore.completed_through) {
        (Some(last), Some(through)) if through <= last => Some(LintDiagnostic::warning(
            "W003",
            format!(
                "completedThrough {} is not after lastCompletedDate {} (W003).",
                through, last
            ),
            &chore.subject,
        )),
        _ => None,
    }
}

/// Cursor stored under a legacy name (I001)
fn check_legacy_cursor(chore: &Chore) -> Option<LintDiagnostic> {
    if chore.rotation_index.is_none()
        && (chore.rotation_position.is_some() || chore.rotation_cursor.is_some())
    {
        Some(LintDiagnostic::info(
            "I001",
            "Rotation cursor stored under a legacy field name (I001).".to_string(),
            &chore.subject,
        ))
    } else {
        None
    }
}

/// `assigned` cache disagrees with the stored cursor (I002)
fn check_stale_assignee_cache(chore: &Chore) -> Option<LintDiagnostic> {
    if !chore.is_rotating() || chore.stored_rotation_cursor().is_none() {
        return None;
    }
    let expected = cached_assignee(chore);
    if expected != chore.assigned {
        Some(LintDiagnostic::info(
            "I002",
            format!(
                "Cached assignee {:?} differs from rotation cursor holder {:?} (I002).",
                chore.assigned, expected
            ),
            &chore.subject,
        ))
    } else {
        None
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// First blocking problem with `chore`, if any.
pub fn validate_chore(chore: &Chore) -> Result<(), ValidationError> {
    CHORE_VALIDATIONS.iter().try_for_each(|check| check(chore))
}

/// First blocking problem in a chore list, including duplicate subjects.
pub fn validate_chores(chores: &[Chore]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for chore in chores {
        validate_chore(chore)?;
        if !seen.insert(chore.subject.as_str()) {
            return Err(ValidationError::DuplicateSubject(chore.subject.clone()));
        }
    }
    Ok(())
}

/// Lint a chore list and return structured results grouped by severity
pub fn lint_chores(chores: &[Chore]) -> LintResults {
    let mut results = LintResults::default();
    let mut seen = HashSet::new();

    for chore in chores {
        results.errors.extend(
            CHORE_VALIDATIONS
                .iter()
                .filter_map(|check| check(chore).err())
                .map(|e| LintDiagnostic::from((&e, chore.subject.as_str()))),
        );
        results
            .warnings
            .extend(CHORE_WARNING_CHECKS.iter().filter_map(|check| check(chore)));
        results
            .info
            .extend(CHORE_INFO_CHECKS.iter().filter_map(|check| check(chore)));

        if !seen.insert(chore.subject.as_str()) {
            let error = ValidationError::DuplicateSubject(chore.subject.clone());
            results
                .errors
                .push(LintDiagnostic::from((&error, chore.subject.as_str())));
        }
    }

    results
}
