use chrono::NaiveDate;

use super::domain::{CandidateStatus, DriveDraft};

pub const MIN_JUSTIFICATION_CHARS: usize = 10;

const MAX_CGPA: f32 = 10.0;

/// Caller errors, surfaced verbatim and never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("minimum CGPA must be between 0 and 10 (found {0})")]
    CgpaOutOfRange(f32),
    #[error("application deadline {deadline} falls after drive date {drive_date}")]
    DeadlineAfterDrive {
        deadline: NaiveDate,
        drive_date: NaiveDate,
    },
    #[error("unknown candidate status '{0}'")]
    UnknownStatus(String),
    #[error("justification must be at least {min} characters (found {found})")]
    JustificationTooShort { min: usize, found: usize },
}

pub fn validate_draft(draft: &DriveDraft) -> Result<(), ValidationError> {
    let required = [
        ("company_name", &draft.company_name),
        ("role", &draft.role),
        ("job_description", &draft.job_description),
        ("ctc", &draft.ctc),
        ("location", &draft.location),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField { field });
        }
    }

    let minimum = draft.eligibility.minimum_cgpa;
    if !minimum.is_finite() || !(0.0..=MAX_CGPA).contains(&minimum) {
        return Err(ValidationError::CgpaOutOfRange(minimum));
    }

    if draft.application_deadline > draft.drive_date {
        return Err(ValidationError::DeadlineAfterDrive {
            deadline: draft.application_deadline,
            drive_date: draft.drive_date,
        });
    }

    Ok(())
}

/// Trimmed justification text, or an error when it is too short to audit.
pub fn validate_justification(raw: Option<&str>) -> Result<String, ValidationError> {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    let found = trimmed.chars().count();
    if found < MIN_JUSTIFICATION_CHARS {
        return Err(ValidationError::JustificationTooShort {
            min: MIN_JUSTIFICATION_CHARS,
            found,
        });
    }
    Ok(trimmed.to_string())
}

pub fn parse_status(raw: &str) -> Result<CandidateStatus, ValidationError> {
    CandidateStatus::parse(raw).ok_or_else(|| ValidationError::UnknownStatus(raw.to_string()))
}
