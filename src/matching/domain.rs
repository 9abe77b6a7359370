use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for job drives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DriveId(pub String);

/// Identifier wrapper for candidate (student) profiles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateId(pub String);

/// Identifier of an authenticated caller, issued by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalId(pub String);

macro_rules! display_id {
    ($($name:ident),+) => {
        $(
            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )+
    };
}

display_id!(DriveId, CandidateId, PrincipalId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalRole {
    Student,
    Officer,
}

impl PrincipalRole {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "student" => Some(Self::Student),
            "officer" => Some(Self::Officer),
            _ => None,
        }
    }
}

/// Already-authenticated caller identity. The engine trusts it as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub role: PrincipalRole,
}

impl Principal {
    pub fn officer(id: impl Into<String>) -> Self {
        Self {
            id: PrincipalId(id.into()),
            role: PrincipalRole::Officer,
        }
    }

    pub fn student(id: impl Into<String>) -> Self {
        Self {
            id: PrincipalId(id.into()),
            role: PrincipalRole::Student,
        }
    }

    pub fn is_officer(&self) -> bool {
        self.role == PrincipalRole::Officer
    }
}

/// Hard eligibility rules attached to a drive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityRules {
    pub minimum_cgpa: f32,
    /// Empty means every branch is allowed.
    #[serde(default)]
    pub allowed_branches: Vec<String>,
    #[serde(default)]
    pub graduation_year: Option<u16>,
    /// `None` leaves backlogs unchecked.
    #[serde(default)]
    pub max_backlogs: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveStatus {
    #[default]
    Upcoming,
    Active,
    Completed,
    Cancelled,
}

impl DriveStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DriveStatus::Upcoming => "upcoming",
            DriveStatus::Active => "active",
            DriveStatus::Completed => "completed",
            DriveStatus::Cancelled => "cancelled",
        }
    }

    /// Drives a student may browse.
    pub const fn is_open(self) -> bool {
        matches!(self, DriveStatus::Upcoming | DriveStatus::Active)
    }
}

/// Officer-provided payload used to create a drive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveDraft {
    pub company_name: String,
    pub role: String,
    pub job_description: String,
    pub ctc: String,
    pub location: String,
    pub drive_date: NaiveDate,
    pub application_deadline: NaiveDate,
    pub eligibility: EligibilityRules,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub rounds: Vec<String>,
}

/// A job posting with eligibility rules and its ranked candidate list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drive {
    pub id: DriveId,
    pub company_name: String,
    pub role: String,
    pub job_description: String,
    pub ctc: String,
    pub location: String,
    pub drive_date: NaiveDate,
    pub application_deadline: NaiveDate,
    pub eligibility: EligibilityRules,
    pub required_skills: Vec<String>,
    pub rounds: Vec<String>,
    pub status: DriveStatus,
    pub owner: PrincipalId,
    pub created_at: DateTime<Utc>,
    pub ranked: RankedList,
}

impl Drive {
    pub fn is_owned_by(&self, principal: &Principal) -> bool {
        principal.is_officer() && self.owner == principal.id
    }
}

/// Short project descriptor used for relevance scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlacementStatus {
    pub placed: bool,
    pub employer: Option<String>,
}

/// Candidate attributes read from the profile store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: CandidateId,
    pub name: String,
    pub cgpa: Option<f32>,
    pub branch: Option<String>,
    pub graduation_year: Option<u16>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub resume_text: String,
    /// Derived elsewhere from document ingestion, 0-100.
    #[serde(default)]
    pub resume_score: f32,
    #[serde(default)]
    pub backlogs: u8,
    #[serde(default)]
    pub placement: PlacementStatus,
}

/// Per-candidate status inside a drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    #[default]
    Eligible,
    Applied,
    Shortlisted,
    Selected,
    Rejected,
}

impl CandidateStatus {
    pub const fn label(self) -> &'static str {
        match self {
            CandidateStatus::Eligible => "eligible",
            CandidateStatus::Applied => "applied",
            CandidateStatus::Shortlisted => "shortlisted",
            CandidateStatus::Selected => "selected",
            CandidateStatus::Rejected => "rejected",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "eligible" => Some(Self::Eligible),
            "applied" => Some(Self::Applied),
            "shortlisted" => Some(Self::Shortlisted),
            "selected" => Some(Self::Selected),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// A (candidate, score, status) record attached to a drive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub candidate_id: CandidateId,
    pub match_score: u8,
    pub status: CandidateStatus,
}

/// Ranked candidates of a drive, keyed by candidate with the rank order kept alongside.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RankedList {
    order: Vec<CandidateId>,
    entries: HashMap<CandidateId, RankedEntry>,
}

impl RankedList {
    /// Build from entries already in rank order. Later duplicates of a candidate are dropped.
    pub fn from_ranked(ranked: Vec<RankedEntry>) -> Self {
        let mut list = Self::default();
        for entry in ranked {
            if list.entries.contains_key(&entry.candidate_id) {
                continue;
            }
            list.order.push(entry.candidate_id.clone());
            list.entries.insert(entry.candidate_id.clone(), entry);
        }
        list
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, candidate_id: &CandidateId) -> Option<&RankedEntry> {
        self.entries.get(candidate_id)
    }

    pub fn get_mut(&mut self, candidate_id: &CandidateId) -> Option<&mut RankedEntry> {
        self.entries.get_mut(candidate_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankedEntry> + '_ {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    pub fn to_vec(&self) -> Vec<RankedEntry> {
        self.iter().cloned().collect()
    }
}

impl Serialize for RankedList {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for RankedList {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<RankedEntry>::deserialize(deserializer)?;
        Ok(Self::from_ranked(entries))
    }
}

/// Audit record emitted for every manual status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditedTransition {
    pub candidate_id: CandidateId,
    pub drive_id: DriveId,
    pub from: CandidateStatus,
    pub to: CandidateStatus,
    pub justification: String,
    pub timestamp: DateTime<Utc>,
    pub actor: PrincipalId,
}
