use serde::Serialize;

use super::domain::{
    AuditedTransition, CandidateId, CandidateProfile, Drive, DriveId, PlacementStatus,
    RankedEntry, RankedList,
};

/// Drive storage. Implementations must make `replace_ranked` and `update_entry` atomic.
pub trait DriveRepository: Send + Sync {
    fn insert(&self, drive: Drive) -> Result<Drive, RepositoryError>;
    fn fetch(&self, id: &DriveId) -> Result<Option<Drive>, RepositoryError>;
    fn list(&self) -> Result<Vec<Drive>, RepositoryError>;
    fn delete(&self, id: &DriveId) -> Result<(), RepositoryError>;

    /// Swap the whole ranked list in one write; no partial overwrite is ever visible.
    fn replace_ranked(&self, id: &DriveId, ranked: RankedList) -> Result<(), RepositoryError>;

    /// Read, validate, and write one entry without interleaving with other writers of the
    /// same drive. The entry is committed only when `apply` succeeds.
    fn update_entry<T, E, F>(
        &self,
        drive_id: &DriveId,
        candidate_id: &CandidateId,
        apply: F,
    ) -> Result<T, E>
    where
        F: FnOnce(&Drive, &mut RankedEntry) -> Result<T, E>,
        E: From<RepositoryError>;
}

/// Read access to candidate profiles plus the placement field, the only one the engine writes.
pub trait ProfileStore: Send + Sync {
    /// Every profile with the student role.
    fn students(&self) -> Result<Vec<CandidateProfile>, RepositoryError>;
    fn fetch(&self, id: &CandidateId) -> Result<Option<CandidateProfile>, RepositoryError>;
    /// Mark the candidate placed at `employer`. Returns the previous placement, or `None`
    /// when the candidate was already placed there and nothing was written.
    fn record_placement(
        &self,
        id: &CandidateId,
        employer: &str,
    ) -> Result<Option<PlacementStatus>, RepositoryError>;
    /// Put back a placement returned by `record_placement`.
    fn restore_placement(
        &self,
        id: &CandidateId,
        previous: PlacementStatus,
    ) -> Result<(), RepositoryError>;
}

/// Append-only sink for governance transitions.
pub trait AuditLog: Send + Sync {
    fn record(&self, transition: AuditedTransition) -> Result<(), AuditError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("drive {0} not found")]
    DriveNotFound(DriveId),
    #[error("candidate {0} is not ranked in this drive")]
    EntryNotFound(CandidateId),
    #[error("candidate {0} not found")]
    CandidateNotFound(CandidateId),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RepositoryError::DriveNotFound(_)
                | RepositoryError::EntryNotFound(_)
                | RepositoryError::CandidateNotFound(_)
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit sink unavailable: {0}")]
    Transport(String),
}

/// Officer-facing projection of a drive and its shortlist.
#[derive(Debug, Clone, Serialize)]
pub struct DriveView {
    pub drive_id: DriveId,
    pub company_name: String,
    pub role: String,
    pub status: &'static str,
    pub required_skills: Vec<String>,
    pub ranked: Vec<RankedEntryView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedEntryView {
    pub rank: usize,
    pub candidate_id: CandidateId,
    pub match_score: u8,
    pub status: &'static str,
}

impl Drive {
    pub fn view(&self) -> DriveView {
        DriveView {
            drive_id: self.id.clone(),
            company_name: self.company_name.clone(),
            role: self.role.clone(),
            status: self.status.label(),
            required_skills: self.required_skills.clone(),
            ranked: self
                .ranked
                .iter()
                .enumerate()
                .map(|(index, entry)| RankedEntryView {
                    rank: index + 1,
                    candidate_id: entry.candidate_id.clone(),
                    match_score: entry.match_score,
                    status: entry.status.label(),
                })
                .collect(),
        }
    }
}
