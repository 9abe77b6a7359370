use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ScoringConfig;

use super::domain::{
    CandidateId, Drive, DriveDraft, DriveId, DriveStatus, Principal, PrincipalRole, RankedList,
};
use super::governance::{
    GovernanceError, GovernanceStateMachine, TransitionOutcome, TransitionRequest,
};
use super::insights::{placement_stats, readiness, PlacementStats, ReadinessIndex};
use super::ranking::{RankingError, RankingOrchestrator, RankingOutcome};
use super::repository::{AuditError, AuditLog, DriveRepository, ProfileStore, RepositoryError};
use super::scoring::{
    pair_cosine, weighted, CosineMatch, MatchInput, RemoteScorerAdapter, ScoringService,
    WeightedScore,
};
use super::validation::{validate_draft, ValidationError};

/// Ad hoc "why this score" query for one candidate against free job text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairScoreRequest {
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub candidate_skills: Vec<String>,
    #[serde(default)]
    pub resume_text: String,
}

impl PairScoreRequest {
    pub fn score(&self) -> CosineMatch {
        pair_cosine(&MatchInput {
            job_description: &self.job_description,
            required_skills: &self.required_skills,
            candidate_skills: &self.candidate_skills,
            resume_text: &self.resume_text,
        })
    }
}

/// Service composing drive storage, the profile store, ranking, and governance.
pub struct PlacementMatchingService<D, P, A> {
    drives: Arc<D>,
    profiles: Arc<P>,
    governance: GovernanceStateMachine<P, A>,
    ranking: RankingOrchestrator,
}

static DRIVE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_drive_id() -> DriveId {
    let id = DRIVE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    DriveId(format!("drive-{id:06}"))
}

impl<D, P, A> PlacementMatchingService<D, P, A>
where
    D: DriveRepository + 'static,
    P: ProfileStore + 'static,
    A: AuditLog + 'static,
{
    pub fn new(
        drives: Arc<D>,
        profiles: Arc<P>,
        audit: Arc<A>,
        scoring: Arc<dyn ScoringService>,
        config: &ScoringConfig,
    ) -> Self {
        let remote = RemoteScorerAdapter::new(scoring, config.timeout);
        let ranking = RankingOrchestrator::new(remote, config.rerank_policy);
        Self::with_orchestrator(drives, profiles, audit, ranking)
    }

    pub fn with_orchestrator(
        drives: Arc<D>,
        profiles: Arc<P>,
        audit: Arc<A>,
        ranking: RankingOrchestrator,
    ) -> Self {
        let governance = GovernanceStateMachine::new(profiles.clone(), audit);
        Self {
            drives,
            profiles,
            governance,
            ranking,
        }
    }

    /// Create a drive owned by the calling officer.
    pub fn create_drive(
        &self,
        principal: &Principal,
        draft: DriveDraft,
    ) -> Result<Drive, MatchingServiceError> {
        require_officer(principal)?;
        validate_draft(&draft)?;

        let drive = Drive {
            id: next_drive_id(),
            company_name: draft.company_name.trim().to_string(),
            role: draft.role.trim().to_string(),
            job_description: draft.job_description,
            ctc: draft.ctc,
            location: draft.location,
            drive_date: draft.drive_date,
            application_deadline: draft.application_deadline,
            eligibility: draft.eligibility,
            required_skills: draft
                .required_skills
                .into_iter()
                .map(|skill| skill.trim().to_string())
                .filter(|skill| !skill.is_empty())
                .collect(),
            rounds: draft.rounds,
            status: DriveStatus::Upcoming,
            owner: principal.id.clone(),
            created_at: Utc::now(),
            ranked: RankedList::default(),
        };

        let stored = self.drives.insert(drive)?;
        info!(drive_id = %stored.id, company = %stored.company_name, "drive created");
        Ok(stored)
    }

    /// Officers see the drives they own; students see upcoming and active drives.
    pub fn list_drives(&self, principal: &Principal) -> Result<Vec<Drive>, MatchingServiceError> {
        let mut drives: Vec<Drive> = self
            .drives
            .list()?
            .into_iter()
            .filter(|drive| match principal.role {
                PrincipalRole::Officer => drive.owner == principal.id,
                PrincipalRole::Student => drive.status.is_open(),
            })
            .collect();
        drives.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(drives)
    }

    pub fn get_drive(&self, drive_id: &DriveId) -> Result<Drive, MatchingServiceError> {
        let drive = self
            .drives
            .fetch(drive_id)?
            .ok_or_else(|| RepositoryError::DriveNotFound(drive_id.clone()))?;
        Ok(drive)
    }

    pub fn delete_drive(
        &self,
        principal: &Principal,
        drive_id: &DriveId,
    ) -> Result<(), MatchingServiceError> {
        self.owned_drive(principal, drive_id)?;
        self.drives.delete(drive_id)?;
        info!(drive_id = %drive_id, "drive deleted");
        Ok(())
    }

    /// Filter, score, and persist the shortlist for a drive.
    pub async fn rank_drive(
        &self,
        principal: &Principal,
        drive_id: &DriveId,
    ) -> Result<RankingOutcome, MatchingServiceError> {
        let drive = self.owned_drive(principal, drive_id)?;
        let outcome = self
            .ranking
            .run(self.drives.as_ref(), self.profiles.as_ref(), &drive)
            .await?;
        Ok(outcome)
    }

    /// Apply an audited status change to a ranked candidate.
    pub fn update_status(
        &self,
        principal: &Principal,
        drive_id: &DriveId,
        request: &TransitionRequest,
    ) -> Result<TransitionOutcome, MatchingServiceError> {
        self.owned_drive(principal, drive_id)?;
        let outcome = self
            .governance
            .transition(self.drives.as_ref(), drive_id, request, principal)?;
        Ok(outcome)
    }

    /// Weighted four-factor breakdown of one candidate against a drive.
    pub fn explain(
        &self,
        drive_id: &DriveId,
        candidate_id: &CandidateId,
    ) -> Result<WeightedScore, MatchingServiceError> {
        let drive = self.get_drive(drive_id)?;
        let candidate = self
            .profiles
            .fetch(candidate_id)?
            .ok_or_else(|| RepositoryError::CandidateNotFound(candidate_id.clone()))?;
        Ok(weighted::score(&drive, &candidate))
    }

    pub fn readiness(
        &self,
        candidate_id: &CandidateId,
    ) -> Result<ReadinessIndex, MatchingServiceError> {
        let candidate = self
            .profiles
            .fetch(candidate_id)?
            .ok_or_else(|| RepositoryError::CandidateNotFound(candidate_id.clone()))?;
        Ok(readiness(&candidate))
    }

    pub fn placement_stats(
        &self,
        principal: &Principal,
    ) -> Result<PlacementStats, MatchingServiceError> {
        require_officer(principal)?;
        let students = self.profiles.students()?;
        Ok(placement_stats(&students))
    }

    fn owned_drive(
        &self,
        principal: &Principal,
        drive_id: &DriveId,
    ) -> Result<Drive, MatchingServiceError> {
        require_officer(principal)?;
        let drive = self.get_drive(drive_id)?;
        if !drive.is_owned_by(principal) {
            return Err(MatchingServiceError::Forbidden);
        }
        Ok(drive)
    }
}

fn require_officer(principal: &Principal) -> Result<(), MatchingServiceError> {
    if principal.is_officer() {
        Ok(())
    } else {
        Err(MatchingServiceError::Forbidden)
    }
}

/// Error raised by the matching service.
#[derive(Debug, thiserror::Error)]
pub enum MatchingServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    NotFound(RepositoryError),
    #[error("only the officer who owns this drive may perform this action")]
    Forbidden,
    #[error(transparent)]
    Persistence(RepositoryError),
    #[error(transparent)]
    Audit(#[from] AuditError),
}

impl From<RepositoryError> for MatchingServiceError {
    fn from(err: RepositoryError) -> Self {
        if err.is_not_found() {
            Self::NotFound(err)
        } else {
            Self::Persistence(err)
        }
    }
}

impl From<RankingError> for MatchingServiceError {
    fn from(err: RankingError) -> Self {
        match err {
            RankingError::Filtering(inner) | RankingError::Persistence(inner) => inner.into(),
        }
    }
}

impl From<GovernanceError> for MatchingServiceError {
    fn from(err: GovernanceError) -> Self {
        match err {
            GovernanceError::Validation(inner) => inner.into(),
            GovernanceError::Repository(inner) => inner.into(),
            GovernanceError::Audit(inner) => inner.into(),
        }
    }
}
