use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::domain::{
    CandidateId, CandidateProfile, CandidateStatus, Drive, DriveId, RankedEntry, RankedList,
};
use super::eligibility::filter_eligible;
use super::repository::{DriveRepository, ProfileStore, RepositoryError};
use super::scoring::{RemoteScorerAdapter, ScoringStrategy};

/// What happens to existing governance statuses when a drive is ranked again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RerankPolicy {
    /// Every entry restarts as `eligible`.
    #[default]
    Reset,
    /// Candidates still eligible keep their previous status.
    Preserve,
}

impl RerankPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "reset" => Some(Self::Reset),
            "preserve" => Some(Self::Preserve),
            _ => None,
        }
    }
}

/// Steps of a successful ranking run, recorded in the order they were entered.
/// A run that fails ends with a [`RankingError`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingPhase {
    Idle,
    Filtering,
    RemoteScoring,
    FallbackScoring,
    Sorting,
    Persisted,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingOutcome {
    pub drive_id: DriveId,
    /// `None` when nobody passed the eligibility filter.
    pub strategy: Option<ScoringStrategy>,
    pub phases: Vec<RankingPhase>,
    pub entries: Vec<RankedEntry>,
}

#[derive(Debug, thiserror::Error)]
pub enum RankingError {
    #[error("candidate pool unavailable: {0}")]
    Filtering(#[source] RepositoryError),
    #[error("failed to persist ranked list: {0}")]
    Persistence(#[source] RepositoryError),
}

/// Filter, score, sort, and persist a drive's shortlist.
#[derive(Clone)]
pub struct RankingOrchestrator {
    remote: RemoteScorerAdapter,
    policy: RerankPolicy,
}

impl RankingOrchestrator {
    pub fn new(remote: RemoteScorerAdapter, policy: RerankPolicy) -> Self {
        Self { remote, policy }
    }

    pub fn policy(&self) -> RerankPolicy {
        self.policy
    }

    /// Rank `drive` against the student pool. `drive` is the caller's snapshot; no lock on the
    /// stored drive is held while the remote scorer is awaited.
    pub async fn run<D, P>(
        &self,
        drives: &D,
        profiles: &P,
        drive: &Drive,
    ) -> Result<RankingOutcome, RankingError>
    where
        D: DriveRepository,
        P: ProfileStore,
    {
        let mut phases = vec![RankingPhase::Idle, RankingPhase::Filtering];

        let pool = match profiles.students() {
            Ok(pool) => pool,
            Err(err) => {
                warn!(
                    drive_id = %drive.id,
                    error = %err,
                    "ranking failed while loading candidate pool"
                );
                return Err(RankingError::Filtering(err));
            }
        };
        let survivors = filter_eligible(&pool, &drive.eligibility);
        debug!(
            drive_id = %drive.id,
            pool = pool.len(),
            survivors = survivors.len(),
            "eligibility filter applied"
        );

        if survivors.is_empty() {
            persist(drives, &drive.id, RankedList::default(), &mut phases)?;
            info!(drive_id = %drive.id, "no eligible candidates; ranked list cleared");
            return Ok(RankingOutcome {
                drive_id: drive.id.clone(),
                strategy: None,
                phases,
                entries: Vec::new(),
            });
        }

        phases.push(RankingPhase::RemoteScoring);
        let (strategy, scores) = match self.remote.score(drive, &survivors).await {
            Ok(scores) => (ScoringStrategy::Remote, scores),
            Err(err) => {
                warn!(
                    drive_id = %drive.id,
                    candidates = survivors.len(),
                    error = %err,
                    "remote scoring unavailable; using local fallback"
                );
                phases.push(RankingPhase::FallbackScoring);
                (ScoringStrategy::LocalCosineV2, fallback_scores(drive, &survivors))
            }
        };

        phases.push(RankingPhase::Sorting);
        let entries = self.rank(drive, &survivors, &scores);

        persist(
            drives,
            &drive.id,
            RankedList::from_ranked(entries.clone()),
            &mut phases,
        )?;

        info!(
            drive_id = %drive.id,
            ranked = entries.len(),
            strategy = strategy.label(),
            "ranking persisted"
        );

        Ok(RankingOutcome {
            drive_id: drive.id.clone(),
            strategy: Some(strategy),
            phases,
            entries,
        })
    }

    fn rank(
        &self,
        drive: &Drive,
        survivors: &[CandidateProfile],
        scores: &HashMap<CandidateId, u8>,
    ) -> Vec<RankedEntry> {
        let mut entries: Vec<RankedEntry> = survivors
            .iter()
            .map(|candidate| RankedEntry {
                candidate_id: candidate.id.clone(),
                match_score: scores.get(&candidate.id).copied().unwrap_or_default(),
                status: self.carried_status(drive, &candidate.id),
            })
            .collect();

        // Stable: equal scores keep eligibility-filter order.
        entries.sort_by(|left, right| right.match_score.cmp(&left.match_score));
        entries
    }

    fn carried_status(&self, drive: &Drive, candidate_id: &CandidateId) -> CandidateStatus {
        match self.policy {
            RerankPolicy::Reset => CandidateStatus::Eligible,
            RerankPolicy::Preserve => drive
                .ranked
                .get(candidate_id)
                .map(|entry| entry.status)
                .unwrap_or_default(),
        }
    }
}

/// Bulk fallback for a whole batch. Never mixed with remote scores.
pub fn fallback_scores(
    drive: &Drive,
    candidates: &[CandidateProfile],
) -> HashMap<CandidateId, u8> {
    candidates
        .iter()
        .map(|candidate| {
            let score = ScoringStrategy::LocalCosineV2
                .score_locally(drive, candidate)
                .unwrap_or_default();
            (candidate.id.clone(), score)
        })
        .collect()
}

fn persist<D: DriveRepository>(
    drives: &D,
    drive_id: &DriveId,
    ranked: RankedList,
    phases: &mut Vec<RankingPhase>,
) -> Result<(), RankingError> {
    match drives.replace_ranked(drive_id, ranked) {
        Ok(()) => {
            phases.push(RankingPhase::Persisted);
            Ok(())
        }
        Err(err) => {
            warn!(drive_id = %drive_id, error = %err, "ranked list write failed");
            Err(RankingError::Persistence(err))
        }
    }
}
