//! Match-score strategies.
//!
//! Each call site picks a strategy explicitly:
//! - [`ScoringStrategy::Weighted`] for the per-candidate explainable breakdown,
//! - [`ScoringStrategy::LocalCosineV1`] for ad hoc single-pair queries,
//! - [`ScoringStrategy::Remote`] as the primary bulk ranking backend,
//! - [`ScoringStrategy::LocalCosineV2`] as the bulk fallback when the remote call fails.
//!
//! The formulas differ on purpose and are not interchangeable.

pub mod local;
pub mod remote;
pub mod weighted;

pub use local::{bulk_jaccard, pair_cosine, CosineMatch, MatchInput};
pub use remote::{
    DisabledScoringService, HttpScoringClient, RemoteCandidate, RemoteScore, RemoteScorerAdapter,
    RemoteScoringError, RemoteScoringRequest, RemoteScoringResponse, ScoringService,
    UNSCORED_DEFAULT,
};
pub use weighted::{ScoreComponent, ScoreFactor, WeightedScore};

use serde::{Deserialize, Serialize};

use super::domain::{CandidateProfile, Drive};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    Weighted,
    LocalCosineV1,
    LocalCosineV2,
    Remote,
}

impl ScoringStrategy {
    pub const fn label(self) -> &'static str {
        match self {
            ScoringStrategy::Weighted => "weighted",
            ScoringStrategy::LocalCosineV1 => "local_cosine_v1",
            ScoringStrategy::LocalCosineV2 => "local_cosine_v2",
            ScoringStrategy::Remote => "remote",
        }
    }

    pub const fn is_local(self) -> bool {
        !matches!(self, ScoringStrategy::Remote)
    }

    /// Score one candidate in-process. Returns `None` for [`ScoringStrategy::Remote`].
    pub fn score_locally(self, drive: &Drive, candidate: &CandidateProfile) -> Option<u8> {
        let input = MatchInput {
            job_description: &drive.job_description,
            required_skills: &drive.required_skills,
            candidate_skills: &candidate.skills,
            resume_text: &candidate.resume_text,
        };

        match self {
            ScoringStrategy::Weighted => Some(weighted::score(drive, candidate).total),
            ScoringStrategy::LocalCosineV1 => Some(pair_cosine(&input).match_score),
            ScoringStrategy::LocalCosineV2 => Some(bulk_jaccard(&input)),
            ScoringStrategy::Remote => None,
        }
    }
}
