//! Candidate-to-drive matching: eligibility filtering, match scoring, ranking, and the
//! audited status workflow officers use on the resulting shortlist.
//!
//! Storage, the candidate pool, and the audit sink are trait seams so the HTTP service and
//! tests can plug in their own implementations.

pub mod domain;
pub mod eligibility;
pub mod governance;
pub mod insights;
pub mod ranking;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod text;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    AuditedTransition, CandidateId, CandidateProfile, CandidateStatus, Drive, DriveDraft,
    DriveId, DriveStatus, EligibilityRules, PlacementStatus, Principal, PrincipalId,
    PrincipalRole, Project, RankedEntry, RankedList,
};
pub use governance::{GovernanceError, GovernanceStateMachine, TransitionOutcome, TransitionRequest};
pub use insights::{BranchCount, PlacementStats, ReadinessIndex};
pub use ranking::{RankingError, RankingOrchestrator, RankingOutcome, RankingPhase, RerankPolicy};
pub use repository::{
    AuditError, AuditLog, DriveRepository, DriveView, ProfileStore, RankedEntryView,
    RepositoryError,
};
pub use router::matching_router;
pub use scoring::{
    CosineMatch, DisabledScoringService, HttpScoringClient, RemoteScorerAdapter,
    RemoteScoringError, ScoringService, ScoringStrategy, WeightedScore,
};
pub use service::{MatchingServiceError, PairScoreRequest, PlacementMatchingService};
pub use validation::ValidationError;
