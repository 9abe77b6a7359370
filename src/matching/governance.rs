use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{
    AuditedTransition, CandidateId, CandidateStatus, DriveId, PlacementStatus, Principal,
};
use super::repository::{AuditError, AuditLog, DriveRepository, ProfileStore, RepositoryError};
use super::validation::{validate_justification, ValidationError};

/// Officer request to move one candidate to a new status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub candidate_id: CandidateId,
    pub status: CandidateStatus,
    #[serde(default)]
    pub justification: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransitionOutcome {
    /// Requested status equals the current one; nothing was written.
    Unchanged { status: CandidateStatus },
    Applied(AuditedTransition),
}

#[derive(Debug, thiserror::Error)]
pub enum GovernanceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Audit(#[from] AuditError),
}

/// Gatekeeper for manual status changes on ranked entries.
///
/// Any status may follow any other, including moves back out of `selected` or `rejected`, so
/// that officers can correct mistakes. Every change needs a justification and is audited.
pub struct GovernanceStateMachine<P, A> {
    profiles: Arc<P>,
    audit: Arc<A>,
}

impl<P, A> GovernanceStateMachine<P, A>
where
    P: ProfileStore,
    A: AuditLog,
{
    pub fn new(profiles: Arc<P>, audit: Arc<A>) -> Self {
        Self { profiles, audit }
    }

    pub fn transition<D: DriveRepository>(
        &self,
        drives: &D,
        drive_id: &DriveId,
        request: &TransitionRequest,
        actor: &Principal,
    ) -> Result<TransitionOutcome, GovernanceError> {
        drives.update_entry(
            drive_id,
            &request.candidate_id,
            |drive, entry| -> Result<TransitionOutcome, GovernanceError> {
                if entry.status == request.status {
                    return Ok(TransitionOutcome::Unchanged {
                        status: entry.status,
                    });
                }

                let justification = validate_justification(request.justification.as_deref())?;

                let previous_placement = if request.status == CandidateStatus::Selected {
                    self.profiles
                        .record_placement(&entry.candidate_id, &drive.company_name)?
                } else {
                    None
                };
                if previous_placement.is_some() {
                    info!(
                        drive_id = %drive.id,
                        candidate_id = %entry.candidate_id,
                        employer = %drive.company_name,
                        "candidate marked placed"
                    );
                }

                let transition = AuditedTransition {
                    candidate_id: entry.candidate_id.clone(),
                    drive_id: drive.id.clone(),
                    from: entry.status,
                    to: request.status,
                    justification,
                    timestamp: Utc::now(),
                    actor: actor.id.clone(),
                };
                if let Err(err) = self.audit.record(transition.clone()) {
                    if let Some(previous) = previous_placement {
                        self.undo_placement(&entry.candidate_id, previous);
                    }
                    return Err(err.into());
                }

                entry.status = request.status;
                info!(
                    drive_id = %drive.id,
                    candidate_id = %entry.candidate_id,
                    from = transition.from.label(),
                    to = transition.to.label(),
                    actor = %actor.id,
                    "candidate status changed"
                );
                Ok(TransitionOutcome::Applied(transition))
            },
        )
    }

    fn undo_placement(&self, candidate_id: &CandidateId, previous: PlacementStatus) {
        if let Err(err) = self.profiles.restore_placement(candidate_id, previous) {
            warn!(
                candidate_id = %candidate_id,
                error = %err,
                "failed to roll back placement after audit failure"
            );
        }
    }
}
