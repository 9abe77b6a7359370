use std::sync::Arc;

use super::common::*;

use crate::matching::domain::{CandidateId, CandidateStatus, DriveId, PlacementStatus, RankedList};
use crate::matching::governance::{
    GovernanceError, GovernanceStateMachine, TransitionOutcome, TransitionRequest,
};
use crate::matching::repository::RepositoryError;
use crate::matching::validation::ValidationError;

const REASON: &str = "Cleared final technical interview";

fn ranked_drive() -> MemoryDrives {
    let mut drive = drive("drive-gov");
    drive.ranked = RankedList::from_ranked(vec![entry("b", 80), entry("c", 60)]);
    MemoryDrives::with(drive)
}

fn request(candidate: &str, status: CandidateStatus, justification: Option<&str>) -> TransitionRequest {
    TransitionRequest {
        candidate_id: CandidateId(candidate.to_string()),
        status,
        justification: justification.map(str::to_string),
    }
}

fn drive_id() -> DriveId {
    DriveId("drive-gov".to_string())
}

fn stored_status(drives: &MemoryDrives, candidate: &str) -> CandidateStatus {
    drives
        .snapshot("drive-gov")
        .ranked
        .get(&CandidateId(candidate.to_string()))
        .expect("entry")
        .status
}

#[test]
fn short_justification_is_rejected() {
    let drives = ranked_drive();
    let audit = Arc::new(MemoryAudit::default());
    let machine = GovernanceStateMachine::new(Arc::new(MemoryProfiles::with(pool())), audit.clone());

    let error = machine
        .transition(
            &drives,
            &drive_id(),
            &request("b", CandidateStatus::Shortlisted, Some("ok")),
            &officer(),
        )
        .expect_err("too short");

    assert!(matches!(
        error,
        GovernanceError::Validation(ValidationError::JustificationTooShort { min: 10, found: 2 })
    ));
    assert_eq!(stored_status(&drives, "b"), CandidateStatus::Eligible);
    assert!(audit.records().is_empty());
}

#[test]
fn missing_or_blank_justification_is_rejected() {
    let drives = ranked_drive();
    let machine = GovernanceStateMachine::new(
        Arc::new(MemoryProfiles::with(pool())),
        Arc::new(MemoryAudit::default()),
    );

    for justification in [None, Some("            ")] {
        let error = machine
            .transition(
                &drives,
                &drive_id(),
                &request("b", CandidateStatus::Rejected, justification),
                &officer(),
            )
            .expect_err("no justification");
        assert!(matches!(error, GovernanceError::Validation(_)));
    }
}

#[test]
fn valid_transition_is_applied_and_audited() {
    let drives = ranked_drive();
    let audit = Arc::new(MemoryAudit::default());
    let machine = GovernanceStateMachine::new(Arc::new(MemoryProfiles::with(pool())), audit.clone());

    let outcome = machine
        .transition(
            &drives,
            &drive_id(),
            &request("c", CandidateStatus::Shortlisted, Some("  Strong systems design round  ")),
            &officer(),
        )
        .expect("transition applied");

    let TransitionOutcome::Applied(transition) = outcome else {
        panic!("expected an applied transition");
    };
    assert_eq!(transition.from, CandidateStatus::Eligible);
    assert_eq!(transition.to, CandidateStatus::Shortlisted);
    assert_eq!(transition.justification, "Strong systems design round");
    assert_eq!(transition.actor.0, OFFICER_ID);
    assert_eq!(stored_status(&drives, "c"), CandidateStatus::Shortlisted);
    assert_eq!(audit.records(), vec![transition]);
}

#[test]
fn selecting_twice_places_the_candidate_once() {
    let drives = ranked_drive();
    let profiles = Arc::new(MemoryProfiles::with(pool()));
    let audit = Arc::new(MemoryAudit::default());
    let machine = GovernanceStateMachine::new(profiles.clone(), audit.clone());
    let select = request("b", CandidateStatus::Selected, Some(REASON));

    let first = machine
        .transition(&drives, &drive_id(), &select, &officer())
        .expect("first selection");
    let second = machine
        .transition(&drives, &drive_id(), &select, &officer())
        .expect("second selection");

    assert!(matches!(first, TransitionOutcome::Applied(_)));
    assert_eq!(
        second,
        TransitionOutcome::Unchanged {
            status: CandidateStatus::Selected
        }
    );
    let placed = profiles.profile("b");
    assert!(placed.placement.placed);
    assert_eq!(placed.placement.employer.as_deref(), Some("Acme Systems"));
    assert_eq!(profiles.placement_writes(), 1);
    assert_eq!(audit.records().len(), 1);
}

#[test]
fn reselecting_after_a_correction_does_not_rewrite_placement() {
    let drives = ranked_drive();
    let profiles = Arc::new(MemoryProfiles::with(pool()));
    let machine = GovernanceStateMachine::new(profiles.clone(), Arc::new(MemoryAudit::default()));

    for status in [
        CandidateStatus::Selected,
        CandidateStatus::Shortlisted,
        CandidateStatus::Selected,
    ] {
        machine
            .transition(&drives, &drive_id(), &request("b", status, Some(REASON)), &officer())
            .expect("transition applied");
    }

    assert_eq!(profiles.placement_writes(), 1);
    assert_eq!(stored_status(&drives, "b"), CandidateStatus::Selected);
}

#[test]
fn unranked_candidate_is_not_found() {
    let drives = ranked_drive();
    let machine = GovernanceStateMachine::new(
        Arc::new(MemoryProfiles::with(pool())),
        Arc::new(MemoryAudit::default()),
    );

    let error = machine
        .transition(
            &drives,
            &drive_id(),
            &request("a", CandidateStatus::Applied, Some(REASON)),
            &officer(),
        )
        .expect_err("not ranked");

    assert!(matches!(
        error,
        GovernanceError::Repository(RepositoryError::EntryNotFound(_))
    ));
}

#[test]
fn audit_failure_leaves_status_untouched() {
    let drives = ranked_drive();
    let machine = GovernanceStateMachine::new(Arc::new(MemoryProfiles::with(pool())), Arc::new(FailingAudit));

    let error = machine
        .transition(
            &drives,
            &drive_id(),
            &request("c", CandidateStatus::Rejected, Some(REASON)),
            &officer(),
        )
        .expect_err("audit down");

    assert!(matches!(error, GovernanceError::Audit(_)));
    assert_eq!(stored_status(&drives, "c"), CandidateStatus::Eligible);
}

#[test]
fn audit_failure_on_selection_rolls_back_placement() {
    let drives = ranked_drive();
    let profiles = Arc::new(MemoryProfiles::with(pool()));
    let machine = GovernanceStateMachine::new(profiles.clone(), Arc::new(FailingAudit));

    let error = machine
        .transition(
            &drives,
            &drive_id(),
            &request("b", CandidateStatus::Selected, Some(REASON)),
            &officer(),
        )
        .expect_err("audit down");

    assert!(matches!(error, GovernanceError::Audit(_)));
    assert_eq!(stored_status(&drives, "b"), CandidateStatus::Eligible);
    assert_eq!(profiles.profile("b").placement, PlacementStatus::default());
}

#[test]
fn rolled_back_selection_keeps_earlier_employer() {
    let drives = ranked_drive();
    let mut candidates = pool();
    for candidate in candidates.iter_mut().filter(|candidate| candidate.id.0 == "c") {
        candidate.placement = PlacementStatus {
            placed: true,
            employer: Some("Initech".to_string()),
        };
    }
    let profiles = Arc::new(MemoryProfiles::with(candidates));
    let machine = GovernanceStateMachine::new(profiles.clone(), Arc::new(FailingAudit));

    machine
        .transition(
            &drives,
            &drive_id(),
            &request("c", CandidateStatus::Selected, Some(REASON)),
            &officer(),
        )
        .expect_err("audit down");

    let placement = profiles.profile("c").placement;
    assert!(placement.placed);
    assert_eq!(placement.employer.as_deref(), Some("Initech"));
}
