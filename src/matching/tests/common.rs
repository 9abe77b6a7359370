use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::post;
use axum::Router;
use chrono::{NaiveDate, Utc};
use serde_json::Value;

use crate::matching::domain::{
    AuditedTransition, CandidateId, CandidateProfile, Drive, DriveId, DriveStatus,
    EligibilityRules, PlacementStatus, Principal, PrincipalId, Project, RankedEntry, RankedList,
};
use crate::matching::repository::{
    AuditError, AuditLog, DriveRepository, ProfileStore, RepositoryError,
};
use crate::matching::scoring::{
    RemoteScore, RemoteScorerAdapter, RemoteScoringError, RemoteScoringRequest,
    RemoteScoringResponse, ScoringService,
};
use crate::matching::{PlacementMatchingService, RankingOrchestrator, RerankPolicy};

pub(super) const OFFICER_ID: &str = "officer-1";

pub(super) fn officer() -> Principal {
    Principal::officer(OFFICER_ID)
}

pub(super) fn rules() -> EligibilityRules {
    EligibilityRules {
        minimum_cgpa: 7.0,
        allowed_branches: vec!["CSE".to_string()],
        graduation_year: None,
        max_backlogs: None,
    }
}

pub(super) fn drive(id: &str) -> Drive {
    Drive {
        id: DriveId(id.to_string()),
        company_name: "Acme Systems".to_string(),
        role: "Backend Engineer".to_string(),
        job_description: "Build reliable backend services in Rust with SQL storage and REST APIs."
            .to_string(),
        ctc: "12 LPA".to_string(),
        location: "Pune".to_string(),
        drive_date: NaiveDate::from_ymd_opt(2026, 11, 20).expect("valid date"),
        application_deadline: NaiveDate::from_ymd_opt(2026, 11, 10).expect("valid date"),
        eligibility: rules(),
        required_skills: vec!["Rust".to_string(), "SQL".to_string()],
        rounds: vec!["Aptitude".to_string(), "Technical".to_string()],
        status: DriveStatus::Active,
        owner: PrincipalId(OFFICER_ID.to_string()),
        created_at: Utc::now(),
        ranked: RankedList::default(),
    }
}

pub(super) fn candidate(id: &str, cgpa: f32, branch: &str, skills: &[&str]) -> CandidateProfile {
    CandidateProfile {
        id: CandidateId(id.to_string()),
        name: format!("Student {id}"),
        cgpa: Some(cgpa),
        branch: Some(branch.to_string()),
        graduation_year: Some(2027),
        skills: skills.iter().map(|skill| skill.to_string()).collect(),
        projects: vec![Project {
            title: "Inventory API".to_string(),
            description: "REST service backed by SQL".to_string(),
        }],
        resume_text: "Worked on backend services and databases.".to_string(),
        resume_score: 60.0,
        backlogs: 0,
        placement: PlacementStatus::default(),
    }
}

/// Three CSE candidates that pass the default rules.
pub(super) fn pool() -> Vec<CandidateProfile> {
    vec![
        candidate("a", 7.5, "CSE", &["Python"]),
        candidate("b", 8.8, "CSE", &["Rust", "SQL"]),
        candidate("c", 8.0, "CSE", &["Rust"]),
    ]
}

pub(super) fn entry(id: &str, score: u8) -> RankedEntry {
    RankedEntry {
        candidate_id: CandidateId(id.to_string()),
        match_score: score,
        status: Default::default(),
    }
}

#[derive(Default)]
pub(super) struct MemoryDrives {
    drives: Mutex<HashMap<DriveId, Drive>>,
}

impl MemoryDrives {
    pub(super) fn with(drive: Drive) -> Self {
        let repo = Self::default();
        repo.drives
            .lock()
            .expect("lock")
            .insert(drive.id.clone(), drive);
        repo
    }

    pub(super) fn snapshot(&self, id: &str) -> Drive {
        self.drives
            .lock()
            .expect("lock")
            .get(&DriveId(id.to_string()))
            .cloned()
            .expect("drive stored")
    }
}

impl DriveRepository for MemoryDrives {
    fn insert(&self, drive: Drive) -> Result<Drive, RepositoryError> {
        let mut guard = self.drives.lock().expect("lock");
        if guard.contains_key(&drive.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(drive.id.clone(), drive.clone());
        Ok(drive)
    }

    fn fetch(&self, id: &DriveId) -> Result<Option<Drive>, RepositoryError> {
        Ok(self.drives.lock().expect("lock").get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Drive>, RepositoryError> {
        Ok(self.drives.lock().expect("lock").values().cloned().collect())
    }

    fn delete(&self, id: &DriveId) -> Result<(), RepositoryError> {
        self.drives
            .lock()
            .expect("lock")
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::DriveNotFound(id.clone()))
    }

    fn replace_ranked(&self, id: &DriveId, ranked: RankedList) -> Result<(), RepositoryError> {
        let mut guard = self.drives.lock().expect("lock");
        let drive = guard
            .get_mut(id)
            .ok_or_else(|| RepositoryError::DriveNotFound(id.clone()))?;
        drive.ranked = ranked;
        Ok(())
    }

    fn update_entry<T, E, F>(
        &self,
        drive_id: &DriveId,
        candidate_id: &CandidateId,
        apply: F,
    ) -> Result<T, E>
    where
        F: FnOnce(&Drive, &mut RankedEntry) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut guard = self.drives.lock().expect("lock");
        let drive = guard
            .get_mut(drive_id)
            .ok_or_else(|| RepositoryError::DriveNotFound(drive_id.clone()))?;
        let mut entry = drive
            .ranked
            .get(candidate_id)
            .cloned()
            .ok_or_else(|| RepositoryError::EntryNotFound(candidate_id.clone()))?;

        let result = apply(drive, &mut entry)?;
        if let Some(slot) = drive.ranked.get_mut(candidate_id) {
            *slot = entry;
        }
        Ok(result)
    }
}

/// Accepts reads but refuses to persist rankings.
pub(super) struct ReadOnlyDrives(pub(super) MemoryDrives);

impl DriveRepository for ReadOnlyDrives {
    fn insert(&self, drive: Drive) -> Result<Drive, RepositoryError> {
        self.0.insert(drive)
    }

    fn fetch(&self, id: &DriveId) -> Result<Option<Drive>, RepositoryError> {
        self.0.fetch(id)
    }

    fn list(&self) -> Result<Vec<Drive>, RepositoryError> {
        self.0.list()
    }

    fn delete(&self, id: &DriveId) -> Result<(), RepositoryError> {
        self.0.delete(id)
    }

    fn replace_ranked(&self, _id: &DriveId, _ranked: RankedList) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read-only replica".to_string()))
    }

    fn update_entry<T, E, F>(
        &self,
        drive_id: &DriveId,
        candidate_id: &CandidateId,
        apply: F,
    ) -> Result<T, E>
    where
        F: FnOnce(&Drive, &mut RankedEntry) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        self.0.update_entry(drive_id, candidate_id, apply)
    }
}

#[derive(Default)]
pub(super) struct MemoryProfiles {
    profiles: Mutex<Vec<CandidateProfile>>,
    placement_writes: Mutex<usize>,
}

impl MemoryProfiles {
    pub(super) fn with(profiles: Vec<CandidateProfile>) -> Self {
        Self {
            profiles: Mutex::new(profiles),
            placement_writes: Mutex::new(0),
        }
    }

    pub(super) fn replace(&self, profiles: Vec<CandidateProfile>) {
        *self.profiles.lock().expect("lock") = profiles;
    }

    pub(super) fn profile(&self, id: &str) -> CandidateProfile {
        self.profiles
            .lock()
            .expect("lock")
            .iter()
            .find(|profile| profile.id.0 == id)
            .cloned()
            .expect("profile stored")
    }

    pub(super) fn placement_writes(&self) -> usize {
        *self.placement_writes.lock().expect("lock")
    }
}

impl ProfileStore for MemoryProfiles {
    fn students(&self) -> Result<Vec<CandidateProfile>, RepositoryError> {
        Ok(self.profiles.lock().expect("lock").clone())
    }

    fn fetch(&self, id: &CandidateId) -> Result<Option<CandidateProfile>, RepositoryError> {
        Ok(self
            .profiles
            .lock()
            .expect("lock")
            .iter()
            .find(|profile| &profile.id == id)
            .cloned())
    }

    fn record_placement(
        &self,
        id: &CandidateId,
        employer: &str,
    ) -> Result<Option<PlacementStatus>, RepositoryError> {
        let mut guard = self.profiles.lock().expect("lock");
        let profile = guard
            .iter_mut()
            .find(|profile| &profile.id == id)
            .ok_or_else(|| RepositoryError::CandidateNotFound(id.clone()))?;

        if profile.placement.placed && profile.placement.employer.as_deref() == Some(employer) {
            return Ok(None);
        }
        let previous = std::mem::replace(
            &mut profile.placement,
            PlacementStatus {
                placed: true,
                employer: Some(employer.to_string()),
            },
        );
        *self.placement_writes.lock().expect("lock") += 1;
        Ok(Some(previous))
    }

    fn restore_placement(
        &self,
        id: &CandidateId,
        previous: PlacementStatus,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.profiles.lock().expect("lock");
        let profile = guard
            .iter_mut()
            .find(|profile| &profile.id == id)
            .ok_or_else(|| RepositoryError::CandidateNotFound(id.clone()))?;
        profile.placement = previous;
        Ok(())
    }
}

pub(super) struct UnavailableProfiles;

impl ProfileStore for UnavailableProfiles {
    fn students(&self) -> Result<Vec<CandidateProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("profile store offline".to_string()))
    }

    fn fetch(&self, _id: &CandidateId) -> Result<Option<CandidateProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("profile store offline".to_string()))
    }

    fn record_placement(
        &self,
        _id: &CandidateId,
        _employer: &str,
    ) -> Result<Option<PlacementStatus>, RepositoryError> {
        Err(RepositoryError::Unavailable("profile store offline".to_string()))
    }

    fn restore_placement(
        &self,
        _id: &CandidateId,
        _previous: PlacementStatus,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("profile store offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryAudit {
    records: Mutex<Vec<AuditedTransition>>,
}

impl MemoryAudit {
    pub(super) fn records(&self) -> Vec<AuditedTransition> {
        self.records.lock().expect("lock").clone()
    }
}

impl AuditLog for MemoryAudit {
    fn record(&self, transition: AuditedTransition) -> Result<(), AuditError> {
        self.records.lock().expect("lock").push(transition);
        Ok(())
    }
}

pub(super) struct FailingAudit;

impl AuditLog for FailingAudit {
    fn record(&self, _transition: AuditedTransition) -> Result<(), AuditError> {
        Err(AuditError::Transport("audit sink down".to_string()))
    }
}

/// In-process scoring backend returning fixed 0..=1 scores, or failing outright.
pub(super) struct StubScoring {
    scores: Option<HashMap<String, f64>>,
    delay: Duration,
}

impl StubScoring {
    pub(super) fn returning(scores: &[(&str, f64)]) -> Self {
        Self {
            scores: Some(
                scores
                    .iter()
                    .map(|(id, score)| (id.to_string(), *score))
                    .collect(),
            ),
            delay: Duration::ZERO,
        }
    }

    pub(super) fn failing() -> Self {
        Self {
            scores: None,
            delay: Duration::ZERO,
        }
    }

    pub(super) fn slow(delay: Duration) -> Self {
        Self {
            scores: Some(HashMap::new()),
            delay,
        }
    }
}

#[async_trait]
impl ScoringService for StubScoring {
    async fn score_batch(
        &self,
        _request: &RemoteScoringRequest,
    ) -> Result<RemoteScoringResponse, RemoteScoringError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.scores {
            Some(scores) => Ok(RemoteScoringResponse {
                results: scores
                    .iter()
                    .map(|(id, score)| RemoteScore {
                        student_id: id.clone(),
                        match_score: *score,
                    })
                    .collect(),
            }),
            None => Err(RemoteScoringError::Transport("connection refused".to_string())),
        }
    }
}

pub(super) fn orchestrator(scoring: StubScoring, policy: RerankPolicy) -> RankingOrchestrator {
    let adapter = RemoteScorerAdapter::new(Arc::new(scoring), Duration::from_millis(200));
    RankingOrchestrator::new(adapter, policy)
}

pub(super) type TestService = PlacementMatchingService<MemoryDrives, MemoryProfiles, MemoryAudit>;

pub(super) fn build_service(
    drives: MemoryDrives,
    profiles: Vec<CandidateProfile>,
    scoring: StubScoring,
) -> (
    Arc<TestService>,
    Arc<MemoryDrives>,
    Arc<MemoryProfiles>,
    Arc<MemoryAudit>,
) {
    let drives = Arc::new(drives);
    let profiles = Arc::new(MemoryProfiles::with(profiles));
    let audit = Arc::new(MemoryAudit::default());
    let service = Arc::new(PlacementMatchingService::with_orchestrator(
        drives.clone(),
        profiles.clone(),
        audit.clone(),
        orchestrator(scoring, RerankPolicy::Reset),
    ));
    (service, drives, profiles, audit)
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub(super) async fn spawn_scoring_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let address = listener.local_addr().expect("local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock server");
    });
    format!("http://{address}")
}

pub(super) fn scoring_router(scores: Vec<(String, f64)>) -> Router {
    Router::new().route(
        "/match",
        post(move |axum::Json(request): axum::Json<RemoteScoringRequest>| {
            let scores = scores.clone();
            async move {
                let results = request
                    .students
                    .iter()
                    .filter_map(|student| {
                        scores
                            .iter()
                            .find(|(id, _)| id == &student.id)
                            .map(|(id, score)| RemoteScore {
                                student_id: id.clone(),
                                match_score: *score,
                            })
                    })
                    .collect();
                axum::Json(RemoteScoringResponse { results })
            }
        }),
    )
}

pub(super) fn slow_scoring_router(delay: Duration) -> Router {
    Router::new().route(
        "/match",
        post(move || async move {
            tokio::time::sleep(delay).await;
            axum::Json(RemoteScoringResponse {
                results: Vec::new(),
            })
        }),
    )
}

pub(super) fn failing_scoring_router() -> Router {
    Router::new().route(
        "/match",
        post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "model not loaded") }),
    )
}

pub(super) async fn read_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("valid json")
}
