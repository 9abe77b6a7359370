use metrics_exporter_prometheus::PrometheusHandle;
use placement_match::matching::{
    AuditError, AuditLog, AuditedTransition, CandidateId, CandidateProfile, Drive, DriveId,
    DriveRepository, PlacementStatus, ProfileStore, Project, RankedEntry, RankedList,
    RepositoryError,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn poisoned(what: &str) -> RepositoryError {
    RepositoryError::Unavailable(format!("{what} mutex poisoned"))
}

/// Process-local drive store. Every write holds the store lock, so ranked-list
/// replacement and entry updates never interleave.
#[derive(Default, Clone)]
pub(crate) struct InMemoryDriveRepository {
    drives: Arc<Mutex<HashMap<DriveId, Drive>>>,
}

impl InMemoryDriveRepository {
    fn guard(&self) -> Result<MutexGuard<'_, HashMap<DriveId, Drive>>, RepositoryError> {
        self.drives.lock().map_err(|_| poisoned("drive repository"))
    }
}

impl DriveRepository for InMemoryDriveRepository {
    fn insert(&self, drive: Drive) -> Result<Drive, RepositoryError> {
        let mut guard = self.guard()?;
        if guard.contains_key(&drive.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(drive.id.clone(), drive.clone());
        Ok(drive)
    }

    fn fetch(&self, id: &DriveId) -> Result<Option<Drive>, RepositoryError> {
        Ok(self.guard()?.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Drive>, RepositoryError> {
        Ok(self.guard()?.values().cloned().collect())
    }

    fn delete(&self, id: &DriveId) -> Result<(), RepositoryError> {
        self.guard()?
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::DriveNotFound(id.clone()))
    }

    fn replace_ranked(&self, id: &DriveId, ranked: RankedList) -> Result<(), RepositoryError> {
        let mut guard = self.guard()?;
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
        let mut guard = self.guard()?;
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

#[derive(Default, Clone)]
pub(crate) struct InMemoryProfileStore {
    profiles: Arc<Mutex<Vec<CandidateProfile>>>,
}

impl InMemoryProfileStore {
    pub(crate) fn seeded(profiles: Vec<CandidateProfile>) -> Self {
        Self {
            profiles: Arc::new(Mutex::new(profiles)),
        }
    }

    fn guard(&self) -> Result<MutexGuard<'_, Vec<CandidateProfile>>, RepositoryError> {
        self.profiles.lock().map_err(|_| poisoned("profile store"))
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn students(&self) -> Result<Vec<CandidateProfile>, RepositoryError> {
        Ok(self.guard()?.clone())
    }

    fn fetch(&self, id: &CandidateId) -> Result<Option<CandidateProfile>, RepositoryError> {
        Ok(self.guard()?.iter().find(|profile| &profile.id == id).cloned())
    }

    fn record_placement(
        &self,
        id: &CandidateId,
        employer: &str,
    ) -> Result<Option<PlacementStatus>, RepositoryError> {
        let mut guard = self.guard()?;
        let profile = find_profile(&mut guard, id)?;

        if profile.placement.placed && profile.placement.employer.as_deref() == Some(employer) {
            return Ok(None);
        }
        let placed = PlacementStatus {
            placed: true,
            employer: Some(employer.to_string()),
        };
        Ok(Some(std::mem::replace(&mut profile.placement, placed)))
    }

    fn restore_placement(
        &self,
        id: &CandidateId,
        previous: PlacementStatus,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.guard()?;
        find_profile(&mut guard, id)?.placement = previous;
        Ok(())
    }
}

fn find_profile<'a>(
    profiles: &'a mut [CandidateProfile],
    id: &CandidateId,
) -> Result<&'a mut CandidateProfile, RepositoryError> {
    profiles
        .iter_mut()
        .find(|profile| &profile.id == id)
        .ok_or_else(|| RepositoryError::CandidateNotFound(id.clone()))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAuditLog {
    records: Arc<Mutex<Vec<AuditedTransition>>>,
}

impl AuditLog for InMemoryAuditLog {
    fn record(&self, transition: AuditedTransition) -> Result<(), AuditError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| AuditError::Transport("audit mutex poisoned".to_string()))?;
        guard.push(transition);
        Ok(())
    }
}

impl InMemoryAuditLog {
    pub(crate) fn records(&self) -> Vec<AuditedTransition> {
        self.records
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

/// Sample student pool used by the server and the demo until a profile service is wired in.
pub(crate) fn seed_students() -> Vec<CandidateProfile> {
    vec![
        student(
            "stu-1001",
            "Aarav Mehta",
            8.6,
            "CSE",
            &["Rust", "SQL", "AWS", "Docker"],
            ("Ledger service", "Double-entry ledger in Rust with SQL storage"),
            "Backend intern building REST APIs in Rust and SQL on AWS.",
            78.0,
        ),
        student(
            "stu-1002",
            "Diya Nair",
            7.9,
            "CSE",
            &["Python", "SQL", "React"],
            ("Attendance dashboard", "React front end over a Python API"),
            "Full stack projects with Python, React and PostgreSQL.",
            64.0,
        ),
        student(
            "stu-1003",
            "Kabir Singh",
            7.1,
            "IT",
            &["Java", "Spring", "SQL"],
            ("Library system", "Java Spring application with SQL reports"),
            "Java developer with Spring Boot experience.",
            55.0,
        ),
        student(
            "stu-1004",
            "Meera Iyer",
            9.2,
            "CSE",
            &["Rust", "C++", "Linux"],
            ("Packet filter", "eBPF packet filter with a Rust control plane"),
            "Systems programming in Rust and C++ on Linux.",
            82.0,
        ),
        student(
            "stu-1005",
            "Rohan Das",
            6.4,
            "CSE",
            &["Node.js", "MongoDB"],
            ("Chat app", "Realtime chat in Node.js"),
            "JavaScript developer.",
            40.0,
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn student(
    id: &str,
    name: &str,
    cgpa: f32,
    branch: &str,
    skills: &[&str],
    project: (&str, &str),
    resume_text: &str,
    resume_score: f32,
) -> CandidateProfile {
    CandidateProfile {
        id: CandidateId(id.to_string()),
        name: name.to_string(),
        cgpa: Some(cgpa),
        branch: Some(branch.to_string()),
        graduation_year: Some(2027),
        skills: skills.iter().map(|skill| skill.to_string()).collect(),
        projects: vec![Project {
            title: project.0.to_string(),
            description: project.1.to_string(),
        }],
        resume_text: resume_text.to_string(),
        resume_score,
        backlogs: 0,
        placement: PlacementStatus::default(),
    }
}
