use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::super::domain::{CandidateId, CandidateProfile, Drive};
use super::local::to_percent;

/// Score assigned to candidates the remote service silently drops.
pub const UNSCORED_DEFAULT: u8 = 50;

/// Batched request understood by the external scoring service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteScoringRequest {
    pub jd_text: String,
    pub required_skills: Vec<String>,
    pub students: Vec<RemoteCandidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCandidate {
    pub id: String,
    pub skills: Vec<String>,
    pub resume_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteScoringResponse {
    pub results: Vec<RemoteScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteScore {
    pub student_id: String,
    pub match_score: f64,
}

impl RemoteScoringRequest {
    pub fn for_batch(drive: &Drive, candidates: &[CandidateProfile]) -> Self {
        Self {
            jd_text: drive.job_description.clone(),
            required_skills: drive.required_skills.clone(),
            students: candidates
                .iter()
                .map(|candidate| RemoteCandidate {
                    id: candidate.id.0.clone(),
                    skills: candidate.skills.clone(),
                    resume_text: candidate.resume_text.clone(),
                })
                .collect(),
        }
    }
}

/// Failure talking to the scoring service. Callers recover with local fallback scoring.
#[derive(Debug, thiserror::Error)]
pub enum RemoteScoringError {
    #[error("scoring service timed out after {0:?}")]
    Timeout(Duration),
    #[error("scoring service unreachable: {0}")]
    Transport(String),
    #[error("scoring service returned status {0}")]
    Status(u16),
    #[error("malformed scoring response: {0}")]
    Malformed(String),
    #[error("remote scoring disabled")]
    Disabled,
}

/// Outbound scoring backend. Implementations perform a single attempt and never retry.
#[async_trait]
pub trait ScoringService: Send + Sync {
    async fn score_batch(
        &self,
        request: &RemoteScoringRequest,
    ) -> Result<RemoteScoringResponse, RemoteScoringError>;
}

/// HTTP client for the scoring service's `POST /match` endpoint.
#[derive(Clone)]
pub struct HttpScoringClient {
    client: Client,
    endpoint: String,
}

impl HttpScoringClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteScoringError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| RemoteScoringError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/match", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ScoringService for HttpScoringClient {
    async fn score_batch(
        &self,
        request: &RemoteScoringRequest,
    ) -> Result<RemoteScoringResponse, RemoteScoringError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteScoringError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(transport_error)?;
        let parsed: RemoteScoringResponse = serde_json::from_slice(&body)
            .map_err(|err| RemoteScoringError::Malformed(err.to_string()))?;

        debug!(
            endpoint = %self.endpoint,
            results = parsed.results.len(),
            "scoring service responded"
        );
        Ok(parsed)
    }
}

fn transport_error(err: reqwest::Error) -> RemoteScoringError {
    if err.is_timeout() {
        RemoteScoringError::Timeout(Duration::ZERO)
    } else {
        RemoteScoringError::Transport(err.to_string())
    }
}

/// Stand-in used when no scoring service is configured; every run falls back locally.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledScoringService;

#[async_trait]
impl ScoringService for DisabledScoringService {
    async fn score_batch(
        &self,
        _request: &RemoteScoringRequest,
    ) -> Result<RemoteScoringResponse, RemoteScoringError> {
        Err(RemoteScoringError::Disabled)
    }
}

/// Bounds a [`ScoringService`] call with a timeout and maps results back onto candidates.
#[derive(Clone)]
pub struct RemoteScorerAdapter {
    service: Arc<dyn ScoringService>,
    timeout: Duration,
}

impl RemoteScorerAdapter {
    pub fn new(service: Arc<dyn ScoringService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Score every candidate in one request. Candidates missing from the response get
    /// [`UNSCORED_DEFAULT`]; any failure means none of the returned values may be used.
    pub async fn score(
        &self,
        drive: &Drive,
        candidates: &[CandidateProfile],
    ) -> Result<HashMap<CandidateId, u8>, RemoteScoringError> {
        if candidates.is_empty() {
            return Ok(HashMap::new());
        }

        let request = RemoteScoringRequest::for_batch(drive, candidates);
        let response = tokio::time::timeout(self.timeout, self.service.score_batch(&request))
            .await
            .map_err(|_| RemoteScoringError::Timeout(self.timeout))?
            .map_err(|err| match err {
                RemoteScoringError::Timeout(_) => RemoteScoringError::Timeout(self.timeout),
                other => other,
            })?;

        let mut returned = HashMap::with_capacity(response.results.len());
        for result in response.results {
            if !result.match_score.is_finite() || !(0.0..=1.0).contains(&result.match_score) {
                return Err(RemoteScoringError::Malformed(format!(
                    "score {} for '{}' outside 0..=1",
                    result.match_score, result.student_id
                )));
            }
            returned.insert(result.student_id, to_percent(result.match_score));
        }

        Ok(candidates
            .iter()
            .map(|candidate| {
                let score = returned
                    .get(&candidate.id.0)
                    .copied()
                    .unwrap_or(UNSCORED_DEFAULT);
                (candidate.id.clone(), score)
            })
            .collect())
    }
}
