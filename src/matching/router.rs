use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{CandidateId, DriveDraft, DriveId, Principal, PrincipalId, PrincipalRole};
use super::governance::TransitionRequest;
use super::repository::{AuditLog, DriveRepository, ProfileStore};
use super::service::{MatchingServiceError, PairScoreRequest, PlacementMatchingService};
use super::validation::parse_status;

pub const PRINCIPAL_ID_HEADER: &str = "x-principal-id";
pub const PRINCIPAL_ROLE_HEADER: &str = "x-principal-role";

type SharedService<D, P, A> = Arc<PlacementMatchingService<D, P, A>>;

/// Router builder exposing drive management, ranking, and governance endpoints.
pub fn matching_router<D, P, A>(service: SharedService<D, P, A>) -> Router
where
    D: DriveRepository + 'static,
    P: ProfileStore + 'static,
    A: AuditLog + 'static,
{
    Router::new()
        .route(
            "/api/v1/drives",
            post(create_drive_handler::<D, P, A>).get(list_drives_handler::<D, P, A>),
        )
        .route(
            "/api/v1/drives/:drive_id",
            get(get_drive_handler::<D, P, A>).delete(delete_drive_handler::<D, P, A>),
        )
        .route(
            "/api/v1/drives/:drive_id/rankings",
            post(rank_handler::<D, P, A>),
        )
        .route(
            "/api/v1/drives/:drive_id/status",
            put(status_handler::<D, P, A>),
        )
        .route(
            "/api/v1/drives/:drive_id/candidates/:candidate_id/breakdown",
            get(breakdown_handler::<D, P, A>),
        )
        .route("/api/v1/match/score", post(score_handler::<D, P, A>))
        .route(
            "/api/v1/candidates/:candidate_id/readiness",
            get(readiness_handler::<D, P, A>),
        )
        .route(
            "/api/v1/placements/stats",
            get(stats_handler::<D, P, A>),
        )
        .with_state(service)
}

/// Status change body. `status` is parsed by hand so an unknown value reads as a
/// validation failure instead of a body rejection.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateBody {
    pub candidate_id: CandidateId,
    pub status: String,
    #[serde(default)]
    pub justification: Option<String>,
}

pub(crate) async fn create_drive_handler<D, P, A>(
    State(service): State<SharedService<D, P, A>>,
    headers: HeaderMap,
    axum::Json(draft): axum::Json<DriveDraft>,
) -> Response
where
    D: DriveRepository + 'static,
    P: ProfileStore + 'static,
    A: AuditLog + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    match service.create_drive(&principal, draft) {
        Ok(drive) => (StatusCode::CREATED, axum::Json(drive.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_drives_handler<D, P, A>(
    State(service): State<SharedService<D, P, A>>,
    headers: HeaderMap,
) -> Response
where
    D: DriveRepository + 'static,
    P: ProfileStore + 'static,
    A: AuditLog + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    match service.list_drives(&principal) {
        Ok(drives) => {
            let views: Vec<_> = drives.iter().map(|drive| drive.view()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_drive_handler<D, P, A>(
    State(service): State<SharedService<D, P, A>>,
    headers: HeaderMap,
    Path(drive_id): Path<String>,
) -> Response
where
    D: DriveRepository + 'static,
    P: ProfileStore + 'static,
    A: AuditLog + 'static,
{
    if let Err(response) = principal_from_headers(&headers) {
        return response;
    }

    match service.get_drive(&DriveId(drive_id)) {
        Ok(drive) => (StatusCode::OK, axum::Json(drive.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_drive_handler<D, P, A>(
    State(service): State<SharedService<D, P, A>>,
    headers: HeaderMap,
    Path(drive_id): Path<String>,
) -> Response
where
    D: DriveRepository + 'static,
    P: ProfileStore + 'static,
    A: AuditLog + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    match service.delete_drive(&principal, &DriveId(drive_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn rank_handler<D, P, A>(
    State(service): State<SharedService<D, P, A>>,
    headers: HeaderMap,
    Path(drive_id): Path<String>,
) -> Response
where
    D: DriveRepository + 'static,
    P: ProfileStore + 'static,
    A: AuditLog + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    match service.rank_drive(&principal, &DriveId(drive_id)).await {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<D, P, A>(
    State(service): State<SharedService<D, P, A>>,
    headers: HeaderMap,
    Path(drive_id): Path<String>,
    axum::Json(body): axum::Json<StatusUpdateBody>,
) -> Response
where
    D: DriveRepository + 'static,
    P: ProfileStore + 'static,
    A: AuditLog + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    let status = match parse_status(&body.status) {
        Ok(status) => status,
        Err(error) => return error_response(error.into()),
    };
    let request = TransitionRequest {
        candidate_id: body.candidate_id,
        status,
        justification: body.justification,
    };

    match service.update_status(&principal, &DriveId(drive_id), &request) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn breakdown_handler<D, P, A>(
    State(service): State<SharedService<D, P, A>>,
    headers: HeaderMap,
    Path((drive_id, candidate_id)): Path<(String, String)>,
) -> Response
where
    D: DriveRepository + 'static,
    P: ProfileStore + 'static,
    A: AuditLog + 'static,
{
    if let Err(response) = principal_from_headers(&headers) {
        return response;
    }

    match service.explain(&DriveId(drive_id), &CandidateId(candidate_id)) {
        Ok(breakdown) => (StatusCode::OK, axum::Json(breakdown)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn score_handler<D, P, A>(
    State(_service): State<SharedService<D, P, A>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<PairScoreRequest>,
) -> Response
where
    D: DriveRepository + 'static,
    P: ProfileStore + 'static,
    A: AuditLog + 'static,
{
    if let Err(response) = principal_from_headers(&headers) {
        return response;
    }

    (StatusCode::OK, axum::Json(request.score())).into_response()
}

pub(crate) async fn readiness_handler<D, P, A>(
    State(service): State<SharedService<D, P, A>>,
    headers: HeaderMap,
    Path(candidate_id): Path<String>,
) -> Response
where
    D: DriveRepository + 'static,
    P: ProfileStore + 'static,
    A: AuditLog + 'static,
{
    if let Err(response) = principal_from_headers(&headers) {
        return response;
    }

    match service.readiness(&CandidateId(candidate_id)) {
        Ok(index) => (StatusCode::OK, axum::Json(index)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn stats_handler<D, P, A>(
    State(service): State<SharedService<D, P, A>>,
    headers: HeaderMap,
) -> Response
where
    D: DriveRepository + 'static,
    P: ProfileStore + 'static,
    A: AuditLog + 'static,
{
    let principal = match principal_from_headers(&headers) {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    match service.placement_stats(&principal) {
        Ok(stats) => (StatusCode::OK, axum::Json(stats)).into_response(),
        Err(error) => error_response(error),
    }
}

/// Identity forwarded by the gateway. Requests without a usable pair are rejected.
fn principal_from_headers(headers: &HeaderMap) -> Result<Principal, Response> {
    let id = headers
        .get(PRINCIPAL_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let role = headers
        .get(PRINCIPAL_ROLE_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(PrincipalRole::parse);

    match (id, role) {
        (Some(id), Some(role)) => Ok(Principal {
            id: PrincipalId(id.to_string()),
            role,
        }),
        _ => {
            let payload = json!({
                "error": "missing or invalid principal headers",
            });
            Err((StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response())
        }
    }
}

pub(crate) fn error_status(error: &MatchingServiceError) -> StatusCode {
    match error {
        MatchingServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        MatchingServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        MatchingServiceError::Forbidden => StatusCode::FORBIDDEN,
        MatchingServiceError::Persistence(_) | MatchingServiceError::Audit(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(error: MatchingServiceError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (error_status(&error), axum::Json(payload)).into_response()
}
