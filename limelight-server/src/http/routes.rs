use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use limelight_core::{Identity, ParticipantMetadata, RoomId, StageError};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::config::StageConfig;
use crate::room::{Admission, AdmissionRequest, JoinGrant};
use crate::stage::{StageChangeRequest, StageService};
use crate::transport::RoomService;

#[derive(Clone)]
pub struct AppState {
    pub stage: StageService,
    pub admission: Admission,
}

impl AppState {
    pub fn new(service: Arc<dyn RoomService>, config: &StageConfig) -> Self {
        Self {
            stage: StageService::new(service.clone(), config),
            admission: Admission::new(service, config),
        }
    }
}

/// [`StageError`] as an HTTP response. The body is the error itself as JSON.
pub struct ApiError(pub StageError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            StageError::Unauthenticated => StatusCode::UNAUTHORIZED,
            StageError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            StageError::RoomNotReady { .. } => StatusCode::SERVICE_UNAVAILABLE,
            StageError::Transport { .. } => StatusCode::BAD_GATEWAY,
            StageError::NoRoom => StatusCode::NOT_FOUND,
        }
    }
}

impl From<StageError> for ApiError {
    fn from(err: StageError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.0)).into_response()
    }
}

/// The caller is never taken from the body; it comes from the bearer credential.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StageChangeBody {
    participant_identity: Identity,
    on_stage: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StageChangeResponse {
    pub ok: bool,
    pub updated: ParticipantMetadata,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdmitBody {
    identity: Identity,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    creator: bool,
    #[serde(default)]
    host_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HostQuery {
    identity: Identity,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostCheckResponse {
    pub is_host: bool,
}

async fn health() -> &'static str {
    "ok"
}

fn bearer_credential(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|credential| !credential.is_empty())
}

async fn change_stage(
    State(state): State<AppState>,
    Path(room): Path<RoomId>,
    headers: HeaderMap,
    Json(body): Json<StageChangeBody>,
) -> Result<Json<StageChangeResponse>, ApiError> {
    let caller = state
        .admission
        .authenticate(&room, bearer_credential(&headers))?;

    let updated = state
        .stage
        .change_stage(StageChangeRequest {
            room,
            caller,
            target: body.participant_identity,
            on_stage: body.on_stage,
        })
        .await?;

    Ok(Json(StageChangeResponse { ok: true, updated }))
}

async fn admit(
    State(state): State<AppState>,
    Path(room): Path<RoomId>,
    Json(body): Json<AdmitBody>,
) -> Result<Json<JoinGrant>, ApiError> {
    let grant = state
        .admission
        .admit(AdmissionRequest {
            room,
            identity: body.identity,
            display_name: body.display_name,
            creator: body.creator,
            host_secret: body.host_secret,
        })
        .await?;

    Ok(Json(grant))
}

async fn check_host(
    State(state): State<AppState>,
    Path(room): Path<RoomId>,
    Query(query): Query<HostQuery>,
) -> Result<Json<HostCheckResponse>, ApiError> {
    let is_host = state.admission.check_host(&room, &query.identity).await?;
    Ok(Json(HostCheckResponse { is_host }))
}

pub fn stage_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/rooms/{room}/stage", post(change_stage))
        .route("/rooms/{room}/admit", post(admit))
        .route("/rooms/{room}/host", get(check_host))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, router: Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Stage server listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
