use anyhow::Result;
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use limelight_core::{Identity, ParticipantSnapshot, RoomId};
use limelight_server::{
    Admission, AdmissionRequest, ApiError, AppState, InMemoryRoomService, JoinGrant, StageConfig,
    serve, stage_routes,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct DevState {
    service: InMemoryRoomService,
    admission: Admission,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinBody {
    identity: Identity,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    creator: bool,
    #[serde(default)]
    host_secret: Option<String>,
}

/// Admits the caller and puts it in the in-memory room, as a token-based join would.
async fn join(
    State(state): State<DevState>,
    Path(room): Path<RoomId>,
    Json(body): Json<JoinBody>,
) -> Result<Json<JoinGrant>, ApiError> {
    let grant = state
        .admission
        .admit(AdmissionRequest {
            room: room.clone(),
            identity: body.identity,
            display_name: body.display_name,
            creator: body.creator,
            host_secret: body.host_secret,
        })
        .await?;

    state.service.join(&room, grant.snapshot());
    Ok(Json(grant))
}

async fn participants(
    State(state): State<DevState>,
    Path(room): Path<RoomId>,
) -> Json<Vec<ParticipantSnapshot>> {
    Json(state.service.participants(&room))
}

/// Stage routes plus dev-only join and listing routes, all over one [`Admission`].
pub fn router(service: InMemoryRoomService, config: &StageConfig) -> Router {
    let app = AppState::new(Arc::new(service.clone()), config);
    let dev = DevState {
        admission: app.admission.clone(),
        service,
    };

    let dev_routes = Router::new()
        .route("/rooms/{room}/join", post(join))
        .route("/rooms/{room}/participants", get(participants))
        .with_state(dev);

    stage_routes(app).merge(dev_routes)
}

pub async fn run(config: StageConfig) -> Result<()> {
    info!(
        "Serving stage endpoints over an in-memory room service (self stage: {:?})",
        config.self_stage
    );
    let app = router(InMemoryRoomService::new(), &config);
    serve(config.bind_addr, app).await
}
