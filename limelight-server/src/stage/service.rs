use limelight_core::{Identity, ParticipantMetadata, RequestId, RoomId, StageError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{SelfStagePolicy, StageConfig};
use crate::room::HostRegistry;
use crate::stage::StageAuthority;
use crate::transport::RoomService;

/// A request to move `target` on or off stage, made by `caller`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageChangeRequest {
    pub room: RoomId,
    pub caller: Identity,
    #[serde(rename = "participantIdentity")]
    pub target: Identity,
    pub on_stage: bool,
}

impl StageChangeRequest {
    pub fn is_self_change(&self) -> bool {
        self.caller == self.target
    }
}

struct StageServiceInner {
    authority: StageAuthority,
    hosts: HostRegistry,
    service: Arc<dyn RoomService>,
    self_stage: SelfStagePolicy,
}

/// Authorizes stage changes before handing them to the [`StageAuthority`].
///
/// A caller is host when its own metadata says `isHost` or when the room
/// metadata records it as host. Any lookup failure counts as "not host".
#[derive(Clone)]
pub struct StageService {
    inner: Arc<StageServiceInner>,
}

impl StageService {
    pub fn new(service: Arc<dyn RoomService>, config: &StageConfig) -> Self {
        Self {
            inner: Arc::new(StageServiceInner {
                authority: StageAuthority::new(service.clone(), config.retry),
                hosts: HostRegistry::new(service.clone()),
                service,
                self_stage: config.self_stage,
            }),
        }
    }

    pub async fn change_stage(
        &self,
        request: StageChangeRequest,
    ) -> Result<ParticipantMetadata, StageError> {
        let request_id = RequestId::new();
        info!(
            "[{}] Stage change in {}: {} -> {} onStage={}",
            request_id, request.room, request.caller, request.target, request.on_stage
        );

        if !self.is_allowed(&request).await {
            warn!(
                "[{}] Rejected stage change by non-host {}",
                request_id, request.caller
            );
            return Err(StageError::Unauthorized {
                caller: request.caller,
            });
        }

        self.inner
            .authority
            .set_stage_membership_as(
                request_id,
                &request.room,
                &request.target,
                request.on_stage,
            )
            .await
    }

    pub async fn is_host(&self, room: &RoomId, identity: &Identity) -> bool {
        match self.inner.service.get_participant(room, identity).await {
            Ok(record) => {
                if ParticipantMetadata::parse_or_default(Some(&record.metadata)).is_host() {
                    return true;
                }
            }
            Err(e) => debug!("Host lookup for {} via metadata failed: {}", identity, e),
        }

        match self.inner.hosts.host_of(room).await {
            Ok(Some(host)) => &host == identity,
            Ok(None) => false,
            Err(e) => {
                debug!("Host lookup for {} via room failed: {}", identity, e);
                false
            }
        }
    }

    async fn is_allowed(&self, request: &StageChangeRequest) -> bool {
        if request.is_self_change() && self.inner.self_stage == SelfStagePolicy::Anyone {
            return true;
        }
        self.is_host(&request.room, &request.caller).await
    }
}
