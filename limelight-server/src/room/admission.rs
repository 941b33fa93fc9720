use limelight_core::{Identity, ParticipantMetadata, ParticipantSnapshot, RoomId, StageError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::config::{RetryPolicy, StageConfig};
use crate::room::{CredentialStore, HostRegistry};
use crate::transport::{RoomService, ServiceError};

const GUEST_NAME: &str = "Guest";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionRequest {
    pub room: RoomId,
    pub identity: Identity,
    #[serde(default)]
    pub display_name: String,
    /// The caller created the room and asks to host it.
    #[serde(default)]
    pub creator: bool,
    #[serde(default)]
    pub host_secret: Option<String>,
}

/// What a join token would carry: who joins, as whom, with which starting metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGrant {
    pub room: RoomId,
    pub identity: Identity,
    pub display_name: String,
    pub is_host: bool,
    /// Encoded metadata the participant joins with.
    pub metadata: String,
    /// Bearer credential for stage requests made as `identity` in `room`.
    pub credential: String,
}

impl JoinGrant {
    pub fn snapshot(&self) -> ParticipantSnapshot {
        ParticipantSnapshot::new(self.identity.clone(), self.display_name.clone())
            .with_metadata(self.metadata.clone())
    }
}

/// Decides who hosts a room at join time.
#[derive(Clone)]
pub struct Admission {
    hosts: HostRegistry,
    credentials: CredentialStore,
    host_secret: Option<Arc<str>>,
    retry: RetryPolicy,
}

impl Admission {
    pub fn new(service: Arc<dyn RoomService>, config: &StageConfig) -> Self {
        Self {
            hosts: HostRegistry::new(service),
            credentials: CredentialStore::new(),
            host_secret: config.host_secret.as_deref().map(Arc::from),
            retry: config.retry,
        }
    }

    pub async fn admit(&self, request: AdmissionRequest) -> Result<JoinGrant, StageError> {
        let claims_host = request.creator || self.secret_matches(request.host_secret.as_deref());

        let is_host = match self.hosts.host_of(&request.room).await {
            Ok(Some(host)) => host == request.identity,
            Ok(None) if claims_host => {
                let host = self
                    .hosts
                    .claim_if_empty(&request.room, &request.identity)
                    .await
                    .map_err(|e| StageError::transport(e.to_string()))?;
                host == request.identity
            }
            Ok(None) => false,
            Err(ServiceError::RoomNotFound(_)) if claims_host => {
                info!(
                    "Room {} not created yet, granting host to {}",
                    request.room, request.identity
                );
                self.hosts
                    .record_later(request.room.clone(), request.identity.clone(), self.retry);
                true
            }
            Err(ServiceError::RoomNotFound(_)) => false,
            Err(e) => {
                error!("Admission lookup for room {} failed: {}", request.room, e);
                return Err(StageError::transport(e.to_string()));
            }
        };

        let display_name = match request.display_name.trim() {
            "" => GUEST_NAME.to_string(),
            name => name.to_string(),
        };

        info!(
            "Admitted {} to room {} as {}",
            request.identity,
            request.room,
            if is_host { "host" } else { "guest" }
        );

        let credential = self.credentials.issue(&request.room, &request.identity);
        Ok(JoinGrant {
            room: request.room,
            identity: request.identity,
            display_name,
            is_host,
            metadata: ParticipantMetadata::admitted(is_host).encode(),
            credential,
        })
    }

    /// Resolves a bearer credential to the identity it was issued for in `room`.
    pub fn authenticate(
        &self,
        room: &RoomId,
        credential: Option<&str>,
    ) -> Result<Identity, StageError> {
        credential
            .and_then(|credential| self.credentials.resolve(room, credential))
            .ok_or(StageError::Unauthenticated)
    }

    /// Whether `identity` is the recorded host. Unknown rooms have no host.
    pub async fn check_host(&self, room: &RoomId, identity: &Identity) -> Result<bool, StageError> {
        match self.hosts.host_of(room).await {
            Ok(host) => Ok(host.as_ref() == Some(identity)),
            Err(ServiceError::RoomNotFound(_)) => Ok(false),
            Err(e) => Err(StageError::transport(e.to_string())),
        }
    }

    fn secret_matches(&self, presented: Option<&str>) -> bool {
        match (self.host_secret.as_deref(), presented) {
            (Some(expected), Some(presented)) => expected == presented,
            _ => false,
        }
    }
}
