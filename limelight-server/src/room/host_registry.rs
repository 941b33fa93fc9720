use limelight_core::{Identity, RoomId};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::RetryPolicy;
use crate::transport::{RoomService, ServiceError};

pub const HOST_IDENTITY_KEY: &str = "hostIdentity";

struct HostRegistryInner {
    service: Arc<dyn RoomService>,
    claim_lock: Mutex<()>,
}

/// Records which identity hosts a room, in the room's own metadata.
#[derive(Clone)]
pub struct HostRegistry {
    inner: Arc<HostRegistryInner>,
}

impl HostRegistry {
    pub fn new(service: Arc<dyn RoomService>) -> Self {
        Self {
            inner: Arc::new(HostRegistryInner {
                service,
                claim_lock: Mutex::new(()),
            }),
        }
    }

    pub async fn host_of(&self, room: &RoomId) -> Result<Option<Identity>, ServiceError> {
        let map = self.room_map(room).await?;
        Ok(map
            .get(HOST_IDENTITY_KEY)
            .and_then(Value::as_str)
            .map(Identity::from))
    }

    /// Records `identity` as host unless a host exists. Returns whoever is host afterwards.
    pub async fn claim_if_empty(
        &self,
        room: &RoomId,
        identity: &Identity,
    ) -> Result<Identity, ServiceError> {
        let _guard = self.inner.claim_lock.lock().await;

        let mut map = self.room_map(room).await?;
        if let Some(host) = map.get(HOST_IDENTITY_KEY).and_then(Value::as_str) {
            return Ok(Identity::from(host));
        }

        map.insert(
            HOST_IDENTITY_KEY.to_string(),
            Value::String(identity.as_str().to_string()),
        );
        self.inner
            .service
            .update_room_metadata(room, Value::Object(map).to_string())
            .await?;

        info!("Recorded {} as host of room {}", identity, room);
        Ok(identity.clone())
    }

    /// Claims host in the background once the room exists.
    pub fn record_later(&self, room: RoomId, identity: Identity, retry: RetryPolicy) {
        let registry = self.clone();
        tokio::spawn(async move {
            for attempt in 1..=retry.max_attempts {
                match registry.claim_if_empty(&room, &identity).await {
                    Ok(host) if host == identity => return,
                    Ok(host) => {
                        warn!(
                            "Room {} got host {} before {} could be recorded",
                            room, host, identity
                        );
                        return;
                    }
                    Err(ServiceError::RoomNotFound(_)) => {
                        tokio::time::sleep(retry.delay_for(attempt)).await;
                    }
                    Err(e) => {
                        warn!("Could not record host of room {}: {}", room, e);
                        return;
                    }
                }
            }
            warn!("Gave up recording {} as host of room {}", identity, room);
        });
    }

    /// Room metadata as an object; unreadable or foreign blobs start empty.
    async fn room_map(&self, room: &RoomId) -> Result<Map<String, Value>, ServiceError> {
        let raw = self.inner.service.room_metadata(room).await?;
        let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
            return Ok(Map::new());
        };
        match serde_json::from_str(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            _ => {
                warn!("Room {} has unreadable metadata, treating it as empty", room);
                Ok(Map::new())
            }
        }
    }
}
