use dashmap::DashMap;
use limelight_core::{Identity, MetadataPatch, ParticipantMetadata, RequestId, RoomId, StageError};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::config::RetryPolicy;
use crate::transport::{RoomService, ServiceError};

type WriteKey = (RoomId, Identity);

/// Holds one participant's write lock. On drop, including a cancelled write,
/// the map entry goes away once no other writer holds it.
struct WriteSlot<'a> {
    locks: &'a DashMap<WriteKey, Arc<Mutex<()>>>,
    key: WriteKey,
    lock: Arc<Mutex<()>>,
}

impl<'a> WriteSlot<'a> {
    fn acquire(locks: &'a DashMap<WriteKey, Arc<Mutex<()>>>, key: WriteKey) -> Self {
        let lock = locks.entry(key.clone()).or_default().clone();
        Self { locks, key, lock }
    }
}

impl Drop for WriteSlot<'_> {
    fn drop(&mut self) {
        // The map and this slot hold the only two references.
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 2);
    }
}

/// The only writer of participant stage state.
///
/// Every change goes read current metadata, merge the patch, write back.
/// Writes for the same participant are serialized inside this process;
/// concurrent writers in other processes remain last-write-wins.
pub struct StageAuthority {
    service: Arc<dyn RoomService>,
    retry: RetryPolicy,
    write_locks: DashMap<WriteKey, Arc<Mutex<()>>>,
}

impl StageAuthority {
    pub fn new(service: Arc<dyn RoomService>, retry: RetryPolicy) -> Self {
        Self {
            service,
            retry,
            write_locks: DashMap::new(),
        }
    }

    /// Sets `onStage` for `identity`, keeping every other key of its metadata.
    ///
    /// A write rejected because the room does not exist yet is retried after
    /// `base_delay * attempt`, up to `max_attempts` attempts in total. Any
    /// other failure is returned at once.
    pub async fn set_stage_membership(
        &self,
        room: &RoomId,
        identity: &Identity,
        on_stage: bool,
    ) -> Result<ParticipantMetadata, StageError> {
        self.set_stage_membership_as(RequestId::new(), room, identity, on_stage)
            .await
    }

    /// [`Self::set_stage_membership`], logged under the caller's `request_id`.
    pub async fn set_stage_membership_as(
        &self,
        request_id: RequestId,
        room: &RoomId,
        identity: &Identity,
        on_stage: bool,
    ) -> Result<ParticipantMetadata, StageError> {
        let slot = WriteSlot::acquire(&self.write_locks, (room.clone(), identity.clone()));
        let _guard = slot.lock.lock().await;
        self.write_with_retry(request_id, room, identity, MetadataPatch::stage(on_stage))
            .await
    }

    async fn write_with_retry(
        &self,
        request_id: RequestId,
        room: &RoomId,
        identity: &Identity,
        patch: MetadataPatch,
    ) -> Result<ParticipantMetadata, StageError> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let next = self.current_metadata(room, identity).await.merge(&patch);

            match self
                .service
                .update_participant_metadata(room, identity, next.encode())
                .await
            {
                Ok(()) => {
                    info!(
                        "[{}] {} in room {} is now {}",
                        request_id,
                        identity,
                        room,
                        if next.on_stage() { "on stage" } else { "backstage" }
                    );
                    return Ok(next);
                }
                Err(ServiceError::RoomNotFound(_)) if attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    info!(
                        "[{}] Room {} not found, retrying ({}/{}) in {:?}",
                        request_id, room, attempt, self.retry.max_attempts, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(ServiceError::RoomNotFound(_)) => {
                    error!(
                        "[{}] Room {} still missing after {} attempts",
                        request_id, room, attempt
                    );
                    return Err(StageError::RoomNotReady {
                        room: room.clone(),
                        attempts: attempt,
                    });
                }
                Err(e) => {
                    error!("[{}] Metadata write for {} failed: {}", request_id, identity, e);
                    return Err(StageError::transport(e.to_string()));
                }
            }
        }
    }

    /// Unreadable metadata counts as an empty record.
    async fn current_metadata(&self, room: &RoomId, identity: &Identity) -> ParticipantMetadata {
        match self.service.get_participant(room, identity).await {
            Ok(record) => ParticipantMetadata::parse_or_default(Some(&record.metadata)),
            Err(e) => {
                debug!("Could not read metadata of {}: {}", identity, e);
                ParticipantMetadata::default()
            }
        }
    }

    #[cfg(test)]
    fn tracked_locks(&self) -> usize {
        self.write_locks.len()
    }
}
