use async_trait::async_trait;
use limelight_core::{Identity, RoomId};
use limelight_server::{InMemoryRoomService, ParticipantRecord, RoomService, ServiceError};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// A recorded participant metadata write attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteAttempt {
    pub room: RoomId,
    pub identity: Identity,
    pub metadata: String,
    pub accepted: bool,
}

#[derive(Default)]
struct Script {
    /// Failures returned by the next metadata writes, front first.
    failures: VecDeque<ServiceError>,
    /// Fail every write with this error once `failures` runs out.
    always: Option<ServiceError>,
    attempts: Vec<WriteAttempt>,
    in_flight: usize,
    max_in_flight: usize,
}

/// Room service that delegates to an [`InMemoryRoomService`] but lets tests
/// script write failures and inspect every write attempt.
///
/// A read-merge-write counts as in flight from `get_participant` until the
/// following metadata write, so overlapping sequences show up in
/// [`ScriptedRoomService::max_in_flight`].
#[derive(Clone)]
pub struct ScriptedRoomService {
    inner: InMemoryRoomService,
    script: Arc<Mutex<Script>>,
    read_delay: Duration,
}

impl ScriptedRoomService {
    pub fn new(inner: InMemoryRoomService) -> Self {
        Self {
            inner,
            script: Arc::new(Mutex::new(Script::default())),
            read_delay: Duration::ZERO,
        }
    }

    /// Reads take `delay`, widening the window between read and write.
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    pub fn room(&self) -> &InMemoryRoomService {
        &self.inner
    }

    pub async fn fail_next(&self, error: ServiceError, times: usize) {
        let mut script = self.script.lock().await;
        for _ in 0..times {
            script.failures.push_back(error.clone());
        }
    }

    pub async fn fail_always(&self, error: ServiceError) {
        self.script.lock().await.always = Some(error);
    }

    pub async fn attempts(&self) -> Vec<WriteAttempt> {
        self.script.lock().await.attempts.clone()
    }

    pub async fn accepted_writes(&self) -> usize {
        self.script
            .lock()
            .await
            .attempts
            .iter()
            .filter(|a| a.accepted)
            .count()
    }

    pub async fn max_in_flight(&self) -> usize {
        self.script.lock().await.max_in_flight
    }
}

#[async_trait]
impl RoomService for ScriptedRoomService {
    async fn get_participant(
        &self,
        room: &RoomId,
        identity: &Identity,
    ) -> Result<ParticipantRecord, ServiceError> {
        {
            let mut script = self.script.lock().await;
            script.in_flight += 1;
            script.max_in_flight = script.max_in_flight.max(script.in_flight);
        }
        if !self.read_delay.is_zero() {
            tokio::time::sleep(self.read_delay).await;
        }
        self.inner.get_participant(room, identity).await
    }

    async fn update_participant_metadata(
        &self,
        room: &RoomId,
        identity: &Identity,
        metadata: String,
    ) -> Result<(), ServiceError> {
        let scripted = {
            let mut script = self.script.lock().await;
            script.in_flight = script.in_flight.saturating_sub(1);
            script
                .failures
                .pop_front()
                .or_else(|| script.always.clone())
        };

        let result = match scripted {
            Some(error) => Err(error),
            None => {
                self.inner
                    .update_participant_metadata(room, identity, metadata.clone())
                    .await
            }
        };

        self.script.lock().await.attempts.push(WriteAttempt {
            room: room.clone(),
            identity: identity.clone(),
            metadata,
            accepted: result.is_ok(),
        });
        result
    }

    async fn room_metadata(&self, room: &RoomId) -> Result<Option<String>, ServiceError> {
        self.inner.room_metadata(room).await
    }

    async fn update_room_metadata(
        &self,
        room: &RoomId,
        metadata: String,
    ) -> Result<(), ServiceError> {
        self.inner.update_room_metadata(room, metadata).await
    }
}
