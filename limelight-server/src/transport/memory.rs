use async_trait::async_trait;
use dashmap::DashMap;
use limelight_core::{
    Identity, ParticipantSnapshot, PublicationState, RoomEvent, RoomId, TrackPublicationInfo,
    TrackSource,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::transport::room_service::{ParticipantRecord, RoomService, ServiceError};

const EVENT_CAPACITY: usize = 256;

struct RoomState {
    metadata: Option<String>,
    /// Join order.
    participants: Vec<ParticipantSnapshot>,
    events: broadcast::Sender<RoomEvent>,
    /// Metadata writes that still fail with `RoomNotFound` before the room is usable.
    pending_failures: u32,
}

impl RoomState {
    fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            metadata: None,
            participants: Vec::new(),
            events,
            pending_failures: 0,
        }
    }

    fn participant_mut(&mut self, identity: &Identity) -> Option<&mut ParticipantSnapshot> {
        self.participants
            .iter_mut()
            .find(|p| &p.identity == identity)
    }

    fn emit(&self, event: RoomEvent) {
        // No subscribers is fine: nobody is watching the room yet.
        let _ = self.events.send(event);
    }
}

/// Process-local transport: rooms, participants, metadata and per-room event fanout.
///
/// Backs the development server and the test suites. Rooms appear on first
/// join or subscribe, the way a media server creates rooms on demand.
#[derive(Clone, Default)]
pub struct InMemoryRoomService {
    rooms: Arc<DashMap<RoomId, RoomState>>,
    metadata_writes: Arc<AtomicU64>,
}

impl InMemoryRoomService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_room(&self, room: &RoomId) {
        self.rooms.entry(room.clone()).or_insert_with(RoomState::new);
    }

    /// Simulates the room-creation race: the next `failures` participant
    /// metadata writes to `room` fail with `RoomNotFound`.
    pub fn defer_room(&self, room: &RoomId, failures: u32) {
        let mut state = self.rooms.entry(room.clone()).or_insert_with(RoomState::new);
        state.pending_failures = failures;
    }

    pub fn subscribe(&self, room: &RoomId) -> broadcast::Receiver<RoomEvent> {
        self.rooms
            .entry(room.clone())
            .or_insert_with(RoomState::new)
            .events
            .subscribe()
    }

    /// Current participants in join order, as a newly connected client would receive them.
    pub fn participants(&self, room: &RoomId) -> Vec<ParticipantSnapshot> {
        self.rooms
            .get(room)
            .map(|state| state.participants.clone())
            .unwrap_or_default()
    }

    pub fn join(&self, room: &RoomId, snapshot: ParticipantSnapshot) {
        info!("Participant {} joined room {}", snapshot.identity, room);

        let mut state = self.rooms.entry(room.clone()).or_insert_with(RoomState::new);
        state.participants.retain(|p| p.identity != snapshot.identity);
        state.participants.push(snapshot.clone());
        state.emit(RoomEvent::ParticipantConnected(snapshot));
    }

    pub fn leave(&self, room: &RoomId, identity: &Identity) {
        let Some(mut state) = self.rooms.get_mut(room) else {
            return;
        };
        let before = state.participants.len();
        state.participants.retain(|p| &p.identity != identity);
        if state.participants.len() != before {
            info!("Participant {} left room {}", identity, room);
            state.emit(RoomEvent::ParticipantDisconnected {
                identity: identity.clone(),
            });
        }
    }

    pub fn publish_track(
        &self,
        room: &RoomId,
        identity: &Identity,
        source: TrackSource,
        publication: PublicationState,
    ) {
        let Some(mut state) = self.rooms.get_mut(room) else {
            return;
        };
        let Some(participant) = state.participant_mut(identity) else {
            return;
        };
        participant.publications.retain(|p| p.source != source);
        participant.publications.push(TrackPublicationInfo {
            source,
            state: publication,
        });
        state.emit(RoomEvent::TrackPublished {
            identity: identity.clone(),
            source,
            state: publication,
        });
    }

    pub fn unpublish_track(&self, room: &RoomId, identity: &Identity, source: TrackSource) {
        let Some(mut state) = self.rooms.get_mut(room) else {
            return;
        };
        let Some(participant) = state.participant_mut(identity) else {
            return;
        };
        participant.publications.retain(|p| p.source != source);
        state.emit(RoomEvent::TrackUnpublished {
            identity: identity.clone(),
            source,
        });
    }

    /// Number of successful participant metadata writes since creation.
    pub fn metadata_writes(&self) -> u64 {
        self.metadata_writes.load(Ordering::SeqCst)
    }

    pub fn metadata_of(&self, room: &RoomId, identity: &Identity) -> Option<String> {
        let state = self.rooms.get(room)?;
        state
            .participants
            .iter()
            .find(|p| &p.identity == identity)
            .map(|p| p.metadata.clone())
    }
}

#[async_trait]
impl RoomService for InMemoryRoomService {
    async fn get_participant(
        &self,
        room: &RoomId,
        identity: &Identity,
    ) -> Result<ParticipantRecord, ServiceError> {
        let state = self
            .rooms
            .get(room)
            .ok_or_else(|| ServiceError::RoomNotFound(room.clone()))?;

        state
            .participants
            .iter()
            .find(|p| &p.identity == identity)
            .map(|p| ParticipantRecord {
                identity: p.identity.clone(),
                display_name: p.display_name.clone(),
                metadata: p.metadata.clone(),
            })
            .ok_or_else(|| ServiceError::ParticipantNotFound {
                room: room.clone(),
                identity: identity.clone(),
            })
    }

    async fn update_participant_metadata(
        &self,
        room: &RoomId,
        identity: &Identity,
        metadata: String,
    ) -> Result<(), ServiceError> {
        let mut state = self
            .rooms
            .get_mut(room)
            .ok_or_else(|| ServiceError::RoomNotFound(room.clone()))?;

        if state.pending_failures > 0 {
            state.pending_failures -= 1;
            debug!("Room {} not materialized yet", room);
            return Err(ServiceError::RoomNotFound(room.clone()));
        }

        let participant =
            state
                .participant_mut(identity)
                .ok_or_else(|| ServiceError::ParticipantNotFound {
                    room: room.clone(),
                    identity: identity.clone(),
                })?;
        participant.metadata = metadata.clone();

        state.emit(RoomEvent::ParticipantMetadataChanged {
            identity: identity.clone(),
            metadata,
        });
        self.metadata_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn room_metadata(&self, room: &RoomId) -> Result<Option<String>, ServiceError> {
        self.rooms
            .get(room)
            .map(|state| state.metadata.clone())
            .ok_or_else(|| ServiceError::RoomNotFound(room.clone()))
    }

    async fn update_room_metadata(
        &self,
        room: &RoomId,
        metadata: String,
    ) -> Result<(), ServiceError> {
        let mut state = self
            .rooms
            .get_mut(room)
            .ok_or_else(|| ServiceError::RoomNotFound(room.clone()))?;
        state.metadata = Some(metadata);
        Ok(())
    }
}
