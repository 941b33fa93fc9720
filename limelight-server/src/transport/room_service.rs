use async_trait::async_trait;
use limelight_core::{Identity, RoomId};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// The room has not been materialized yet (or never will be).
    #[error("requested room does not exist: {0}")]
    RoomNotFound(RoomId),

    #[error("participant {identity} is not in room {room}")]
    ParticipantNotFound { room: RoomId, identity: Identity },

    #[error("{0}")]
    Other(String),
}

/// Participant as the transport's server API reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRecord {
    pub identity: Identity,
    pub display_name: String,
    /// Raw metadata blob.
    pub metadata: String,
}

/// Privileged server-side API of the real-time transport.
///
/// Implementations talk to the media server that owns rooms and participant
/// metadata. Writing metadata here is the only way it changes; the transport
/// fans every write out to all room members.
#[async_trait]
pub trait RoomService: Send + Sync {
    async fn get_participant(
        &self,
        room: &RoomId,
        identity: &Identity,
    ) -> Result<ParticipantRecord, ServiceError>;

    /// Replaces the stored blob. Callers merge first.
    async fn update_participant_metadata(
        &self,
        room: &RoomId,
        identity: &Identity,
        metadata: String,
    ) -> Result<(), ServiceError>;

    /// Room-level metadata blob. `Ok(None)` when the room exists without metadata.
    async fn room_metadata(&self, room: &RoomId) -> Result<Option<String>, ServiceError>;

    async fn update_room_metadata(&self, room: &RoomId, metadata: String)
    -> Result<(), ServiceError>;
}
