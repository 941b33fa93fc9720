use serde::{Deserialize, Serialize};

use crate::model::identity::Identity;
use crate::model::media::{PublicationState, TrackSource};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackPublicationInfo {
    pub source: TrackSource,
    pub state: PublicationState,
}

/// Participant as announced by the transport on join.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParticipantSnapshot {
    pub identity: Identity,
    pub display_name: String,
    /// Raw metadata blob, possibly empty or malformed.
    pub metadata: String,
    #[serde(default)]
    pub publications: Vec<TrackPublicationInfo>,
}

impl ParticipantSnapshot {
    pub fn new(identity: impl Into<Identity>, display_name: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            display_name: display_name.into(),
            metadata: String::new(),
            publications: Vec::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = metadata.into();
        self
    }

    pub fn with_publication(mut self, source: TrackSource, state: PublicationState) -> Self {
        self.publications.push(TrackPublicationInfo { source, state });
        self
    }
}

/// Events the transport delivers to every member of a room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "d")]
pub enum RoomEvent {
    ParticipantConnected(ParticipantSnapshot),
    ParticipantMetadataChanged {
        identity: Identity,
        metadata: String,
    },
    ParticipantNameChanged {
        identity: Identity,
        display_name: String,
    },
    ParticipantDisconnected {
        identity: Identity,
    },
    /// A publication appeared or changed state (mute, subscription).
    TrackPublished {
        identity: Identity,
        source: TrackSource,
        state: PublicationState,
    },
    TrackUnpublished {
        identity: Identity,
        source: TrackSource,
    },
}

impl RoomEvent {
    /// Participant the event is about.
    pub fn identity(&self) -> &Identity {
        match self {
            Self::ParticipantConnected(snapshot) => &snapshot.identity,
            Self::ParticipantMetadataChanged { identity, .. }
            | Self::ParticipantNameChanged { identity, .. }
            | Self::ParticipantDisconnected { identity }
            | Self::TrackPublished { identity, .. }
            | Self::TrackUnpublished { identity, .. } => identity,
        }
    }
}
