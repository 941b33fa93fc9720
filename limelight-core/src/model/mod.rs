mod event;
mod identity;
mod media;
mod metadata;
mod request;
mod room;

pub use event::{ParticipantSnapshot, RoomEvent, TrackPublicationInfo};
pub use identity::Identity;
pub use media::{MediaCapabilities, PublicationState, TrackSource};
pub use metadata::{IS_HOST_KEY, MetadataPatch, ON_STAGE_KEY, ParticipantMetadata};
pub use request::RequestId;
pub use room::RoomId;
