use limelight_core::{ParticipantMetadata, ParticipantSnapshot, RoomId};
use limelight_server::{InMemoryRoomService, RetryPolicy, StageConfig};
use std::time::Duration;

pub const HOST: &str = "host";
pub const GUEST: &str = "guest";

/// Config with a short retry schedule: 5 attempts, 10ms base.
pub fn test_config() -> StageConfig {
    StageConfig {
        retry: RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(10),
        },
        ..StageConfig::default()
    }
}

/// Room with an admitted host and an admitted guest, in that join order.
pub fn seed_room(service: &InMemoryRoomService, room: &RoomId) {
    service.join(
        room,
        ParticipantSnapshot::new(HOST, "Hana")
            .with_metadata(ParticipantMetadata::admitted(true).encode()),
    );
    service.join(
        room,
        ParticipantSnapshot::new(GUEST, "Gil")
            .with_metadata(ParticipantMetadata::admitted(false).encode()),
    );
}

pub fn stored_metadata(
    service: &InMemoryRoomService,
    room: &RoomId,
    identity: &str,
) -> ParticipantMetadata {
    ParticipantMetadata::parse_or_default(service.metadata_of(room, &identity.into()).as_deref())
}
