
use limelight_core::RoomId;
use limelight_server::{InMemoryRoomService, RetryPolicy, StageConfig, StageService};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

use crate::utils::join_admitted;

pub const HOST: &str = "host";
pub const GUEST: &str = "guest";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Room with a host and a guest, served by an in-memory transport.
pub fn create_test_room(room: &RoomId) -> (InMemoryRoomService, StageService) {
    let service = InMemoryRoomService::new();
    join_admitted(&service, room, HOST, true);
    join_admitted(&service, room, GUEST, false);

    let config = StageConfig {
        retry: RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(10),
        },
        ..StageConfig::default()
    };
    let stage = StageService::new(Arc::new(service.clone()), &config);
    (service, stage)
}
