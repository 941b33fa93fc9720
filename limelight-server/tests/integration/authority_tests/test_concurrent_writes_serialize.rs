use limelight_core::RoomId;
use limelight_server::{InMemoryRoomService, StageAuthority};
use std::sync::Arc;
use std::time::Duration;

use crate::integration::init_tracing;
use crate::utils::{GUEST, ScriptedRoomService, seed_room, stored_metadata, test_config};

#[tokio::test(start_paused = true)]
async fn test_writes_to_one_participant_do_not_interleave() {
    init_tracing();

    let room = RoomId::from("studio");
    let memory = InMemoryRoomService::new();
    seed_room(&memory, &room);
    let scripted = ScriptedRoomService::new(memory).with_read_delay(Duration::from_millis(5));
    let authority = StageAuthority::new(Arc::new(scripted.clone()), test_config().retry);
    let guest = GUEST.into();

    let (promote, demote, promote_again) = futures::join!(
        authority.set_stage_membership(&room, &guest, true),
        authority.set_stage_membership(&room, &guest, false),
        authority.set_stage_membership(&room, &guest, true),
    );

    assert!(promote.is_ok() && demote.is_ok() && promote_again.is_ok());
    assert_eq!(scripted.max_in_flight().await, 1);
    assert_eq!(scripted.accepted_writes().await, 3);
    // The last write to acquire the lock wins.
    let last = scripted.attempts().await.pop().unwrap();
    let stored = stored_metadata(scripted.room(), &room, GUEST);
    assert_eq!(stored.encode(), last.metadata);
}
