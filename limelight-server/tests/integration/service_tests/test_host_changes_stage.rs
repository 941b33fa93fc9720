use limelight_core::{ParticipantSnapshot, RoomId};
use limelight_server::{HostRegistry, RoomService, StageChangeRequest};
use std::sync::Arc;

use crate::integration::{create_test_service, init_tracing};
use crate::utils::{GUEST, HOST, stored_metadata, test_config};

fn request(room: &RoomId, caller: &str, target: &str, on_stage: bool) -> StageChangeRequest {
    StageChangeRequest {
        room: room.clone(),
        caller: caller.into(),
        target: target.into(),
        on_stage,
    }
}

#[tokio::test]
async fn test_host_promotes_and_demotes_guest() {
    init_tracing();

    let room = RoomId::from("studio");
    let (service, scripted) = create_test_service(&room, test_config());

    let promoted = service
        .change_stage(request(&room, HOST, GUEST, true))
        .await
        .unwrap();
    assert!(promoted.on_stage());
    assert!(stored_metadata(scripted.room(), &room, GUEST).on_stage());

    let demoted = service
        .change_stage(request(&room, HOST, GUEST, false))
        .await
        .unwrap();
    assert!(!demoted.on_stage());
    assert!(!demoted.is_host());
    assert_eq!(scripted.accepted_writes().await, 2);
}

#[tokio::test]
async fn test_recorded_room_host_is_authorized_without_flag() {
    init_tracing();

    let room = RoomId::from("studio");
    let (service, scripted) = create_test_service(&room, test_config());
    scripted
        .room()
        .join(&room, ParticipantSnapshot::new("owner", "Olu"));
    HostRegistry::new(Arc::new(scripted.clone()))
        .claim_if_empty(&room, &"owner".into())
        .await
        .unwrap();

    assert!(service.is_host(&room, &"owner".into()).await);
    service
        .change_stage(request(&room, "owner", GUEST, true))
        .await
        .unwrap();

    assert!(stored_metadata(scripted.room(), &room, GUEST).on_stage());
    assert!(scripted.room_metadata(&room).await.unwrap().is_some());
}
