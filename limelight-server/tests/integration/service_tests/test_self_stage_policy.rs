use limelight_core::{RoomId, StageError};
use limelight_server::{SelfStagePolicy, StageChangeRequest, StageConfig};

use crate::integration::{create_test_service, init_tracing};
use crate::utils::{GUEST, HOST, stored_metadata, test_config};

fn self_request(room: &RoomId, identity: &str, on_stage: bool) -> StageChangeRequest {
    StageChangeRequest {
        room: room.clone(),
        caller: identity.into(),
        target: identity.into(),
        on_stage,
    }
}

#[tokio::test]
async fn test_guest_self_promotion_is_host_gated_by_default() {
    init_tracing();

    let room = RoomId::from("studio");
    let (service, scripted) = create_test_service(&room, test_config());

    let err = service
        .change_stage(self_request(&room, GUEST, true))
        .await
        .unwrap_err();

    assert!(matches!(err, StageError::Unauthorized { .. }));
    assert!(scripted.attempts().await.is_empty());

    // Hosts may always move themselves.
    service
        .change_stage(self_request(&room, HOST, false))
        .await
        .unwrap();
    assert!(!stored_metadata(scripted.room(), &room, HOST).on_stage());
}

#[tokio::test]
async fn test_open_policy_allows_self_but_not_others() {
    init_tracing();

    let room = RoomId::from("studio");
    let config = StageConfig {
        self_stage: SelfStagePolicy::Anyone,
        ..test_config()
    };
    let (service, scripted) = create_test_service(&room, config);

    service
        .change_stage(self_request(&room, GUEST, true))
        .await
        .unwrap();
    assert!(stored_metadata(scripted.room(), &room, GUEST).on_stage());

    let err = service
        .change_stage(StageChangeRequest {
            room: room.clone(),
            caller: GUEST.into(),
            target: HOST.into(),
            on_stage: false,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StageError::Unauthorized { .. }));
    assert_eq!(scripted.accepted_writes().await, 1);
}
