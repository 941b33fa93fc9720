use limelight_client::{MembershipObserver, StageController};
use limelight_core::{RoomId, StageError};

use crate::integration::{GUEST, HOST, create_test_room, init_tracing};
use crate::utils::{ScriptedGateway, ServiceGateway, TestClient};

#[tokio::test]
async fn test_failed_self_toggle_reverts() {
    init_tracing();

    let room = RoomId::from("panel");
    let (service, _stage) = create_test_room(&room);
    let host = TestClient::connect(&service, &room, HOST);

    let gateway = ScriptedGateway::new();
    gateway.respond_with(Err(StageError::RoomNotReady {
        room: room.clone(),
        attempts: 5,
    }));
    let controller = StageController::new(Some(host.handle.clone()), gateway.clone());
    assert!(controller.self_on_stage());

    let err = controller.set_self_stage(false).await.unwrap_err();

    assert!(matches!(err, StageError::RoomNotReady { attempts: 5, .. }));
    assert!(controller.self_on_stage());
    assert_eq!(gateway.calls()[0].target.as_str(), HOST);
}

#[tokio::test]
async fn test_guest_self_toggle_rejected_by_server() {
    init_tracing();

    let room = RoomId::from("panel");
    let (service, stage) = create_test_room(&room);
    let mut guest = TestClient::connect(&service, &room, GUEST);
    let observer = MembershipObserver::attach(&guest.handle);

    // The client offers the toggle, the server's default policy still refuses it.
    let controller = StageController::new(Some(guest.handle.clone()), ServiceGateway::new(stage))
        .with_self_stage(true);

    let err = controller.set_self_stage(true).await.unwrap_err();
    guest.pump();

    assert_eq!(
        err,
        StageError::Unauthorized {
            caller: GUEST.into()
        }
    );
    assert!(!controller.self_on_stage());
    assert!(!observer.is_on_stage(&GUEST.into()));
    assert_eq!(service.metadata_writes(), 0);
}

#[tokio::test]
async fn test_host_self_toggle_round_trip() {
    init_tracing();

    let room = RoomId::from("panel");
    let (service, stage) = create_test_room(&room);
    let mut host = TestClient::connect(&service, &room, HOST);
    let observer = MembershipObserver::attach(&host.handle);
    let controller = StageController::new(Some(host.handle.clone()), ServiceGateway::new(stage));

    controller.set_self_stage(false).await.unwrap();
    host.pump();

    assert!(!controller.self_on_stage());
    assert!(!observer.is_on_stage(&HOST.into()));
    assert!(host.handle.local_metadata().is_host());
}

#[tokio::test]
async fn test_self_toggle_follows_promotion_by_host() {
    init_tracing();

    let room = RoomId::from("panel");
    let (service, stage) = create_test_room(&room);
    let mut host = TestClient::connect(&service, &room, HOST);
    let mut guest = TestClient::connect(&service, &room, GUEST);
    let host_controller =
        StageController::new(Some(host.handle.clone()), ServiceGateway::new(stage.clone()));
    let guest_controller =
        StageController::new(Some(guest.handle.clone()), ServiceGateway::new(stage))
            .with_self_stage(true);
    assert!(!guest_controller.self_on_stage());

    host_controller.promote(&GUEST.into()).await.unwrap();
    host.pump();
    guest.pump();
    assert!(guest_controller.self_on_stage());

    host_controller.demote(&GUEST.into()).await.unwrap();
    guest.pump();
    assert!(!guest_controller.self_on_stage());
}

#[tokio::test]
async fn test_self_toggle_shows_request_while_pending() {
    init_tracing();

    let room = RoomId::from("panel");
    let (service, _stage) = create_test_room(&room);
    let host = TestClient::connect(&service, &room, HOST);
    let gateway = ScriptedGateway::gated();
    let controller = StageController::new(Some(host.handle.clone()), gateway.clone());
    assert!(controller.self_on_stage());

    let (result, ()) = futures::join!(controller.set_self_stage(false), async {
        assert!(!controller.self_on_stage());
        gateway.release();
    });

    // Nothing reached the room, so the toggle falls back to the local metadata.
    assert!(result.is_ok());
    assert!(controller.self_on_stage());
    assert_eq!(gateway.calls().len(), 1);
}
