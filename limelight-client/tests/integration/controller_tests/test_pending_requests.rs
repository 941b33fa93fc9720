use limelight_client::{ActionState, RoomHandle, StageAction, StageController};
use limelight_core::{Identity, ParticipantMetadata, ParticipantSnapshot, RoomId, StageError};

use crate::integration::{GUEST, HOST, init_tracing};
use crate::utils::ScriptedGateway;

fn host_room() -> RoomHandle {
    RoomHandle::with_participants(
        RoomId::from("panel"),
        HOST.into(),
        vec![
            ParticipantSnapshot::new(HOST, "Hana")
                .with_metadata(ParticipantMetadata::admitted(true).encode()),
            ParticipantSnapshot::new(GUEST, "Gil"),
            ParticipantSnapshot::new("other", "Oz"),
        ],
    )
}

#[tokio::test]
async fn test_duplicate_request_while_pending_is_ignored() {
    init_tracing();

    let gateway = ScriptedGateway::gated();
    let controller = StageController::new(Some(host_room()), gateway.clone());
    let guest: Identity = GUEST.into();

    let (first, second, ()) = futures::join!(
        controller.promote(&guest),
        async {
            assert!(controller.is_pending(&guest));
            controller.promote(&guest).await
        },
        async { gateway.release() },
    );

    assert!(matches!(first, Ok(StageAction::Applied(_))));
    assert_eq!(second, Ok(StageAction::AlreadyPending));
    assert_eq!(gateway.calls().len(), 1);
    assert_eq!(gateway.calls()[0].caller.as_str(), HOST);
    assert_eq!(controller.state(&guest), ActionState::Idle);
}

#[tokio::test]
async fn test_failure_is_reported_for_that_identity_only() {
    init_tracing();

    let gateway = ScriptedGateway::new();
    let failure = StageError::transport("media server unreachable");
    gateway.respond_with(Err(failure.clone()));
    let controller = StageController::new(Some(host_room()), gateway.clone());

    let err = controller.promote(&GUEST.into()).await.unwrap_err();
    assert_eq!(err, failure);
    assert_eq!(
        controller.state(&GUEST.into()),
        ActionState::Errored(failure)
    );
    assert_eq!(controller.state(&"other".into()), ActionState::Idle);

    // No automatic retry; a manual one goes through and clears the error.
    assert_eq!(gateway.calls().len(), 1);
    controller.demote(&GUEST.into()).await.unwrap();
    assert_eq!(gateway.calls().len(), 2);
    assert_eq!(controller.state(&GUEST.into()), ActionState::Idle);
}

#[tokio::test]
async fn test_response_after_teardown_is_discarded() {
    init_tracing();

    let gateway = ScriptedGateway::gated();
    gateway.respond_with(Err(StageError::transport("late")));
    let controller = StageController::new(Some(host_room()), gateway.clone());
    let guest: Identity = GUEST.into();

    let (result, ()) = futures::join!(controller.promote(&guest), async {
        controller.teardown();
        gateway.release();
    });

    assert_eq!(result, Ok(StageAction::Discarded));
    assert!(controller.is_pending(&guest));
}
