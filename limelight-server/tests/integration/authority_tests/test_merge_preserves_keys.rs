use limelight_core::{ParticipantSnapshot, RoomId};
use serde_json::json;

use crate::integration::{create_test_authority, init_tracing};
use crate::utils::{HOST, stored_metadata};

#[tokio::test]
async fn test_demoting_host_keeps_is_host_and_unknown_keys() {
    init_tracing();

    let room = RoomId::from("studio");
    let (authority, scripted) = create_test_authority(&room);
    scripted.room().join(
        &room,
        ParticipantSnapshot::new("speaker", "Sam").with_metadata(
            r#"{"isHost":true,"onStage":true,"avatar":{"hue":210},"handRaised":false}"#,
        ),
    );

    let updated = authority
        .set_stage_membership(&room, &"speaker".into(), false)
        .await
        .unwrap();

    assert!(!updated.on_stage());
    assert!(updated.is_host());
    let stored = stored_metadata(scripted.room(), &room, "speaker");
    assert_eq!(stored, updated);
    assert_eq!(stored.get("avatar"), Some(json!({"hue": 210})));
    assert_eq!(stored.get("handRaised"), Some(json!(false)));
}

#[tokio::test]
async fn test_promote_twice_is_idempotent() {
    init_tracing();

    let room = RoomId::from("studio");
    let (authority, scripted) = create_test_authority(&room);

    let first = authority
        .set_stage_membership(&room, &HOST.into(), true)
        .await
        .unwrap();
    let second = authority
        .set_stage_membership(&room, &HOST.into(), true)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.encode(), r#"{"isHost":true,"onStage":true}"#);
    assert_eq!(stored_metadata(scripted.room(), &room, HOST), second);
}
