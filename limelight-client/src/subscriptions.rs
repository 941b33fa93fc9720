use limelight_core::{Identity, ParticipantMetadata, RoomEvent, TrackSource};
use std::rc::Rc;
use tracing::debug;

use crate::room::{RoomHandle, Subscription};

const MANAGED_SOURCES: [TrackSource; 2] = [TrackSource::Camera, TrackSource::ScreenShare];

/// Outbound side of video subscriptions, implemented over the transport.
pub trait TrackSubscriber {
    fn set_subscribed(&self, identity: &Identity, source: TrackSource, subscribed: bool);
}

/// Keeps remote camera and screen-share subscriptions in line with `onStage`.
///
/// Audio is left alone.
pub struct StageSubscriptionManager {
    _room_sub: Subscription,
}

impl StageSubscriptionManager {
    pub fn attach(room: &RoomHandle, subscriber: Rc<dyn TrackSubscriber>) -> Self {
        let local = room.local_identity();

        for participant in room.remote_participants() {
            apply(subscriber.as_ref(), &participant.identity, &participant.metadata);
        }

        let room_sub = room.on_event(move |event| match event {
            RoomEvent::ParticipantConnected(snapshot) if snapshot.identity != local => {
                apply(subscriber.as_ref(), &snapshot.identity, &snapshot.metadata);
            }
            RoomEvent::ParticipantMetadataChanged { identity, metadata } if identity != &local => {
                apply(subscriber.as_ref(), identity, metadata);
            }
            _ => {}
        });

        Self {
            _room_sub: room_sub,
        }
    }
}

fn apply(subscriber: &dyn TrackSubscriber, identity: &Identity, raw: &str) {
    let on_stage = ParticipantMetadata::parse_or_default(Some(raw)).on_stage();
    debug!(
        "{} video for {}",
        if on_stage { "Subscribing" } else { "Unsubscribing" },
        identity
    );
    for source in MANAGED_SOURCES {
        subscriber.set_subscribed(identity, source, on_stage);
    }
}
