use limelight_core::{Identity, ParticipantMetadata, RoomEvent};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};
use tokio::sync::watch;
use tracing::debug;

use crate::room::{RoomHandle, Subscription};

struct ObserverState {
    on_stage: HashSet<Identity>,
    participant_subs: HashMap<Identity, Subscription>,
    version: watch::Sender<u64>,
}

impl ObserverState {
    fn apply(&mut self, identity: &Identity, raw: &str) {
        let on_stage = ParticipantMetadata::parse_or_default(Some(raw)).on_stage();
        if on_stage {
            self.on_stage.insert(identity.clone());
        } else {
            self.on_stage.remove(identity);
        }
        self.bump();
    }

    fn forget(&mut self, identity: &Identity) {
        self.participant_subs.remove(identity);
        if self.on_stage.remove(identity) {
            self.bump();
        }
    }

    fn bump(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

/// Derives who is on stage from participant metadata.
///
/// Every participant present at attach time, and every late joiner, gets a
/// metadata listener. Each metadata event re-derives that one participant's
/// flag and bumps `version`. Dropping the observer detaches everything.
pub struct MembershipObserver {
    room: RoomHandle,
    state: Rc<RefCell<ObserverState>>,
    _room_sub: Subscription,
}

impl MembershipObserver {
    pub fn attach(room: &RoomHandle) -> Self {
        let (version, _) = watch::channel(0);
        let state = Rc::new(RefCell::new(ObserverState {
            on_stage: HashSet::new(),
            participant_subs: HashMap::new(),
            version,
        }));

        for participant in room.participants() {
            track_participant(room, &state, &participant.identity, &participant.metadata);
        }

        let weak = Rc::downgrade(&state);
        let handle = room.clone();
        let room_sub = room.on_event(move |event| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            match event {
                RoomEvent::ParticipantConnected(snapshot) => {
                    track_participant(&handle, &state, &snapshot.identity, &snapshot.metadata);
                }
                RoomEvent::ParticipantDisconnected { identity } => {
                    state.borrow_mut().forget(identity);
                }
                _ => {}
            }
        });

        Self {
            room: room.clone(),
            state,
            _room_sub: room_sub,
        }
    }

    /// Stage members in join order.
    pub fn stage_members(&self) -> Vec<Identity> {
        let state = self.state.borrow();
        self.room
            .participants()
            .into_iter()
            .map(|p| p.identity)
            .filter(|identity| state.on_stage.contains(identity))
            .collect()
    }

    pub fn is_on_stage(&self, identity: &Identity) -> bool {
        self.state.borrow().on_stage.contains(identity)
    }

    pub fn version(&self) -> u64 {
        let state = self.state.borrow();
        let version = *state.version.borrow();
        version
    }

    /// Receiver that changes whenever the stage set is re-derived.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.state.borrow().version.subscribe()
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.state.borrow().participant_subs.len()
    }
}

fn track_participant(
    room: &RoomHandle,
    state: &Rc<RefCell<ObserverState>>,
    identity: &Identity,
    metadata: &str,
) {
    let weak: Weak<RefCell<ObserverState>> = Rc::downgrade(state);
    let Some(sub) = room.on_metadata(identity, move |identity, raw| {
        if let Some(state) = weak.upgrade() {
            state.borrow_mut().apply(identity, raw);
        }
    }) else {
        debug!("{} left before its listener attached", identity);
        return;
    };

    let mut state = state.borrow_mut();
    state.participant_subs.insert(identity.clone(), sub);
    state.apply(identity, metadata);
}
