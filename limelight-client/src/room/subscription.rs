use limelight_core::Identity;
use std::cell::RefCell;
use std::rc::Weak;
use tracing::debug;

use crate::room::handle::RoomInner;

pub(crate) type ListenerId = u64;

#[derive(Debug, Clone)]
pub(crate) enum ListenerSlot {
    Room(ListenerId),
    Metadata(Identity, ListenerId),
}

/// Detaches its listener when dropped.
///
/// Holds the room weakly: a subscription outliving its room is a no-op on drop.
#[must_use = "dropping a subscription detaches its listener"]
pub struct Subscription {
    room: Weak<RefCell<RoomInner>>,
    slot: ListenerSlot,
}

impl Subscription {
    pub(crate) fn new(room: Weak<RefCell<RoomInner>>, slot: ListenerSlot) -> Self {
        Self { room, slot }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(room) = self.room.upgrade() else {
            return;
        };
        match room.try_borrow_mut() {
            Ok(mut inner) => inner.remove_listener(&self.slot),
            Err(_) => debug!("Room busy while detaching {:?}", self.slot),
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("slot", &self.slot)
            .finish()
    }
}
