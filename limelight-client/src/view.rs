use limelight_core::{Layout, LayoutController, LayoutMode, StageMember};
use std::cell::RefCell;
use std::rc::Rc;

use crate::room::{RoomHandle, Subscription};
use crate::stage::MembershipObserver;

/// Stage members and their layout for one room.
///
/// Any room event re-checks screen shares on stage, so the grid to sidebar
/// nudge fires on track and membership changes alike. `layout()` is
/// recomputed from the room on every call.
pub struct StageView {
    room: RoomHandle,
    observer: Rc<MembershipObserver>,
    controller: Rc<RefCell<LayoutController>>,
    _room_sub: Subscription,
}

impl StageView {
    pub fn attach(room: &RoomHandle, mode: LayoutMode) -> Self {
        let observer = Rc::new(MembershipObserver::attach(room));
        let controller = Rc::new(RefCell::new(LayoutController::new(mode)));
        controller
            .borrow_mut()
            .observe(&stage_members(room, &observer));

        let weak_observer = Rc::downgrade(&observer);
        let weak_controller = Rc::downgrade(&controller);
        let handle = room.clone();
        let room_sub = room.on_event(move |_| {
            let (Some(observer), Some(controller)) =
                (weak_observer.upgrade(), weak_controller.upgrade())
            else {
                return;
            };
            let members = stage_members(&handle, &observer);
            controller.borrow_mut().observe(&members);
        });

        Self {
            room: room.clone(),
            observer,
            controller,
            _room_sub: room_sub,
        }
    }

    pub fn observer(&self) -> &MembershipObserver {
        &self.observer
    }

    /// Stage members in join order with their current capabilities.
    pub fn stage_members(&self) -> Vec<StageMember> {
        stage_members(&self.room, &self.observer)
    }

    pub fn mode(&self) -> LayoutMode {
        self.controller.borrow().mode()
    }

    pub fn set_mode(&self, mode: LayoutMode) {
        self.controller.borrow_mut().set_mode(mode);
    }

    pub fn layout(&self) -> Layout {
        self.controller.borrow().layout(&self.stage_members())
    }
}

fn stage_members(room: &RoomHandle, observer: &MembershipObserver) -> Vec<StageMember> {
    observer
        .stage_members()
        .into_iter()
        .map(|identity| {
            let capabilities = room.capabilities(&identity);
            StageMember {
                identity,
                capabilities,
            }
        })
        .collect()
}
