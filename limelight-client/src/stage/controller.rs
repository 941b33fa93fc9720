use limelight_core::{Identity, ParticipantMetadata, StageError};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, info, warn};

use crate::gateway::StageGateway;
use crate::room::RoomHandle;

/// Per-identity progress of a stage request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ActionState {
    #[default]
    Idle,
    Pending,
    Errored(StageError),
}

impl ActionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// What became of a call that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum StageAction {
    Applied(ParticipantMetadata),
    /// A request for the same identity was still in flight; nothing was sent.
    AlreadyPending,
    /// The response arrived after teardown and was dropped.
    Discarded,
}

struct ControllerInner {
    states: HashMap<Identity, ActionState>,
    /// Value the self toggle shows while its own request is in flight.
    self_override: Option<bool>,
    torn_down: bool,
}

/// Host promote/demote and the local self toggle.
///
/// Requests go through a [`StageGateway`]; the resulting metadata reaches
/// every client through the room, not through this controller.
pub struct StageController {
    room: Option<RoomHandle>,
    gateway: Rc<dyn StageGateway>,
    allow_self_stage: bool,
    inner: Rc<RefCell<ControllerInner>>,
}

impl StageController {
    pub fn new(room: Option<RoomHandle>, gateway: Rc<dyn StageGateway>) -> Self {
        Self {
            room,
            gateway,
            allow_self_stage: false,
            inner: Rc::new(RefCell::new(ControllerInner {
                states: HashMap::new(),
                self_override: None,
                torn_down: false,
            })),
        }
    }

    /// Lets non-hosts use the self toggle. The server still decides.
    pub fn with_self_stage(mut self, allowed: bool) -> Self {
        self.allow_self_stage = allowed;
        self
    }

    pub fn is_host(&self) -> bool {
        self.room
            .as_ref()
            .is_some_and(|r| r.local_metadata().is_host())
    }

    pub fn state(&self, identity: &Identity) -> ActionState {
        self.inner
            .borrow()
            .states
            .get(identity)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_pending(&self, identity: &Identity) -> bool {
        self.state(identity).is_pending()
    }

    /// Displayed value of the self toggle: the requested value while a self
    /// request is in flight, otherwise the local participant's own metadata.
    pub fn self_on_stage(&self) -> bool {
        if let Some(requested) = self.inner.borrow().self_override {
            return requested;
        }
        self.room
            .as_ref()
            .is_some_and(|r| r.local_metadata().on_stage())
    }

    pub async fn promote(&self, target: &Identity) -> Result<StageAction, StageError> {
        self.host_change(target, true).await
    }

    pub async fn demote(&self, target: &Identity) -> Result<StageAction, StageError> {
        self.host_change(target, false).await
    }

    /// Flips the local participant. The toggle shows `next` until the
    /// request settles, then follows the room again.
    pub async fn set_self_stage(&self, next: bool) -> Result<StageAction, StageError> {
        let room = self.room.as_ref().ok_or(StageError::NoRoom)?;
        let local = room.local_identity();
        if !self.allow_self_stage && !self.is_host() {
            return Err(StageError::Unauthorized { caller: local });
        }
        if self.is_pending(&local) {
            debug!("Self stage request for {} already pending", local);
            return Ok(StageAction::AlreadyPending);
        }

        self.inner.borrow_mut().self_override = Some(next);
        let result = self.send(&local, next).await;
        self.inner.borrow_mut().self_override = None;
        result
    }

    /// Responses arriving after this are ignored.
    pub fn teardown(&self) {
        self.inner.borrow_mut().torn_down = true;
    }

    async fn host_change(
        &self,
        target: &Identity,
        on_stage: bool,
    ) -> Result<StageAction, StageError> {
        let room = self.room.as_ref().ok_or(StageError::NoRoom)?;
        if !self.is_host() {
            return Err(StageError::Unauthorized {
                caller: room.local_identity(),
            });
        }
        self.send(target, on_stage).await
    }

    async fn send(&self, target: &Identity, on_stage: bool) -> Result<StageAction, StageError> {
        let room = self.room.as_ref().ok_or(StageError::NoRoom)?;

        {
            let mut inner = self.inner.borrow_mut();
            if inner.torn_down {
                return Ok(StageAction::Discarded);
            }
            let state = inner.states.entry(target.clone()).or_default();
            if state.is_pending() {
                debug!("Stage request for {} already pending", target);
                return Ok(StageAction::AlreadyPending);
            }
            *state = ActionState::Pending;
        }

        let result = self
            .gateway
            .set_stage(&room.room_id(), &room.local_identity(), target, on_stage)
            .await;

        let mut inner = self.inner.borrow_mut();
        if inner.torn_down {
            debug!("Dropping stage response for {} after teardown", target);
            return Ok(StageAction::Discarded);
        }

        match result {
            Ok(metadata) => {
                info!(
                    "{} is now {}",
                    target,
                    if on_stage { "on stage" } else { "backstage" }
                );
                inner.states.insert(target.clone(), ActionState::Idle);
                Ok(StageAction::Applied(metadata))
            }
            Err(e) => {
                warn!("Stage change for {} failed: {}", target, e);
                inner
                    .states
                    .insert(target.clone(), ActionState::Errored(e.clone()));
                Err(e)
            }
        }
    }
}
