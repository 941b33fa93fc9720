use async_trait::async_trait;
use limelight_client::StageGateway;
use limelight_core::{Identity, MetadataPatch, ParticipantMetadata, RoomId, StageError};
use limelight_server::{StageChangeRequest, StageService};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tokio::sync::Notify;

/// Sends stage changes straight into a server-side [`StageService`].
pub struct ServiceGateway {
    service: StageService,
}

impl ServiceGateway {
    pub fn new(service: StageService) -> Rc<Self> {
        Rc::new(Self { service })
    }
}

#[async_trait(?Send)]
impl StageGateway for ServiceGateway {
    async fn set_stage(
        &self,
        room: &RoomId,
        caller: &Identity,
        target: &Identity,
        on_stage: bool,
    ) -> Result<ParticipantMetadata, StageError> {
        self.service
            .change_stage(StageChangeRequest {
                room: room.clone(),
                caller: caller.clone(),
                target: target.clone(),
                on_stage,
            })
            .await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayCall {
    pub caller: Identity,
    pub target: Identity,
    pub on_stage: bool,
}

/// Records calls and answers from a script. With a gate, every call waits
/// for [`ScriptedGateway::release`] before answering.
#[derive(Default)]
pub struct ScriptedGateway {
    calls: RefCell<Vec<GatewayCall>>,
    responses: RefCell<VecDeque<Result<(), StageError>>>,
    gate: Option<Notify>,
}

impl ScriptedGateway {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn gated() -> Rc<Self> {
        Rc::new(Self {
            gate: Some(Notify::new()),
            ..Self::default()
        })
    }

    pub fn respond_with(&self, response: Result<(), StageError>) {
        self.responses.borrow_mut().push_back(response);
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.borrow().clone()
    }
}

#[async_trait(?Send)]
impl StageGateway for ScriptedGateway {
    async fn set_stage(
        &self,
        _room: &RoomId,
        caller: &Identity,
        target: &Identity,
        on_stage: bool,
    ) -> Result<ParticipantMetadata, StageError> {
        self.calls.borrow_mut().push(GatewayCall {
            caller: caller.clone(),
            target: target.clone(),
            on_stage,
        });

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let response = self.responses.borrow_mut().pop_front().unwrap_or(Ok(()));
        response.map(|()| ParticipantMetadata::default().merge(&MetadataPatch::stage(on_stage)))
    }
}
