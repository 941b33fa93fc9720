use dashmap::DashMap;
use limelight_core::{Identity, RoomId};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Holder {
    room: RoomId,
    identity: Identity,
}

/// Opaque bearer credentials handed out at admission.
///
/// A credential only ever resolves to the identity it was issued for, and
/// only inside the room it was issued for.
#[derive(Clone, Default)]
pub struct CredentialStore {
    issued: Arc<DashMap<String, Holder>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, room: &RoomId, identity: &Identity) -> String {
        let credential = Uuid::new_v4().simple().to_string();
        self.issued.insert(
            credential.clone(),
            Holder {
                room: room.clone(),
                identity: identity.clone(),
            },
        );
        debug!("Issued credential for {} in room {}", identity, room);
        credential
    }

    pub fn resolve(&self, room: &RoomId, credential: &str) -> Option<Identity> {
        let holder = self.issued.get(credential)?;
        (&holder.room == room).then(|| holder.identity.clone())
    }
}
