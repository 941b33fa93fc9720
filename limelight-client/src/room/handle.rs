use limelight_core::{
    Identity, MediaCapabilities, ParticipantMetadata, ParticipantSnapshot, PublicationState,
    RoomEvent, RoomId, TrackSource,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, info};

use crate::room::subscription::{ListenerId, ListenerSlot, Subscription};

pub type EventListener = Rc<dyn Fn(&RoomEvent)>;
pub type MetadataListener = Rc<dyn Fn(&Identity, &str)>;

/// A participant as this client currently sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantView {
    pub identity: Identity,
    pub display_name: String,
    pub metadata: String,
    pub is_local: bool,
}

impl ParticipantView {
    pub fn parsed_metadata(&self) -> ParticipantMetadata {
        ParticipantMetadata::parse_or_default(Some(&self.metadata))
    }
}

struct ParticipantEntry {
    view: ParticipantView,
    publications: HashMap<TrackSource, PublicationState>,
    /// Released together with the entry.
    metadata_listeners: Vec<(ListenerId, MetadataListener)>,
}

impl ParticipantEntry {
    fn from_snapshot(snapshot: ParticipantSnapshot, is_local: bool) -> Self {
        Self {
            publications: snapshot
                .publications
                .iter()
                .map(|p| (p.source, p.state))
                .collect(),
            view: ParticipantView {
                identity: snapshot.identity,
                display_name: snapshot.display_name,
                metadata: snapshot.metadata,
                is_local,
            },
            metadata_listeners: Vec::new(),
        }
    }
}

pub(crate) struct RoomInner {
    room: RoomId,
    local: Identity,
    /// Join order.
    participants: Vec<ParticipantEntry>,
    listeners: Vec<(ListenerId, EventListener)>,
    next_listener: ListenerId,
}

impl RoomInner {
    fn entry(&self, identity: &Identity) -> Option<&ParticipantEntry> {
        self.participants.iter().find(|p| &p.view.identity == identity)
    }

    fn entry_mut(&mut self, identity: &Identity) -> Option<&mut ParticipantEntry> {
        self.participants
            .iter_mut()
            .find(|p| &p.view.identity == identity)
    }

    fn next_id(&mut self) -> ListenerId {
        self.next_listener += 1;
        self.next_listener
    }

    pub(crate) fn remove_listener(&mut self, slot: &ListenerSlot) {
        match slot {
            ListenerSlot::Room(id) => self.listeners.retain(|(lid, _)| lid != id),
            ListenerSlot::Metadata(identity, id) => {
                if let Some(entry) = self.entry_mut(identity) {
                    entry.metadata_listeners.retain(|(lid, _)| lid != id);
                }
            }
        }
    }
}

/// Explicit handle on a connected room.
///
/// Owns the client's view of participants in join order together with their
/// metadata and publications. The transport feeds it through [`RoomHandle::dispatch`];
/// components attach listeners and get a [`Subscription`] back.
#[derive(Clone)]
pub struct RoomHandle {
    inner: Rc<RefCell<RoomInner>>,
}

impl RoomHandle {
    pub fn new(room: RoomId, local: ParticipantSnapshot) -> Self {
        Self::with_participants(room, local.identity.clone(), vec![local])
    }

    /// Handle for a room joined with `participants` already present.
    /// `local` is added at the end when the list does not contain it.
    pub fn with_participants(
        room: RoomId,
        local: Identity,
        participants: Vec<ParticipantSnapshot>,
    ) -> Self {
        let mut entries: Vec<ParticipantEntry> = participants
            .into_iter()
            .map(|snapshot| {
                let is_local = snapshot.identity == local;
                ParticipantEntry::from_snapshot(snapshot, is_local)
            })
            .collect();
        if !entries.iter().any(|e| e.view.is_local) {
            entries.push(ParticipantEntry::from_snapshot(
                ParticipantSnapshot::new(local.clone(), String::new()),
                true,
            ));
        }

        info!("Attached to room {} as {}", room, local);

        Self {
            inner: Rc::new(RefCell::new(RoomInner {
                room,
                local,
                participants: entries,
                listeners: Vec::new(),
                next_listener: 0,
            })),
        }
    }

    pub fn room_id(&self) -> RoomId {
        self.inner.borrow().room.clone()
    }

    pub fn local_identity(&self) -> Identity {
        self.inner.borrow().local.clone()
    }

    pub fn local_metadata(&self) -> ParticipantMetadata {
        let local = self.local_identity();
        self.participant(&local)
            .map(|p| p.parsed_metadata())
            .unwrap_or_default()
    }

    /// All participants, local included, in join order.
    pub fn participants(&self) -> Vec<ParticipantView> {
        self.inner
            .borrow()
            .participants
            .iter()
            .map(|p| p.view.clone())
            .collect()
    }

    pub fn remote_participants(&self) -> Vec<ParticipantView> {
        self.participants()
            .into_iter()
            .filter(|p| !p.is_local)
            .collect()
    }

    pub fn participant(&self, identity: &Identity) -> Option<ParticipantView> {
        self.inner.borrow().entry(identity).map(|p| p.view.clone())
    }

    pub fn track_publication(
        &self,
        identity: &Identity,
        source: TrackSource,
    ) -> Option<PublicationState> {
        self.inner
            .borrow()
            .entry(identity)
            .and_then(|p| p.publications.get(&source).copied())
    }

    pub fn capabilities(&self, identity: &Identity) -> MediaCapabilities {
        MediaCapabilities::from_publications(|source| self.track_publication(identity, source))
    }

    /// Listener for every event the room applies. Unknown participants' events are dropped first.
    pub fn on_event<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&RoomEvent) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id();
        inner.listeners.push((id, Rc::new(listener)));
        Subscription::new(Rc::downgrade(&self.inner), ListenerSlot::Room(id))
    }

    /// Metadata listener bound to one participant. `None` when it is not in the room.
    pub fn on_metadata<F>(&self, identity: &Identity, listener: F) -> Option<Subscription>
    where
        F: Fn(&Identity, &str) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id();
        let entry = inner.entry_mut(identity)?;
        entry.metadata_listeners.push((id, Rc::new(listener)));
        Some(Subscription::new(
            Rc::downgrade(&self.inner),
            ListenerSlot::Metadata(identity.clone(), id),
        ))
    }

    /// Applies a transport event, then notifies listeners.
    ///
    /// Per-participant metadata listeners run before room listeners. No borrow
    /// is held while listeners run, so they may read the handle.
    pub fn dispatch(&self, event: RoomEvent) {
        let metadata_listeners = match self.apply(&event) {
            Some(listeners) => listeners,
            None => {
                debug!("Ignoring {:?} for unknown participant", event);
                return;
            }
        };

        if let RoomEvent::ParticipantMetadataChanged { identity, metadata } = &event {
            for listener in metadata_listeners {
                listener(identity, metadata);
            }
        }

        let listeners: Vec<EventListener> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(&event);
        }
    }

    /// Mutates state. `None` when the event refers to nobody in the room.
    fn apply(&self, event: &RoomEvent) -> Option<Vec<MetadataListener>> {
        let mut inner = self.inner.borrow_mut();

        match event {
            RoomEvent::ParticipantConnected(snapshot) => {
                let is_local = snapshot.identity == inner.local;
                inner
                    .participants
                    .retain(|p| p.view.identity != snapshot.identity);
                inner
                    .participants
                    .push(ParticipantEntry::from_snapshot(snapshot.clone(), is_local));
                Some(Vec::new())
            }
            RoomEvent::ParticipantMetadataChanged { identity, metadata } => {
                let entry = inner.entry_mut(identity)?;
                entry.view.metadata = metadata.clone();
                Some(
                    entry
                        .metadata_listeners
                        .iter()
                        .map(|(_, l)| l.clone())
                        .collect(),
                )
            }
            RoomEvent::ParticipantNameChanged {
                identity,
                display_name,
            } => {
                inner.entry_mut(identity)?.view.display_name = display_name.clone();
                Some(Vec::new())
            }
            RoomEvent::ParticipantDisconnected { identity } => {
                let index = inner
                    .participants
                    .iter()
                    .position(|p| &p.view.identity == identity)?;
                // Dropping the entry drops its metadata listeners.
                inner.participants.remove(index);
                Some(Vec::new())
            }
            RoomEvent::TrackPublished {
                identity,
                source,
                state,
            } => {
                inner.entry_mut(identity)?.publications.insert(*source, *state);
                Some(Vec::new())
            }
            RoomEvent::TrackUnpublished { identity, source } => {
                inner.entry_mut(identity)?.publications.remove(source);
                Some(Vec::new())
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn listener_count(&self) -> usize {
        let inner = self.inner.borrow();
        inner.listeners.len()
            + inner
                .participants
                .iter()
                .map(|p| p.metadata_listeners.len())
                .sum::<usize>()
    }
}
