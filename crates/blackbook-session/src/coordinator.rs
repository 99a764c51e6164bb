use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::mpsc::{Receiver, Sender, channel};

use tracing::debug;

/// Identifier of the record an editor is bound to. Photo and art ids
/// live in separate coordinators, one per parent view.
pub type RecordId = i64;

/// Notification sent from a child editor to the view that spawned it.
///
/// `Committed` may arrive any number of times before `Closed`; a view
/// re-derives whatever it caches about the record on each one rather
/// than assuming a single commit per session.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionEvent {
    Committed(RecordId),
    Closed(RecordId),
}

/// The child editor's half of the notification channel.
#[derive(Clone, Debug)]
pub struct EditorLink {
    id: RecordId,
    events: Sender<SessionEvent>,
}

impl EditorLink {
    pub fn record_id(&self) -> RecordId {
        self.id
    }

    /// Announce that the editor's staged values have been written to the
    /// record. Call after the record and dirty flag are updated, so the
    /// effects are visible to whatever refresh the event triggers.
    pub fn committed(&self) {
        // A send only fails when the parent view is already gone.
        let _ = self.events.send(SessionEvent::Committed(self.id));
    }

    /// Announce that the editor is closing. The coordinator drops its
    /// registry entry when the event is pumped.
    pub fn closed(&self) {
        let _ = self.events.send(SessionEvent::Closed(self.id));
    }
}

/// An open editor as seen by its coordinator.
pub trait EditorHandle {
    /// Bring an already-open editor to the user's attention instead of
    /// opening a second one.
    fn activate(&mut self);
}

#[derive(Debug, Eq, PartialEq)]
pub enum OpenOutcome {
    /// A new editor was spawned and registered.
    Created,
    /// An editor for the record was already open and has been surfaced.
    Activated,
}

/// Receives relayed events from a coordinator's pump.
pub trait SessionObserver {
    fn editor_committed(&mut self, id: RecordId);
    fn editor_closed(&mut self, id: RecordId);
}

/// Tracks which records currently have an open editor, at most one per
/// record id, and relays their notifications to the owning view.
pub struct SessionCoordinator<H> {
    editors: HashMap<RecordId, H>,
    events: Receiver<SessionEvent>,
    sender: Sender<SessionEvent>,
}

impl<H: EditorHandle> SessionCoordinator<H> {
    pub fn new() -> Self {
        let (sender, events) = channel();
        Self {
            editors: HashMap::new(),
            events,
            sender,
        }
    }

    /// Opens an editor for a record, or surfaces the one already open.
    /// `spawn` receives the link the new editor reports through.
    pub fn open(&mut self, id: RecordId, spawn: impl FnOnce(EditorLink) -> H) -> OpenOutcome {
        match self.editors.entry(id) {
            Entry::Occupied(mut entry) => {
                debug!(record = id, "editor already open, activating");
                entry.get_mut().activate();
                OpenOutcome::Activated
            }
            Entry::Vacant(entry) => {
                let link = EditorLink {
                    id,
                    events: self.sender.clone(),
                };
                entry.insert(spawn(link));
                OpenOutcome::Created
            }
        }
    }

    pub fn editor(&self, id: RecordId) -> Option<&H> {
        self.editors.get(&id)
    }

    pub fn editor_mut(&mut self, id: RecordId) -> Option<&mut H> {
        self.editors.get_mut(&id)
    }

    pub fn is_open(&self, id: RecordId) -> bool {
        self.editors.contains_key(&id)
    }

    pub fn open_count(&self) -> usize {
        self.editors.len()
    }

    /// Whether the owning view may close. Closing cascades downward
    /// only: a parent never forces its children shut.
    pub fn can_close(&self) -> bool {
        self.editors.is_empty()
    }

    /// Drains pending editor notifications, dropping registry entries
    /// for editors that closed, and relays each event to the observer.
    /// Returns how many events were relayed.
    pub fn pump(&mut self, observer: &mut dyn SessionObserver) -> usize {
        let mut relayed = 0;
        while let Ok(event) = self.events.try_recv() {
            match event {
                SessionEvent::Committed(id) => observer.editor_committed(id),
                SessionEvent::Closed(id) => {
                    self.editors.remove(&id);
                    observer.editor_closed(id);
                }
            }
            relayed += 1;
        }
        relayed
    }
}

impl<H: EditorHandle> Default for SessionCoordinator<H> {
    fn default() -> Self {
        Self::new()
    }
}
