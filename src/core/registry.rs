//! The set of managed clients.
use crate::{core::Client, Xid};
use std::collections::HashMap;

/// Every managed [Client] keyed by its window, along with the focused client
/// and an index from decoration frames back to their client.
///
/// This is the only place clients are inserted and removed: everything else
/// refers to a client by its [Xid].
#[derive(Debug, Default, Clone)]
pub struct ClientRegistry {
    clients: HashMap<Xid, Client>,
    frames: HashMap<Xid, Xid>,
    focused: Option<Xid>,
}

impl ClientRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of managed clients.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether there are any managed clients.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Whether the given window is a managed client.
    pub fn contains(&self, id: &Xid) -> bool {
        self.clients.contains_key(id)
    }

    /// Look up a client by its window.
    pub fn get(&self, id: &Xid) -> Option<&Client> {
        self.clients.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &Xid) -> Option<&mut Client> {
        self.clients.get_mut(id)
    }

    /// The client decorated by the given frame window.
    pub fn client_for_frame(&self, frame: &Xid) -> Option<&Client> {
        self.frames.get(frame).and_then(|id| self.clients.get(id))
    }

    /// Whether the window is one of the frames created for a client.
    pub fn is_frame(&self, id: &Xid) -> bool {
        self.frames.contains_key(id)
            || self.clients.values().any(|c| c.dec.bgwin == *id)
    }

    /// Some client with the urgent flag set. Which one is unspecified.
    pub fn find_urgent(&self) -> Option<&Client> {
        self.clients.values().find(|c| c.is_urgent())
    }

    /// The focused client if there is one.
    pub fn focused(&self) -> Option<Xid> {
        self.focused
    }

    pub(crate) fn set_focused(&mut self, id: Option<Xid>) {
        self.focused = id;
    }

    /// Iterate over all clients in an arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Client> {
        self.clients.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Client> {
        self.clients.values_mut()
    }

    /// Returns false without modifying the registry if the client is already present.
    pub(crate) fn insert(&mut self, client: Client) -> bool {
        if self.clients.contains_key(&client.id) {
            return false;
        }

        self.frames.insert(client.dec.decwin, client.id);
        self.clients.insert(client.id, client);

        true
    }

    /// Clears the focused record if it was pointing at the removed client.
    pub(crate) fn remove(&mut self, id: &Xid) -> Option<Client> {
        let client = self.clients.remove(id)?;
        self.frames.remove(&client.dec.decwin);
        if self.focused == Some(*id) {
            self.focused = None;
        }

        Some(client)
    }

    pub(crate) fn drain(&mut self) -> Vec<Client> {
        self.frames.clear();
        self.focused = None;

        self.clients.drain().map(|(_, c)| c).collect()
    }
}
