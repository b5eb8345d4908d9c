//! Connection registry: live connections and their participant identities.

use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Error pushing a message to a single connection.
#[derive(Debug, Error)]
pub enum PushError {
    #[error("no connection registered for participant '{0}'")]
    ConnectionGone(Uuid),
    #[error("outbound channel for participant '{0}' is closed")]
    ChannelClosed(Uuid),
}

/// A broadcast target captured in a point-in-time snapshot.
///
/// Holds a clone of the connection's outbound channel, so the snapshot stays
/// valid even if the connection unregisters while a broadcast is in flight.
#[derive(Clone)]
pub struct Recipient {
    pub id: Uuid,
    pub sender: mpsc::UnboundedSender<String>,
}

/// Map of participant identity to the connection's outbound channel.
///
/// The identity is assigned by the server at registration time and never
/// supplied (or forgeable) by a client.
pub struct ConnectionRegistry {
    connections: HashMap<Uuid, mpsc::UnboundedSender<String>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
        }
    }

    /// Register a new connection and assign it a fresh participant identity.
    pub fn register(&mut self, sender: mpsc::UnboundedSender<String>) -> Uuid {
        let mut id = Uuid::new_v4();
        // v4 collisions are not a practical concern, but a live duplicate
        // would corrupt fan-out, so regenerate until the slot is vacant.
        while self.connections.contains_key(&id) {
            id = Uuid::new_v4();
        }
        self.connections.insert(id, sender);
        id
    }

    /// Remove a connection. Returns `false` if it was already removed.
    ///
    /// Idempotent on purpose: disconnect cleanup can be triggered from both
    /// the error path and the close path, and must only take effect once.
    pub fn unregister(&mut self, id: &Uuid) -> bool {
        self.connections.remove(id).is_some()
    }

    /// Push a message to one specific connection.
    ///
    /// Used for the initialize snapshot, which goes to the newcomer alone.
    pub fn push_to(&self, id: &Uuid, payload: String) -> Result<(), PushError> {
        let sender = self
            .connections
            .get(id)
            .ok_or(PushError::ConnectionGone(*id))?;
        sender
            .send(payload)
            .map_err(|_| PushError::ChannelClosed(*id))
    }

    /// Snapshot the broadcast targets, excluding `except` when given.
    ///
    /// The returned list owns cloned senders, so callers can iterate it
    /// without holding the registry lock.
    pub fn recipients(&self, except: Option<Uuid>) -> Vec<Recipient> {
        self.connections
            .iter()
            .filter(|(id, _)| Some(**id) != except)
            .map(|(id, sender)| Recipient {
                id: *id,
                sender: sender.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_one() -> (ConnectionRegistry, Uuid, mpsc::UnboundedReceiver<String>) {
        let mut registry = ConnectionRegistry::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let id = registry.register(tx);
        (registry, id, rx)
    }

    #[test]
    fn test_register_assigns_distinct_identities() {
        // given:
        let mut registry = ConnectionRegistry::new();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();

        // when:
        let id1 = registry.register(tx1);
        let id2 = registry.register(tx2);

        // then:
        assert_ne!(id1, id2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        // given:
        let (mut registry, id, _rx) = registry_with_one();

        // when:
        let first = registry.unregister(&id);
        let second = registry.unregister(&id);

        // then:
        assert!(first);
        assert!(!second);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_push_to_delivers_to_the_right_connection() {
        // given:
        let (registry, id, mut rx) = registry_with_one();

        // when:
        let result = registry.push_to(&id, "hello".to_string());

        // then:
        assert!(result.is_ok());
        assert_eq!(rx.try_recv().ok(), Some("hello".to_string()));
    }

    #[test]
    fn test_push_to_unknown_identity_fails() {
        // given:
        let registry = ConnectionRegistry::new();

        // when:
        let result = registry.push_to(&Uuid::new_v4(), "hello".to_string());

        // then:
        assert!(matches!(result, Err(PushError::ConnectionGone(_))));
    }

    #[test]
    fn test_recipients_excludes_the_originator() {
        // given:
        let mut registry = ConnectionRegistry::new();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        let (tx3, _rx3) = mpsc::unbounded_channel();
        let alice = registry.register(tx1);
        let bob = registry.register(tx2);
        let carol = registry.register(tx3);

        // when:
        let targets = registry.recipients(Some(alice));

        // then:
        let ids: Vec<Uuid> = targets.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&bob));
        assert!(ids.contains(&carol));
        assert!(!ids.contains(&alice));
    }

    #[test]
    fn test_recipients_without_exclusion_returns_everyone() {
        // given:
        let mut registry = ConnectionRegistry::new();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        registry.register(tx1);
        registry.register(tx2);

        // when:
        let targets = registry.recipients(None);

        // then:
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn test_recipients_snapshot_survives_unregister() {
        // given:
        let mut registry = ConnectionRegistry::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        let alice = registry.register(tx1);
        let bob = registry.register(tx2);
        let targets = registry.recipients(Some(bob));

        // when: alice unregisters while the snapshot is still in use
        registry.unregister(&alice);
        for target in &targets {
            let _ = target.sender.send("late delivery".to_string());
        }

        // then: the cloned sender still reaches alice's channel
        assert_eq!(rx1.try_recv().ok(), Some("late delivery".to_string()));
    }
}
