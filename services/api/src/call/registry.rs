//! In-memory table of active call sessions.
//!
//! The registry is the single source of truth for which calls are live:
//! a room id resolves if and only if its session holds both transports.
//! Removal returning the handle (or not) is what keeps racing teardown
//! paths idempotent.

use super::events::{EventSender, SessionEvent};
use super::session::SessionCommand;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::{broadcast, mpsc};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("a session for room '{0}' is already registered")]
    DuplicateSession(String),
}

/// Cloneable handle to a live call session.
///
/// The relay task keeps exclusive ownership of both transports; the
/// handle only carries the channels other parts of the service may
/// touch: the event feed and the stop command.
#[derive(Clone)]
pub struct SessionHandle {
    pub room_id: String,
    pub vapi_call_id: String,
    events: EventSender,
    commands: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub fn new(
        room_id: String,
        vapi_call_id: String,
        events: EventSender,
        commands: mpsc::Sender<SessionCommand>,
    ) -> Self {
        Self {
            room_id,
            vapi_call_id,
            events,
            commands,
        }
    }

    /// Subscribe to this session's event feed. Only events published
    /// after this call are observed.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Ask the relay task to stop the call. A no-op if the task has
    /// already exited.
    pub async fn stop(&self) {
        let _ = self.commands.send(SessionCommand::Stop).await;
    }
}

/// Mapping from room id to live session.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, SessionHandle>> {
        self.sessions.lock().expect("session registry mutex poisoned")
    }

    /// Store a session. Provider-assigned room ids should never collide,
    /// but a collision must not silently replace a live call.
    pub fn register(&self, handle: SessionHandle) -> Result<(), RegistryError> {
        let mut sessions = self.lock();
        if sessions.contains_key(&handle.room_id) {
            return Err(RegistryError::DuplicateSession(handle.room_id.clone()));
        }
        sessions.insert(handle.room_id.clone(), handle);
        Ok(())
    }

    pub fn lookup(&self, room_id: &str) -> Option<SessionHandle> {
        self.lock().get(room_id).cloned()
    }

    /// Remove and return the session. `None` doubles as the
    /// "already removed" signal for racing teardown paths.
    pub fn remove(&self, room_id: &str) -> Option<SessionHandle> {
        self.lock().remove(room_id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::events;

    fn handle(room_id: &str) -> SessionHandle {
        let (commands, _rx) = mpsc::channel(1);
        SessionHandle::new(
            room_id.to_string(),
            format!("call-for-{room_id}"),
            events::channel(),
            commands,
        )
    }

    #[test]
    fn test_register_then_lookup() {
        let registry = SessionRegistry::new();
        registry.register(handle("room-1")).unwrap();

        let found = registry.lookup("room-1").expect("session should resolve");
        assert_eq!(found.room_id, "room-1");
        assert_eq!(found.vapi_call_id, "call-for-room-1");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_unknown_room_is_none() {
        let registry = SessionRegistry::new();
        assert!(registry.lookup("room-1").is_none());
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let registry = SessionRegistry::new();
        registry.register(handle("room-1")).unwrap();

        let err = registry.register(handle("room-1")).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateSession(id) if id == "room-1"));
        // The original session must survive the collision.
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_is_observable_exactly_once() {
        let registry = SessionRegistry::new();
        registry.register(handle("room-1")).unwrap();

        assert!(registry.remove("room-1").is_some());
        assert!(registry.remove("room-1").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_accounts_for_starts_and_stops() {
        let registry = SessionRegistry::new();
        for id in ["a", "b", "c"] {
            registry.register(handle(id)).unwrap();
        }
        assert_eq!(registry.len(), 3);

        registry.remove("b");
        assert_eq!(registry.len(), 2);
        assert!(registry.lookup("a").is_some());
        assert!(registry.lookup("b").is_none());
        assert!(registry.lookup("c").is_some());
    }
}
