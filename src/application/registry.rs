//! # Session Registry
//!
//! Maps a room id to at most one Lean Coffee session. A finished session
//! may be replaced in place; a live one blocks creation. The registry is
//! owned by the adapter behind an `Arc<Mutex<_>>` rather than living in a
//! process-wide static.

use std::collections::HashMap;

use crate::application::session::{Phase, Session};
use crate::domain::error::SessionError;

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<String, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, room_id: &str) -> Option<&Session> {
        self.sessions.get(room_id)
    }

    pub fn get_mut(&mut self, room_id: &str) -> Option<&mut Session> {
        self.sessions.get_mut(room_id)
    }

    /// Creates a session for the room. A finished session is replaced;
    /// a live one rejects the request.
    pub fn create(
        &mut self,
        room_id: &str,
        coordinator_id: &str,
        max_votes: usize,
    ) -> Result<&mut Session, SessionError> {
        if let Some(existing) = self.sessions.get(room_id) {
            if existing.phase != Phase::Finished {
                return Err(SessionError::SessionAlreadyActive);
            }
        }
        // Wake any stale waiter on the session being replaced
        if let Some(old) = self.sessions.remove(room_id) {
            old.abort();
        }
        Ok(self
            .sessions
            .entry(room_id.to_string())
            .or_insert_with(|| Session::new(coordinator_id, max_votes)))
    }

    /// Removes the room's session regardless of phase, waking any
    /// in-flight discussion wait.
    pub fn abort(&mut self, room_id: &str) -> Result<(), SessionError> {
        let session = self
            .sessions
            .remove(room_id)
            .ok_or(SessionError::SessionNotFound)?;
        session.abort();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOM: &str = "!room:example.org";
    const COORD: &str = "@coord:example.org";

    #[test]
    fn test_create_and_get() {
        let mut registry = SessionRegistry::new();
        assert!(registry.get(ROOM).is_none());

        registry.create(ROOM, COORD, 3).unwrap();
        let session = registry.get(ROOM).unwrap();
        assert_eq!(session.coordinator_id, COORD);
        assert_eq!(session.max_votes, 3);
        assert_eq!(session.phase, Phase::Created);
    }

    #[test]
    fn test_second_create_on_live_session_is_rejected() {
        let mut registry = SessionRegistry::new();
        registry.create(ROOM, COORD, 3).unwrap();
        assert_eq!(
            registry.create(ROOM, "@other:example.org", 3).err(),
            Some(SessionError::SessionAlreadyActive)
        );
        // The original session survives untouched
        assert_eq!(registry.get(ROOM).unwrap().coordinator_id, COORD);
    }

    #[test]
    fn test_finished_session_is_replaced() {
        let mut registry = SessionRegistry::new();
        registry.create(ROOM, COORD, 3).unwrap();
        {
            let session = registry.get_mut(ROOM).unwrap();
            session.finalize().unwrap();
            assert!(session.advance_topic().unwrap().is_none());
            assert_eq!(session.phase, Phase::Finished);
        }

        let replacement = registry.create(ROOM, "@other:example.org", 5).unwrap();
        assert_eq!(replacement.coordinator_id, "@other:example.org");
        assert_eq!(replacement.max_votes, 5);
        assert_eq!(replacement.phase, Phase::Created);
    }

    #[test]
    fn test_rooms_are_independent() {
        let mut registry = SessionRegistry::new();
        registry.create(ROOM, COORD, 3).unwrap();
        registry
            .create("!other:example.org", "@other:example.org", 4)
            .unwrap();
        assert_eq!(registry.get(ROOM).unwrap().max_votes, 3);
        assert_eq!(registry.get("!other:example.org").unwrap().max_votes, 4);
    }

    #[test]
    fn test_abort_removes_session() {
        let mut registry = SessionRegistry::new();
        registry.create(ROOM, COORD, 3).unwrap();
        registry.abort(ROOM).unwrap();
        assert!(registry.get(ROOM).is_none());
        assert_eq!(registry.abort(ROOM), Err(SessionError::SessionNotFound));
    }

    #[tokio::test]
    async fn test_abort_fires_the_session_signal() {
        let mut registry = SessionRegistry::new();
        registry.create(ROOM, COORD, 3).unwrap();
        let mut signal = registry.get(ROOM).unwrap().abort_signal();

        registry.abort(ROOM).unwrap();
        signal.changed().await.unwrap();
        assert!(*signal.borrow());
    }
}
