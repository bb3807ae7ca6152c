use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;
use tokio::sync::broadcast;

use crate::models::{BookingPatch, BookingState};

/// Change notification pushed to consuming views (the SSE feed). Carries a
/// full snapshot so subscribers never have to re-fetch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreEvent {
    pub session_id: String,
    pub kind: EventKind,
    pub state: BookingState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Updated,
    Submitted,
    Cleared,
}

/// In-memory booking state, one snapshot per client session.
///
/// This layer does no validation and no persistence — it merges patches in
/// call order and broadcasts the result. Durable storage is the persistence
/// module's job.
pub struct BookingStore {
    sessions: Mutex<HashMap<String, BookingState>>,
    events: broadcast::Sender<StoreEvent>,
}

impl BookingStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            sessions: Mutex::new(HashMap::new()),
            events,
        }
    }

    pub fn get(&self, session_id: &str) -> BookingState {
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Shallow-merges `patch` into the session's state (later write wins,
    /// omitted fields retain their prior value) and broadcasts the merged
    /// snapshot.
    pub fn update(&self, session_id: &str, patch: BookingPatch) -> BookingState {
        let merged = {
            let mut sessions = self.sessions.lock().unwrap();
            let state = sessions.entry(session_id.to_string()).or_default();
            state.apply(patch);
            state.clone()
        };
        self.emit(session_id, EventKind::Updated, merged.clone());
        merged
    }

    /// Replaces the session's snapshot wholesale. Used to hydrate from
    /// durable storage on page mount and after flow switches.
    pub fn replace(&self, session_id: &str, state: BookingState) {
        self.sessions
            .lock()
            .unwrap()
            .insert(session_id.to_string(), state.clone());
        self.emit(session_id, EventKind::Updated, state);
    }

    pub fn clear(&self, session_id: &str, kind: EventKind) {
        self.sessions.lock().unwrap().remove(session_id);
        self.emit(session_id, kind, BookingState::default());
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn emit(&self, session_id: &str, kind: EventKind, state: BookingState) {
        // No subscribers is fine; the send result only signals that.
        let _ = self.events.send(StoreEvent {
            session_id: session_id.to_string(),
            kind,
            state,
        });
    }
}

impl Default for BookingStore {
    fn default() -> Self {
        Self::new()
    }
}
