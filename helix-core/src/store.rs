//! Observable in-memory session store

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::events::InboundEvent;
use crate::reconcile;
use crate::session::{Session, SessionList};

/// Published state of the store
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    /// Set after the first successful load for the current identity
    pub initialized: bool,
    /// Sessions, most recent first
    pub sessions: SessionList,
}

/// Session collection shared between the live connection and observers.
///
/// Every change publishes a new [`StoreState`] whose `sessions` is a new
/// `Arc`. Events that change nothing publish nothing.
#[derive(Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<StoreState>>,
}

impl SessionStore {
    /// Create an empty, uninitialized store
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(StoreState::default());
        Self { tx: Arc::new(tx) }
    }

    /// Current state
    pub fn snapshot(&self) -> StoreState {
        self.tx.borrow().clone()
    }

    /// Current session list
    pub fn sessions(&self) -> SessionList {
        Arc::clone(&self.tx.borrow().sessions)
    }

    pub fn is_initialized(&self) -> bool {
        self.tx.borrow().initialized
    }

    /// Watch for state changes
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.tx.subscribe()
    }

    /// Overwrite the whole collection
    pub fn replace_all(&self, sessions: Vec<Session>) {
        let sessions: SessionList = Arc::new(sessions.into_iter().map(Arc::new).collect());
        debug!("Replacing session list ({} sessions)", sessions.len());
        self.tx.send_modify(|state| state.sessions = sessions);
    }

    pub fn mark_initialized(&self) {
        self.tx.send_if_modified(|state| {
            if state.initialized {
                return false;
            }
            state.initialized = true;
            true
        });
    }

    /// Prepend a newly created session
    pub fn add_session(&self, session: Session) {
        self.tx.send_modify(|state| {
            state.sessions = reconcile::prepend_session(&state.sessions, session);
        });
    }

    /// Merge an inbound event, returning whether the collection changed
    pub fn apply(&self, event: &InboundEvent) -> bool {
        self.tx.send_if_modified(|state| {
            match reconcile::apply_event(&state.sessions, event) {
                Some(next) => {
                    state.sessions = next;
                    true
                }
                None => false,
            }
        })
    }

    /// Drop all sessions and the initialized flag
    pub fn reset(&self) {
        self.tx.send_modify(|state| *state = StoreState::default());
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
