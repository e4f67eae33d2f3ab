//! Session store synchronizer
//!
//! [`SessionSync`] owns the session store and, while an identity is
//! signed in, one live connection to that identity's event feed.

use std::sync::Arc;
use std::time::Duration;

use helix_core::config::validate::validate_config;
use helix_core::config::{Config, StreamConfig};
use helix_core::utils::truncate;
use helix_core::{decode_event, Session, SessionStore, StoreState};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{HttpSessionsApi, SessionsApi};
use crate::error::{Result, SyncError};
use crate::transport::{stream_url, LiveConnection};

/// The signed-in account the store is synchronized for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    /// Access token for both the REST API and the event feed
    pub token: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            token: token.into(),
        }
    }
}

/// Decode one event frame and merge it into `store`.
///
/// Malformed frames are logged and dropped. Returns whether the store
/// changed.
pub fn ingest_frame(store: &SessionStore, raw: &str) -> bool {
    match decode_event(raw) {
        Ok(event) => {
            let changed = store.apply(&event);
            debug!("Applied {} event (changed: {})", event.kind(), changed);
            changed
        }
        Err(e) => {
            warn!(
                "Dropping malformed event frame: {} (raw: {})",
                e,
                truncate(raw, 100)
            );
            false
        }
    }
}

/// Keeps a [`SessionStore`] in sync with the backend for one identity at a
/// time.
pub struct SessionSync {
    api: Arc<dyn SessionsApi>,
    store: SessionStore,
    base_url: String,
    stream: StreamConfig,
    identity: Option<Identity>,
    live: Option<LiveConnection>,
}

impl SessionSync {
    pub fn new(api: Arc<dyn SessionsApi>, base_url: impl Into<String>, stream: StreamConfig) -> Self {
        Self {
            api,
            store: SessionStore::new(),
            base_url: base_url.into(),
            stream,
            identity: None,
            live: None,
        }
    }

    /// Build a synchronizer talking to the HTTP API described by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        validate_config(config)?;
        let api = HttpSessionsApi::new(&config.api)?;
        Ok(Self::new(
            Arc::new(api),
            config.api.base_url.clone(),
            config.stream.clone(),
        ))
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Watch store changes
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.store.subscribe()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Whether the event feed socket is currently open
    pub fn is_live(&self) -> bool {
        self.live.as_ref().is_some_and(LiveConnection::is_connected)
    }

    /// Fetch the full session list and replace the store contents.
    ///
    /// On failure the store is left untouched.
    pub async fn load_sessions(&self) -> Result<()> {
        let identity = self.identity.as_ref().ok_or(SyncError::NotAuthenticated)?;
        let sessions = self.api.list_sessions(&identity.token).await?;
        info!("Loaded {} sessions", sessions.len());
        self.store.replace_all(sessions);
        Ok(())
    }

    /// Record a session created elsewhere; it becomes the first entry
    pub fn add_session(&self, session: Session) {
        self.store.add_session(session);
    }

    /// Switch to a new identity, or sign out with `None`.
    ///
    /// The previous connection is always closed and the store reset. For a
    /// new identity the event feed is opened and the initial load runs; a
    /// failed load is logged and leaves the store uninitialized.
    pub async fn set_identity(&mut self, identity: Option<Identity>) -> Result<()> {
        self.teardown().await;
        self.store.reset();
        self.identity = None;

        let Some(identity) = identity else {
            info!("Identity cleared, session store reset");
            return Ok(());
        };

        let url = stream_url(&self.base_url, &self.stream.path, &identity.token)?;
        info!("Synchronizing sessions for user {}", identity.user_id);
        self.identity = Some(identity);

        let store = self.store.clone();
        self.live = Some(LiveConnection::open(
            url,
            Duration::from_millis(self.stream.reconnect_delay_ms),
            move |raw| {
                ingest_frame(&store, raw);
            },
        ));

        self.initialize().await;
        Ok(())
    }

    /// Close the event feed; the store keeps its contents
    pub async fn shutdown(&mut self) {
        self.teardown().await;
    }

    async fn initialize(&self) {
        match self.load_sessions().await {
            Ok(()) => self.store.mark_initialized(),
            Err(e) => warn!("Initial session load failed: {}", e),
        }
    }

    async fn teardown(&mut self) {
        if let Some(live) = self.live.take() {
            debug!("Closing event stream");
            live.close().await;
        }
    }
}
