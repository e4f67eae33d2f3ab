//! Session and interaction records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Creator tag of turns produced by a worker
pub const CREATOR_SYSTEM: &str = "system";
/// Creator tag of turns typed by the user
pub const CREATOR_USER: &str = "user";

/// Ordered, shared session collection.
///
/// The outer `Arc` changes whenever the collection changes; sessions that
/// were not touched keep their inner `Arc`.
pub type SessionList = Arc<Vec<Arc<Session>>>;

/// A conversation session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier
    pub id: String,
    /// Display name
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub name: String,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    /// Last update time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    /// Session mode (inference, finetune)
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub mode: String,
    /// Session type (text, image)
    #[serde(default, rename = "type", deserialize_with = "crate::utils::null_as_default")]
    pub session_type: String,
    /// Model serving this session
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub model_name: String,
    /// Owning user
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub owner: String,
    /// Interactions in conversation turn order
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub interactions: Vec<Interaction>,
    /// Backend fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Session {
    /// Create an empty session
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            created: None,
            updated: None,
            mode: String::new(),
            session_type: String::new(),
            model_name: String::new(),
            owner: String::new(),
            interactions: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Append an interaction
    pub fn with_interaction(mut self, interaction: Interaction) -> Self {
        self.interactions.push(interaction);
        self
    }

    /// Find an interaction by id
    pub fn interaction(&self, id: &str) -> Option<&Interaction> {
        self.interactions.iter().find(|i| i.id == id)
    }
}

/// One turn within a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// Unique interaction identifier
    pub id: String,
    /// Creator role ("system", "user")
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub creator: String,
    /// Message text, grown by stream events
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub message: String,
    /// Progress percentage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u32>,
    /// Status text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    /// Whether the worker finished this turn
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub finished: bool,
    /// Backend state (waiting, editing, complete, error)
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub state: String,
    /// Error text reported by the worker
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub error: String,
    /// Backend fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Interaction {
    /// Create an interaction with the given creator and message
    pub fn new(
        id: impl Into<String>,
        creator: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            creator: creator.into(),
            message: message.into(),
            progress: None,
            status: None,
            created: None,
            finished: false,
            state: String::new(),
            error: String::new(),
            extra: Map::new(),
        }
    }

    /// Create a system (worker) interaction
    pub fn system(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(id, CREATOR_SYSTEM, message)
    }

    /// Create a user interaction
    pub fn user(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(id, CREATOR_USER, message)
    }

    /// Whether this turn was produced by a worker
    pub fn is_system(&self) -> bool {
        self.creator == CREATOR_SYSTEM
    }
}
