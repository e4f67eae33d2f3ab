//! Event types pushed over the user websocket

use serde::{Deserialize, Serialize};

use crate::session::Session;

/// Event type of a full session replacement
pub const EVENT_TYPE_SESSION_UPDATE: &str = "session_update";
/// Event type of a worker response (stream, progress, result)
pub const EVENT_TYPE_WORKER_TASK_RESPONSE: &str = "worker_task_response";

/// Kind of a worker task response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerTaskResponseType {
    /// Incremental message fragment
    Stream,
    /// Progress and status update
    Progress,
    /// Final result of the task
    Result,
    /// Anything this client does not know about yet
    #[serde(other)]
    Unknown,
}

/// Response reported by a worker for the active interaction of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerTaskResponse {
    #[serde(rename = "type")]
    pub response_type: WorkerTaskResponseType,
    pub session_id: String,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub interaction_id: String,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub owner: String,
    /// Message fragment for stream responses
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub progress: Option<u32>,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub files: Vec<String>,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub error: String,
}

impl WorkerTaskResponse {
    /// Stream response carrying a message fragment
    pub fn stream(session_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::empty(WorkerTaskResponseType::Stream, session_id.into())
        }
    }

    /// Progress response carrying progress and status
    pub fn progress(
        session_id: impl Into<String>,
        progress: Option<u32>,
        status: Option<String>,
    ) -> Self {
        Self {
            progress,
            status,
            ..Self::empty(WorkerTaskResponseType::Progress, session_id.into())
        }
    }

    fn empty(response_type: WorkerTaskResponseType, session_id: String) -> Self {
        Self {
            response_type,
            session_id,
            interaction_id: String::new(),
            owner: String::new(),
            message: String::new(),
            progress: None,
            status: None,
            files: Vec::new(),
            error: String::new(),
        }
    }
}

/// Frame layout as sent by the backend
#[derive(Debug, Deserialize)]
struct WireEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    session: Option<Session>,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    worker_task_response: Option<WorkerTaskResponse>,
}

/// Decoded inbound event
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// Full replacement of an existing session
    SessionUpdate(Session),
    /// Worker output for a session
    WorkerTaskResponse(WorkerTaskResponse),
    /// Recognized frame with nothing to apply
    Ignored { event_type: String },
}

impl InboundEvent {
    /// Event type label used in logs
    pub fn kind(&self) -> &str {
        match self {
            InboundEvent::SessionUpdate(_) => EVENT_TYPE_SESSION_UPDATE,
            InboundEvent::WorkerTaskResponse(_) => EVENT_TYPE_WORKER_TASK_RESPONSE,
            InboundEvent::Ignored { event_type } => event_type,
        }
    }
}

/// Decode a single websocket text frame.
///
/// Frames that are not valid JSON, or lack a `type`, are errors. Unknown
/// event types and events missing their payload decode to
/// [`InboundEvent::Ignored`].
pub fn decode_event(raw: &str) -> crate::Result<InboundEvent> {
    let wire: WireEvent = serde_json::from_str(raw)?;

    let event = match (wire.event_type.as_str(), wire.session, wire.worker_task_response) {
        (EVENT_TYPE_SESSION_UPDATE, Some(session), _) => InboundEvent::SessionUpdate(session),
        (EVENT_TYPE_WORKER_TASK_RESPONSE, _, Some(response)) => {
            InboundEvent::WorkerTaskResponse(response)
        }
        _ => InboundEvent::Ignored {
            event_type: wire.event_type,
        },
    };

    Ok(event)
}
