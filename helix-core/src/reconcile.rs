//! Merging of live events into the session list
//!
//! Every function here is pure: it reads the current [`SessionList`] and
//! returns a new one when something changed. Sessions that were not
//! touched are shared with the input list, so observers can compare them
//! with `Arc::ptr_eq`.

use std::sync::Arc;

use tracing::debug;

use crate::events::{InboundEvent, WorkerTaskResponse, WorkerTaskResponseType};
use crate::session::{Interaction, Session, SessionList};

/// Index of the interaction that worker responses for `session` update.
///
/// Only one system turn is expected to be in flight per session, so the
/// last system interaction in turn order is the target.
pub fn active_system_interaction(session: &Session) -> Option<usize> {
    session.interactions.iter().rposition(Interaction::is_system)
}

/// Apply one inbound event.
///
/// Returns `None` when the event leaves the collection unchanged.
pub fn apply_event(sessions: &SessionList, event: &InboundEvent) -> Option<SessionList> {
    match event {
        InboundEvent::SessionUpdate(session) => replace_session(sessions, session),
        InboundEvent::WorkerTaskResponse(response) => apply_worker_response(sessions, response),
        InboundEvent::Ignored { event_type } => {
            debug!("Ignoring event of type {}", event_type);
            None
        }
    }
}

/// Put `session` in front of the collection.
pub fn prepend_session(sessions: &SessionList, session: Session) -> SessionList {
    let mut next = Vec::with_capacity(sessions.len() + 1);
    next.push(Arc::new(session));
    next.extend(sessions.iter().cloned());
    Arc::new(next)
}

fn apply_worker_response(
    sessions: &SessionList,
    response: &WorkerTaskResponse,
) -> Option<SessionList> {
    match response.response_type {
        WorkerTaskResponseType::Stream => {
            update_active_interaction(sessions, &response.session_id, |interaction| {
                interaction.message.push_str(&response.message);
            })
        }
        WorkerTaskResponseType::Progress => {
            update_active_interaction(sessions, &response.session_id, |interaction| {
                interaction.progress = response.progress;
                interaction.status = response.status.clone();
            })
        }
        WorkerTaskResponseType::Result => {
            debug!(
                "Result response for session {} has no client-side effect",
                response.session_id
            );
            None
        }
        WorkerTaskResponseType::Unknown => {
            debug!(
                "Ignoring unknown worker response for session {}",
                response.session_id
            );
            None
        }
    }
}

/// Replace the session with the same id, keeping its position.
fn replace_session(sessions: &SessionList, session: &Session) -> Option<SessionList> {
    let position = sessions.iter().position(|s| s.id == session.id)?;
    if *sessions[position] == *session {
        return None;
    }

    let mut next = sessions.as_ref().clone();
    next[position] = Arc::new(session.clone());
    Some(Arc::new(next))
}

fn update_active_interaction<F>(
    sessions: &SessionList,
    session_id: &str,
    update: F,
) -> Option<SessionList>
where
    F: FnOnce(&mut Interaction),
{
    let position = sessions.iter().position(|s| s.id == session_id)?;
    let current = &sessions[position];
    let target = active_system_interaction(current)?;

    let mut session = (**current).clone();
    update(&mut session.interactions[target]);
    if session.interactions[target] == current.interactions[target] {
        return None;
    }

    let mut next = sessions.as_ref().clone();
    next[position] = Arc::new(session);
    Some(Arc::new(next))
}
