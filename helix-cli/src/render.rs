//! Plain-text rendering of sessions and the feature grid

use std::sync::Arc;

use console::style;
use helix_core::features::FeatureSection;
use helix_core::reconcile::active_system_interaction;
use helix_core::utils::truncate;
use helix_core::{Session, SessionList};

const PREVIEW_LEN: usize = 60;

/// Sessions in `current` that are not pointer-identical to any session in
/// `previous`, i.e. the ones an event touched.
pub fn changed_sessions<'a>(previous: &SessionList, current: &'a SessionList) -> Vec<&'a Session> {
    current
        .iter()
        .filter(|session| !previous.iter().any(|old| Arc::ptr_eq(old, *session)))
        .map(|session| &**session)
        .collect()
}

/// One line summary of a session and its active worker turn
pub fn session_line(session: &Session) -> String {
    let name = if session.name.is_empty() {
        "(unnamed)"
    } else {
        session.name.as_str()
    };
    let mut line = format!("{} {} [{} turns]", session.id, name, session.interactions.len());

    if let Some(index) = active_system_interaction(session) {
        let active = &session.interactions[index];
        if let Some(progress) = active.progress {
            line.push_str(&format!(" {}%", progress));
        }
        if let Some(status) = active.status.as_deref().filter(|s| !s.is_empty()) {
            line.push_str(&format!(" ({})", status));
        }
        let preview = active.message.replace('\n', " ");
        if !preview.is_empty() {
            line.push_str(&format!(": {}", truncate(&preview, PREVIEW_LEN)));
        }
    }

    line
}

pub fn print_sessions(sessions: &[Arc<Session>]) {
    if sessions.is_empty() {
        println!("No sessions");
        return;
    }
    for session in sessions {
        println!("{}", session_line(session));
    }
}

pub fn print_features(sections: &[FeatureSection]) {
    for section in sections {
        println!("{}", style(section.title).bold().underlined());
        for feature in &section.features {
            let title = if feature.disabled {
                style(feature.title).dim()
            } else {
                style(feature.title).cyan()
            };
            let actions: Vec<&str> = feature.actions.iter().map(|a| a.title).collect();
            println!(
                "  {:<18} {:<28} [{}]",
                title,
                feature.description,
                actions.join(" | ")
            );
        }
        println!();
    }
}
