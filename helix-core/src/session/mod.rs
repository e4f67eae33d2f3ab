//! Session data model
//!
//! Sessions are conversations made of ordered interactions. The records
//! mirror the JSON served by the backend's session listing and carried by
//! `session_update` events.

pub mod types;

pub use types::{Interaction, Session, SessionList, CREATOR_SYSTEM, CREATOR_USER};
