//! Core types for helix session sync
//!
//! This crate holds the session data model, the wire events pushed by the
//! backend, the reducer that merges those events into the session list,
//! and the configuration and logging shared by the other helix crates.

pub mod config;
pub mod error;
pub mod events;
pub mod features;
pub mod logging;
pub mod reconcile;
pub mod session;
pub mod store;
pub mod utils;

pub use error::{Error, Result};
pub use events::{decode_event, InboundEvent, WorkerTaskResponse, WorkerTaskResponseType};
pub use session::{Interaction, Session, SessionList, CREATOR_SYSTEM, CREATOR_USER};
pub use store::{SessionStore, StoreState};
