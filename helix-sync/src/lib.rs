//! Live synchronization of helix sessions
//!
//! Fetches the session list over REST and keeps it current from the
//! per-user websocket event feed.

pub mod api;
pub mod error;
pub mod sync;
pub mod transport;

pub use api::{HttpSessionsApi, SessionsApi};
pub use error::{Result, SyncError};
pub use sync::{ingest_frame, Identity, SessionSync};
pub use transport::{stream_url, LiveConnection};
