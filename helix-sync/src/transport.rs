//! Websocket transport for the user event feed
//!
//! The connection loop owns reconnection: when the server closes the
//! socket or the connection fails, it waits for the configured delay and
//! dials again until it is told to stop. Frames are handed to a callback
//! one at a time, in arrival order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use reqwest::Url;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use tracing::{debug, error, info, warn};

use crate::error::{Result, SyncError};

const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Build the event stream URL for an API origin.
///
/// `http` becomes `ws` and `https` becomes `wss`; host and port are kept,
/// the path is replaced and the token is the only query parameter.
pub fn stream_url(base_url: &str, path: &str, token: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|e| SyncError::InvalidUrl(format!("{}: {}", base_url, e)))?;

    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => {
            return Err(SyncError::InvalidUrl(format!(
                "unsupported scheme '{}' in {}",
                other, base_url
            )))
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| SyncError::InvalidUrl(format!("cannot use {} for {}", scheme, base_url)))?;

    url.set_path(path);
    url.set_query(None);
    url.set_fragment(None);
    url.query_pairs_mut().append_pair("access_token", token);
    Ok(url)
}

/// URL without its query, safe to log
fn redacted(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}

/// A running event stream connection.
///
/// Dropping the handle aborts the background task; [`LiveConnection::close`]
/// closes the socket gracefully first.
pub struct LiveConnection {
    connected: Arc<AtomicBool>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl LiveConnection {
    /// Start the connection loop; must be called inside a tokio runtime
    pub fn open<F>(url: Url, reconnect_delay: Duration, on_frame: F) -> Self
    where
        F: FnMut(&str) + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let connected = Arc::new(AtomicBool::new(false));

        let task = tokio::spawn(connection_loop(
            url,
            reconnect_delay,
            Arc::clone(&connected),
            shutdown_rx,
            on_frame,
        ));

        Self {
            connected,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// Whether the socket is currently open
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Close the socket and wait for the loop to finish
    pub async fn close(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }

        if let Some(mut task) = self.task.take() {
            if tokio::time::timeout(CLOSE_TIMEOUT, &mut task).await.is_err() {
                warn!("Event stream did not stop in time, aborting");
                task.abort();
            }
        }

        self.connected.store(false, Ordering::SeqCst);
    }
}

impl Drop for LiveConnection {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn connection_loop<F>(
    url: Url,
    reconnect_delay: Duration,
    connected: Arc<AtomicBool>,
    mut shutdown_rx: mpsc::Receiver<()>,
    mut on_frame: F,
) where
    F: FnMut(&str) + Send + 'static,
{
    let target = redacted(&url);

    loop {
        info!("Connecting to event stream at {}...", target);

        let attempt = tokio::select! {
            attempt = connect_async(url.as_str()) => attempt,
            _ = shutdown_rx.recv() => break,
        };

        match attempt {
            Ok((ws_stream, _)) => {
                info!("Connected to event stream");
                connected.store(true, Ordering::SeqCst);
                let (mut write, mut read) = ws_stream.split();

                let stop = loop {
                    tokio::select! {
                        msg = read.next() => {
                            match msg {
                                Some(Ok(WsMessage::Text(text))) => on_frame(&text),
                                Some(Ok(WsMessage::Close(_))) => {
                                    info!("Event stream closed by server");
                                    break false;
                                }
                                Some(Ok(other)) => {
                                    debug!("Ignoring non-text frame ({} bytes)", other.len());
                                }
                                Some(Err(e)) => {
                                    error!("Event stream error: {}", e);
                                    break false;
                                }
                                None => {
                                    info!("Event stream ended");
                                    break false;
                                }
                            }
                        }
                        _ = shutdown_rx.recv() => {
                            let _ = write.send(WsMessage::Close(None)).await;
                            break true;
                        }
                    }
                };

                connected.store(false, Ordering::SeqCst);
                if stop {
                    break;
                }
            }
            Err(e) => {
                error!("Failed to connect to event stream: {}", e);
            }
        }

        info!("Reconnecting in {:?}...", reconnect_delay);
        tokio::select! {
            _ = tokio::time::sleep(reconnect_delay) => {}
            _ = shutdown_rx.recv() => break,
        }
    }

    info!("Event stream loop ended");
}
