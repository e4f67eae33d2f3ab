use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use helix_core::config::StreamConfig;
use helix_core::{Interaction, Session, StoreState};
use helix_sync::{Identity, SessionSync, SessionsApi};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::{accept_hdr_async, tungstenite::Message as WsMessage};

enum ServerCommand {
    Frame(String),
    Close,
}

/// Websocket server standing in for the helix user event feed.
///
/// Connections are served one after another; frames pushed with
/// `send_frame` go to whichever connection is current.
struct MockEventServer {
    base_url: String,
    commands: mpsc::UnboundedSender<ServerCommand>,
    connections: mpsc::UnboundedReceiver<String>,
    disconnects: mpsc::UnboundedReceiver<()>,
    task: JoinHandle<()>,
}

impl MockEventServer {
    async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock event server");
        let addr = listener.local_addr().expect("mock event server address");

        let (commands, mut commands_rx) = mpsc::unbounded_channel();
        let (connections_tx, connections) = mpsc::unbounded_channel();
        let (disconnects_tx, disconnects) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(accepted) => accepted,
                    Err(_) => return,
                };

                let mut request_uri = String::new();
                let ws = accept_hdr_async(
                    stream,
                    |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
                        request_uri = request.uri().to_string();
                        Ok(response)
                    },
                )
                .await;
                let ws = match ws {
                    Ok(ws) => ws,
                    Err(_) => continue,
                };
                let _ = connections_tx.send(request_uri);

                let (mut write, mut read) = ws.split();
                loop {
                    tokio::select! {
                        command = commands_rx.recv() => match command {
                            Some(ServerCommand::Frame(text)) => {
                                if write.send(WsMessage::Text(text)).await.is_err() {
                                    break;
                                }
                            }
                            Some(ServerCommand::Close) => {
                                let _ = write.send(WsMessage::Close(None)).await;
                                break;
                            }
                            None => return,
                        },
                        msg = read.next() => match msg {
                            Some(Ok(WsMessage::Close(_))) | Some(Err(_)) | None => break,
                            _ => {}
                        },
                    }
                }
                let _ = disconnects_tx.send(());
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            commands,
            connections,
            disconnects,
            task,
        }
    }

    fn send_frame(&self, frame: Value) {
        self.send_raw(frame.to_string());
    }

    fn send_raw(&self, raw: impl Into<String>) {
        let _ = self.commands.send(ServerCommand::Frame(raw.into()));
    }

    fn close_connection(&self) {
        let _ = self.commands.send(ServerCommand::Close);
    }

    async fn next_connection(&mut self) -> String {
        timeout(Duration::from_secs(5), self.connections.recv())
            .await
            .expect("wait for client connection")
            .expect("connection uri")
    }

    async fn next_disconnect(&mut self) {
        timeout(Duration::from_secs(5), self.disconnects.recv())
            .await
            .expect("wait for client disconnect")
            .expect("disconnect notice");
    }

    fn shutdown(self) {
        self.task.abort();
    }
}

struct StaticApi {
    sessions: Vec<Session>,
}

#[async_trait]
impl SessionsApi for StaticApi {
    async fn list_sessions(&self, _token: &str) -> helix_sync::Result<Vec<Session>> {
        Ok(self.sessions.clone())
    }
}

fn conversation() -> Session {
    Session::new("s1")
        .with_interaction(Interaction::user("i1", "say hello"))
        .with_interaction(Interaction::system("i2", "Hel"))
}

fn sync_for(server: &MockEventServer) -> SessionSync {
    let api = Arc::new(StaticApi {
        sessions: vec![conversation(), Session::new("s0")],
    });
    SessionSync::new(
        api,
        server.base_url.clone(),
        StreamConfig {
            path: "/api/v1/ws/user".to_string(),
            reconnect_delay_ms: 100,
        },
    )
}

fn stream_frame(session_id: &str, message: &str) -> Value {
    json!({
        "type": "worker_task_response",
        "session_id": session_id,
        "worker_task_response": {
            "type": "stream",
            "session_id": session_id,
            "message": message
        }
    })
}

fn progress_frame(session_id: &str, progress: u32, status: &str) -> Value {
    json!({
        "type": "worker_task_response",
        "session_id": session_id,
        "worker_task_response": {
            "type": "progress",
            "session_id": session_id,
            "progress": progress,
            "status": status
        }
    })
}

async fn wait_for<F>(rx: &mut watch::Receiver<StoreState>, predicate: F) -> StoreState
where
    F: Fn(&StoreState) -> bool,
{
    timeout(Duration::from_secs(5), async {
        loop {
            {
                let state = rx.borrow_and_update();
                if predicate(&*state) {
                    return (*state).clone();
                }
            }
            rx.changed().await.expect("store dropped");
        }
    })
    .await
    .expect("store reached expected state")
}

fn active_message(state: &StoreState) -> String {
    state
        .sessions
        .iter()
        .find(|s| s.id == "s1")
        .and_then(|s| s.interaction("i2"))
        .map(|i| i.message.clone())
        .unwrap_or_default()
}

#[tokio::test]
async fn live_events_update_loaded_sessions() {
    let mut server = MockEventServer::spawn().await;
    let mut sync = sync_for(&server);
    let mut rx = sync.subscribe();

    sync.set_identity(Some(Identity::new("u1", "tok-1")))
        .await
        .expect("set identity");
    let uri = server.next_connection().await;
    assert_eq!(uri, "/api/v1/ws/user?access_token=tok-1");

    let state = wait_for(&mut rx, |state| state.initialized).await;
    assert_eq!(state.sessions.len(), 2);

    server.send_frame(stream_frame("s1", "lo"));
    server.send_frame(stream_frame("s1", " world"));
    server.send_frame(progress_frame("s1", 60, "generating"));

    let state = wait_for(&mut rx, |state| {
        state.sessions[0]
            .interaction("i2")
            .is_some_and(|i| i.progress == Some(60))
    })
    .await;
    let target = state.sessions[0].interaction("i2").expect("system turn");
    assert_eq!(target.message, "Hello world");
    assert_eq!(target.status.as_deref(), Some("generating"));
    assert_eq!(state.sessions[0].interaction("i1").unwrap().message, "say hello");

    sync.shutdown().await;
    server.next_disconnect().await;
    server.shutdown();
}

#[tokio::test]
async fn session_update_replaces_without_changing_membership() {
    let mut server = MockEventServer::spawn().await;
    let mut sync = sync_for(&server);
    let mut rx = sync.subscribe();

    sync.set_identity(Some(Identity::new("u1", "tok-1")))
        .await
        .expect("set identity");
    server.next_connection().await;
    wait_for(&mut rx, |state| state.initialized).await;

    sync.add_session(Session::new("s-new"));
    server.send_frame(json!({
        "type": "session_update",
        "session_id": "s9",
        "session": {"id": "s9", "name": "stranger", "interactions": []}
    }));
    server.send_frame(json!({
        "type": "session_update",
        "session_id": "s1",
        "session": {
            "id": "s1",
            "name": "renamed",
            "interactions": [{"id": "i2", "creator": "system", "message": "Hello!", "state": "complete"}]
        }
    }));

    let state = wait_for(&mut rx, |state| {
        state.sessions.iter().any(|s| s.name == "renamed")
    })
    .await;
    let ids: Vec<&str> = state.sessions.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["s-new", "s1", "s0"]);
    assert_eq!(active_message(&state), "Hello!");

    sync.shutdown().await;
    server.shutdown();
}

#[tokio::test]
async fn malformed_frames_are_dropped_and_connection_survives() {
    let mut server = MockEventServer::spawn().await;
    let mut sync = sync_for(&server);
    let mut rx = sync.subscribe();

    sync.set_identity(Some(Identity::new("u1", "tok-1")))
        .await
        .expect("set identity");
    server.next_connection().await;
    wait_for(&mut rx, |state| state.initialized).await;

    server.send_raw("{definitely not json");
    server.send_raw(r#"{"session_id": "s1"}"#);
    server.send_frame(json!({"type": "runner_state", "runners": []}));
    server.send_frame(json!({
        "type": "worker_task_response",
        "worker_task_response": {"type": "result", "session_id": "s1", "message": "ignored"}
    }));
    server.send_frame(stream_frame("s1", "lo"));

    let state = wait_for(&mut rx, |state| active_message(state) == "Hello").await;
    assert_eq!(active_message(&state), "Hello");
    assert!(sync.is_live());
    assert!(
        timeout(Duration::from_millis(200), server.disconnects.recv())
            .await
            .is_err(),
        "connection should stay open"
    );

    sync.shutdown().await;
    server.shutdown();
}

#[tokio::test]
async fn reconnects_after_server_closes() {
    let mut server = MockEventServer::spawn().await;
    let mut sync = sync_for(&server);
    let mut rx = sync.subscribe();

    sync.set_identity(Some(Identity::new("u1", "tok-1")))
        .await
        .expect("set identity");
    server.next_connection().await;
    wait_for(&mut rx, |state| state.initialized).await;

    server.close_connection();
    server.next_disconnect().await;

    let uri = server.next_connection().await;
    assert!(uri.ends_with("access_token=tok-1"));

    server.send_frame(stream_frame("s1", "lo"));
    wait_for(&mut rx, |state| active_message(state) == "Hello").await;

    sync.shutdown().await;
    server.shutdown();
}

#[tokio::test]
async fn identity_change_replaces_connection() {
    let mut server = MockEventServer::spawn().await;
    let mut sync = sync_for(&server);
    let mut rx = sync.subscribe();

    sync.set_identity(Some(Identity::new("u1", "tok-1")))
        .await
        .expect("set first identity");
    assert!(server.next_connection().await.ends_with("access_token=tok-1"));

    sync.set_identity(Some(Identity::new("u2", "tok-2")))
        .await
        .expect("set second identity");
    server.next_disconnect().await;
    assert!(server.next_connection().await.ends_with("access_token=tok-2"));
    assert_eq!(sync.identity().map(|i| i.user_id.as_str()), Some("u2"));

    wait_for(&mut rx, |state| state.initialized).await;
    server.send_frame(stream_frame("s1", "lo"));
    wait_for(&mut rx, |state| active_message(state) == "Hello").await;

    sync.set_identity(None).await.expect("sign out");
    server.next_disconnect().await;
    let state = sync.store().snapshot();
    assert!(!state.initialized);
    assert!(state.sessions.is_empty());

    server.shutdown();
}
