//! In-process WebSocket harness standing in for the escrow backend.
//!
//! Records every client frame, pushes server events on demand, and can
//! drop all live sockets to exercise the reconnection path.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use tokio::sync::{Mutex, broadcast};
use tokio::time::{Instant, sleep};

const WAIT_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(20);

static LOGGER: std::sync::Once = std::sync::Once::new();

pub struct HarnessState {
    /// Total WebSocket connections accepted (reconnects included).
    connections: AtomicUsize,
    /// Every parsed frame received from clients, in arrival order.
    received: Mutex<Vec<serde_json::Value>>,
    /// Server-initiated pushes, fanned out to all live sockets.
    push_tx: broadcast::Sender<String>,
    /// Closes all live sockets when fired.
    kick_tx: broadcast::Sender<()>,
}

/// Harness server bound to an ephemeral local port.
pub struct TestServer {
    addr: SocketAddr,
    state: Arc<HarnessState>,
    task: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        LOGGER.call_once(|| tsunagi_shared::logger::setup_logger("harness", "warn"));

        let (push_tx, _) = broadcast::channel(16);
        let (kick_tx, _) = broadcast::channel(4);
        let state = Arc::new(HarnessState {
            connections: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
            push_tx,
            kick_tx,
        });

        let app = Router::new()
            .route("/ws", get(ws_handler))
            .with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind harness listener");
        let addr = listener.local_addr().expect("harness local addr");
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("harness server");
        });

        TestServer { addr, state, task }
    }

    pub fn url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Total connections accepted so far.
    pub fn connections(&self) -> usize {
        self.state.connections.load(Ordering::SeqCst)
    }

    pub async fn received(&self) -> Vec<serde_json::Value> {
        self.state.received.lock().await.clone()
    }

    /// Push a server event to every live socket.
    pub fn push(&self, event: serde_json::Value) {
        // Err only when no socket is live; tests push after connecting.
        let _ = self.state.push_tx.send(event.to_string());
    }

    /// Drop every live socket, forcing clients to reconnect.
    pub fn kick_all(&self) {
        let _ = self.state.kick_tx.send(());
    }

    /// Stop the server entirely: live sockets drop and the listener
    /// closes, so every reconnection attempt is refused.
    pub fn shutdown(&self) {
        self.kick_all();
        self.task.abort();
    }

    pub async fn wait_received_count(&self, n: usize) {
        let deadline = Instant::now() + WAIT_TIMEOUT;
        loop {
            let received = self.received().await;
            if received.len() >= n {
                return;
            }
            assert!(
                Instant::now() < deadline,
                "timed out waiting for {n} frames, got {received:?}"
            );
            sleep(POLL_INTERVAL).await;
        }
    }

    pub async fn wait_connection_count(&self, n: usize) {
        let deadline = Instant::now() + WAIT_TIMEOUT;
        while self.connections() < n {
            assert!(
                Instant::now() < deadline,
                "timed out waiting for {n} connections, got {}",
                self.connections()
            );
            sleep(POLL_INTERVAL).await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<HarnessState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<HarnessState>) {
    state.connections.fetch_add(1, Ordering::SeqCst);
    let mut push_rx = state.push_tx.subscribe();
    let mut kick_rx = state.kick_tx.subscribe();

    loop {
        tokio::select! {
            inbound = socket.recv() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    let Ok(value) = serde_json::from_str::<serde_json::Value>(text.as_str())
                    else {
                        continue;
                    };
                    // Ack escrow room joins the way the backend does.
                    if value["event"] == "joinEscrowRoom" {
                        let ack = serde_json::json!({
                            "event": "joinedEscrowRoom",
                            "data": value["data"].clone(),
                        });
                        if socket.send(Message::Text(ack.to_string().into())).await.is_err() {
                            break;
                        }
                    }
                    state.received.lock().await.push(value);
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(_)) => break,
            },
            pushed = push_rx.recv() => {
                if let Ok(text) = pushed {
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
            },
            _ = kick_rx.recv() => break,
        }
    }
}
