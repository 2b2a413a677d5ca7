//! Public entry points: the client factory and the per-view handle.
//!
//! Every view that needs real-time data opens its own handle; handles are
//! never shared between views. Dropping the handle aborts the connection
//! task, which deregisters every handler at once: events arriving after
//! teardown have nowhere to go.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use tsunagi_shared::protocol::{ChatMessage, ClientEvent, MediaAttachment, OutboundMessage};

use crate::{
    cache::QueryCache,
    config::SyncConfig,
    dispatch::SyncShared,
    error::SyncError,
    notify::{Notice, Notifier},
    rooms::RoomSet,
    runner::run_sync,
    status::{ConnectionState, SyncStatus},
};

/// Factory for synchronization handles.
///
/// Holds the configuration and the host application's collaborator seams.
/// Cheap to clone per view; each [`open`](SyncClient::open) call creates
/// an independently owned connection.
#[derive(Clone)]
pub struct SyncClient {
    config: SyncConfig,
    cache: Arc<dyn QueryCache>,
    notifier: Arc<dyn Notifier>,
}

impl SyncClient {
    /// Create a client from config and host collaborators.
    pub fn new(
        config: SyncConfig,
        cache: Arc<dyn QueryCache>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            cache,
            notifier,
        }
    }

    /// Open a connection for the given room set.
    ///
    /// When the token is missing or the room set is empty the handle is
    /// inert: status stays disconnected, no connection attempt is made.
    /// That is the expected "not ready yet" state, not an error.
    pub fn open(&self, rooms: RoomSet) -> SyncHandle {
        let shared = Arc::new(SyncShared::new(self.cache.clone(), self.notifier.clone()));
        let (rooms_tx, rooms_rx) = watch::channel(rooms.clone());
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        let token = self
            .config
            .token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty());

        let task = match token {
            Some(token) if !rooms.is_empty() => Some(tokio::spawn(run_sync(
                self.config.clone(),
                token.to_string(),
                rooms_rx,
                outbound_rx,
                shared.clone(),
            ))),
            _ => {
                tracing::debug!("sync not started: missing token or empty room set");
                None
            }
        };

        SyncHandle {
            shared,
            rooms_tx,
            outbound_tx,
            task,
        }
    }
}

/// An exclusively owned real-time connection for one view.
///
/// Created by [`SyncClient::open`]; destroyed by dropping. Not shared
/// across views.
pub struct SyncHandle {
    shared: Arc<SyncShared>,
    rooms_tx: watch::Sender<RoomSet>,
    outbound_tx: mpsc::UnboundedSender<ClientEvent>,
    task: Option<JoinHandle<()>>,
}

impl SyncHandle {
    /// Watch the connection status (state plus last error).
    pub fn status(&self) -> watch::Receiver<SyncStatus> {
        self.shared.status_tx.subscribe()
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// Replace the room set.
    ///
    /// If connected, the full new set is joined immediately; otherwise it
    /// is joined on the next successful connect. A no-op on inert handles.
    pub fn update_rooms(&self, rooms: RoomSet) {
        // Errors only when the connection task is gone; nothing to join then.
        let _ = self.rooms_tx.send(rooms);
    }

    /// Subscribe to incoming chat messages.
    ///
    /// Replaces any previous subscription: the old receiver's stream ends
    /// and every later message goes to the returned receiver only.
    pub fn messages(&self) -> mpsc::UnboundedReceiver<ChatMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.shared.handlers.set_message_sink(tx);
        rx
    }

    /// Send a chat message to a conversation.
    ///
    /// Requires a connected transport: when not connected this fails fast
    /// with a user-visible notice and performs no network action. Messages
    /// are not queued or retried; delivery is confirmed only if the server
    /// echoes the message back via `receiveMessage`.
    ///
    /// Exactly one of `message`/`media` should be `Some` by convention;
    /// this is not validated here.
    pub fn send_message(
        &self,
        conversation_id: impl Into<String>,
        sender_id: impl Into<String>,
        message: Option<String>,
        media: Option<MediaAttachment>,
    ) -> Result<(), SyncError> {
        if self.state() != ConnectionState::Connected {
            self.shared
                .notifier
                .notify(Notice::error("Cannot send message: not connected"));
            return Err(SyncError::NotConnected);
        }

        let event = ClientEvent::SendMessage(OutboundMessage {
            conversation_id: conversation_id.into(),
            message,
            sender_id: sender_id.into(),
            media,
        });
        self.outbound_tx
            .send(event)
            .map_err(|_| SyncError::NotConnected)
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
