//! Routing of parsed server events to their handlers.
//!
//! Each event kind has at most one active handler. Handler slots are
//! replaced, never appended to, so re-subscription on the caller's side
//! can never cause duplicate delivery.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{mpsc, watch};

use tsunagi_shared::protocol::{ChatMessage, ServerEvent};

use crate::{
    cache::{self, QueryCache},
    error::SyncError,
    notify::{Notice, Notifier},
    status::{ConnectionState, SyncStatus},
};

/// Handler slots for caller-facing events.
///
/// One slot per event kind; setting a handler drops the previous one
/// (the replace contract).
pub(crate) struct Handlers {
    message_sink: Mutex<Option<mpsc::UnboundedSender<ChatMessage>>>,
}

impl Handlers {
    pub(crate) fn new() -> Self {
        Self {
            message_sink: Mutex::new(None),
        }
    }

    /// Replace the chat message handler. The previous sender is dropped,
    /// which ends its receiver's stream.
    pub(crate) fn set_message_sink(&self, sink: mpsc::UnboundedSender<ChatMessage>) {
        let mut slot = self
            .message_sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(sink);
    }

    fn deliver_message(&self, message: ChatMessage) {
        let mut slot = self
            .message_sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(sink) = slot.as_ref() {
            if sink.send(message).is_err() {
                // Receiver side is gone; clear the slot so later
                // messages don't keep hitting a closed channel.
                *slot = None;
            }
        }
    }
}

/// State shared between the handle and its connection task.
pub(crate) struct SyncShared {
    pub(crate) status_tx: watch::Sender<SyncStatus>,
    pub(crate) cache: Arc<dyn QueryCache>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) handlers: Handlers,
}

impl SyncShared {
    pub(crate) fn new(cache: Arc<dyn QueryCache>, notifier: Arc<dyn Notifier>) -> Self {
        let (status_tx, _) = watch::channel(SyncStatus::disconnected());
        Self {
            status_tx,
            cache,
            notifier,
            handlers: Handlers::new(),
        }
    }

    pub(crate) fn state(&self) -> ConnectionState {
        self.status_tx.borrow().state
    }

    pub(crate) fn set_state(&self, state: ConnectionState) {
        self.status_tx.send_modify(|status| status.state = state);
    }

    /// Successful connect: connected, previous error cleared.
    pub(crate) fn set_connected(&self) {
        self.status_tx.send_modify(|status| {
            status.state = ConnectionState::Connected;
            status.last_error = None;
        });
    }

    pub(crate) fn set_disconnected(&self, error: Option<SyncError>) {
        self.status_tx.send_modify(|status| {
            status.state = ConnectionState::Disconnected;
            if let Some(error) = error {
                status.last_error = Some(error);
            }
        });
    }

    /// Record an error without changing the connection state.
    pub(crate) fn set_error(&self, error: SyncError) {
        self.status_tx
            .send_modify(|status| status.last_error = Some(error));
    }

    /// Route one parsed server event.
    pub(crate) fn dispatch(&self, event: ServerEvent) {
        match event {
            ServerEvent::JoinedEscrowRoom(ack) => {
                // Informational acknowledgment; no action required.
                tracing::debug!(?ack, "joined escrow room");
            }
            ServerEvent::Unauthorized(payload) => {
                tracing::warn!(error = %payload.error, "server rejected session");
                self.set_error(SyncError::Unauthorized(payload.error.clone()));
                self.notifier.notify(Notice::error(format!(
                    "Session rejected by server: {}",
                    payload.error
                )));
            }
            ServerEvent::Reload(payload) => match cache::invalidation_for(&payload.action) {
                Some(key) => {
                    tracing::debug!(action = %payload.action, key = key.as_str(), "invalidating query");
                    self.cache.invalidate(key);
                }
                None => {
                    tracing::debug!(action = %payload.action, "ignoring reload action");
                }
            },
            ServerEvent::ReceiveMessage(message) => {
                tracing::debug!(
                    conversation_id = %message.conversation_id,
                    created_at = %tsunagi_shared::time::timestamp_to_rfc3339(message.created_at)
                        .unwrap_or_default(),
                    "chat message received"
                );
                self.handlers.deliver_message(message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MockQueryCache, NoopQueryCache, QueryKey};
    use crate::notify::MockNotifier;
    use tsunagi_shared::protocol::{ReloadPayload, UnauthorizedPayload};

    fn chat_message(body: &str) -> ChatMessage {
        ChatMessage {
            id: Some("m-1".to_string()),
            conversation_id: "conv-1".to_string(),
            sender_id: "user-2".to_string(),
            message: Some(body.to_string()),
            media: None,
            created_at: 1672531200000,
        }
    }

    fn shared_with(cache: Arc<dyn QueryCache>, notifier: Arc<dyn Notifier>) -> SyncShared {
        SyncShared::new(cache, notifier)
    }

    #[test]
    fn test_decision_initiated_invalidates_user_disputes_once() {
        // テスト項目: decision_initiated の reload で userDisputes がちょうど 1 回無効化される
        // given (前提条件):
        let mut cache = MockQueryCache::new();
        cache
            .expect_invalidate()
            .withf(|key| *key == QueryKey::UserDisputes)
            .times(1)
            .return_const(());
        let shared = shared_with(Arc::new(cache), Arc::new(MockNotifier::new()));

        // when (操作):
        shared.dispatch(ServerEvent::Reload(ReloadPayload {
            action: "decision_initiated".to_string(),
        }));

        // then (期待する結果): mock の times(1) が drop 時に検証される
    }

    #[test]
    fn test_unrecognized_reload_action_invalidates_nothing() {
        // テスト項目: 未知の reload アクションではキャッシュ無効化が発生しない
        // given (前提条件):
        let mut cache = MockQueryCache::new();
        cache.expect_invalidate().times(0);
        let shared = shared_with(Arc::new(cache), Arc::new(MockNotifier::new()));

        // when (操作):
        shared.dispatch(ServerEvent::Reload(ReloadPayload {
            action: "decision_resolved".to_string(),
        }));

        // then (期待する結果): mock の times(0) が drop 時に検証される
    }

    #[test]
    fn test_unauthorized_notifies_and_records_distinct_error() {
        // テスト項目: unauthorized で通知が 1 回発生し、接続エラーと区別されたエラーが記録される
        // given (前提条件):
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|notice| notice.severity == crate::notify::Severity::Error)
            .times(1)
            .return_const(());
        let shared = shared_with(Arc::new(NoopQueryCache), Arc::new(notifier));

        // when (操作):
        shared.dispatch(ServerEvent::Unauthorized(UnauthorizedPayload {
            error: "token expired".to_string(),
        }));

        // then (期待する結果):
        let status = shared.status_tx.borrow().clone();
        assert_eq!(
            status.last_error,
            Some(SyncError::Unauthorized("token expired".to_string()))
        );
    }

    #[test]
    fn test_receive_message_is_delivered_unmodified() {
        // テスト項目: receiveMessage が登録済みハンドラへ無加工で届く
        // given (前提条件):
        let shared = shared_with(Arc::new(NoopQueryCache), Arc::new(MockNotifier::new()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        shared.handlers.set_message_sink(tx);
        let message = chat_message("hello");

        // when (操作):
        shared.dispatch(ServerEvent::ReceiveMessage(message.clone()));

        // then (期待する結果):
        assert_eq!(rx.try_recv().unwrap(), message);
    }

    #[test]
    fn test_replacing_the_message_sink_stops_the_old_receiver() {
        // テスト項目: ハンドラを置き換えると旧ハンドラへは届かなくなる（置き換え契約）
        // given (前提条件):
        let shared = shared_with(Arc::new(NoopQueryCache), Arc::new(MockNotifier::new()));
        let (old_tx, mut old_rx) = mpsc::unbounded_channel();
        shared.handlers.set_message_sink(old_tx);
        let (new_tx, mut new_rx) = mpsc::unbounded_channel();
        shared.handlers.set_message_sink(new_tx);

        // when (操作):
        shared.dispatch(ServerEvent::ReceiveMessage(chat_message("after replace")));

        // then (期待する結果):
        assert!(new_rx.try_recv().is_ok());
        assert!(old_rx.try_recv().is_err());
    }

    #[test]
    fn test_message_without_handler_is_dropped_quietly() {
        // テスト項目: ハンドラ未登録時の receiveMessage は黙って破棄される
        // given (前提条件):
        let shared = shared_with(Arc::new(NoopQueryCache), Arc::new(MockNotifier::new()));

        // when (操作) / then (期待する結果): panic しないこと
        shared.dispatch(ServerEvent::ReceiveMessage(chat_message("nobody listens")));
    }

    #[test]
    fn test_joined_escrow_room_requires_no_action() {
        // テスト項目: joinedEscrowRoom は情報通知のみで、キャッシュにも通知にも影響しない
        // given (前提条件):
        let mut cache = MockQueryCache::new();
        cache.expect_invalidate().times(0);
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(0);
        let shared = shared_with(Arc::new(cache), Arc::new(notifier));

        // when (操作):
        shared.dispatch(ServerEvent::JoinedEscrowRoom(serde_json::json!({
            "escrowContractAddress": "0xAAA"
        })));

        // then (期待する結果): mock の times(0) が drop 時に検証される
    }
}
