//! Connection lifecycle with bounded reconnection.
//!
//! One runner per handle. The runner connects, hands the stream to the
//! session, and on loss retries with a fixed delay up to a fixed attempt
//! cap (no backoff, no jitter). The attempt counter resets on every
//! successful connect, so the cap bounds a single disconnection episode.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_tungstenite::connect_async;

use tsunagi_shared::protocol::ClientEvent;

use crate::{
    config::SyncConfig,
    dispatch::SyncShared,
    error::SyncError,
    notify::Notice,
    rooms::RoomSet,
    session::run_session,
    status::ConnectionState,
};

/// Drive one handle's connection until the policy is exhausted or the
/// task is aborted by the handle being dropped.
pub(crate) async fn run_sync(
    config: SyncConfig,
    token: String,
    mut rooms_rx: watch::Receiver<RoomSet>,
    mut outbound_rx: mpsc::UnboundedReceiver<ClientEvent>,
    shared: Arc<SyncShared>,
) {
    let mut attempt: u32 = 0;

    loop {
        shared.set_state(ConnectionState::Connecting);
        tracing::info!(
            url = %config.server_url,
            attempt = attempt + 1,
            max_attempts = config.reconnect.max_attempts,
            "connecting to sync server"
        );

        match connect_async(config.server_url.as_str()).await {
            Ok((stream, _response)) => {
                attempt = 0;
                shared.set_connected();
                tracing::info!("connected to sync server");

                let error =
                    run_session(stream, &token, &mut rooms_rx, &mut outbound_rx, &shared).await;

                tracing::warn!(%error, "sync connection lost");
                shared
                    .notifier
                    .notify(Notice::warning(format!("Realtime connection lost: {error}")));
                shared.set_disconnected(Some(error));
            }
            Err(error) => {
                tracing::warn!(%error, "failed to connect to sync server");
                shared
                    .notifier
                    .notify(Notice::error(format!("Realtime connection error: {error}")));
                shared.set_disconnected(Some(SyncError::Connection(error.to_string())));
            }
        }

        attempt += 1;
        if attempt >= config.reconnect.max_attempts {
            tracing::error!(
                attempts = config.reconnect.max_attempts,
                "giving up on sync server; views fall back to manual refresh"
            );
            return;
        }

        tracing::info!(
            delay_secs = config.reconnect.delay.as_secs_f64(),
            attempt = attempt + 1,
            max_attempts = config.reconnect.max_attempts,
            "reconnecting after delay"
        );
        tokio::time::sleep(config.reconnect.delay).await;
    }
}
