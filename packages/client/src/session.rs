//! One connected WebSocket session.
//!
//! A session starts right after a successful handshake and ends when the
//! transport drops. It joins the current room set, then multiplexes three
//! sources: inbound frames, outbound events from the handle, and room set
//! replacements from the caller.

use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::protocol::Message};

use tsunagi_shared::protocol::{ClientEvent, ServerEvent};

use crate::{dispatch::SyncShared, error::SyncError, rooms::RoomSet};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Run a session on an established stream until the transport drops.
///
/// Always returns the error that ended the session; an orderly server
/// close is a connection error too, since rooms must be re-joined.
pub(crate) async fn run_session(
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    token: &str,
    rooms_rx: &mut watch::Receiver<RoomSet>,
    outbound_rx: &mut mpsc::UnboundedReceiver<ClientEvent>,
    shared: &SyncShared,
) -> SyncError {
    let (mut write, mut read) = stream.split();

    // Messages are never buffered across sessions: anything still queued
    // from the previous transport is dropped, not flushed.
    while let Ok(stale) = outbound_rx.try_recv() {
        tracing::debug!(?stale, "dropping outbound event from previous session");
    }

    // Rooms do not survive a reconnect server-side, so every session
    // starts by joining the full current set.
    let joins = rooms_rx.borrow_and_update().join_events(token);
    if let Err(error) = send_events(&mut write, joins).await {
        return error;
    }

    loop {
        tokio::select! {
            // biased: a closed transport must be observed before any
            // queued send is written to it.
            biased;

            inbound = read.next() => match inbound {
                Some(Ok(Message::Text(text))) => handle_frame(&text, shared),
                Some(Ok(Message::Close(_))) | None => {
                    return SyncError::Connection("closed by server".to_string());
                }
                Some(Ok(_)) => {} // ping/pong/binary: nothing to do
                Some(Err(error)) => {
                    return SyncError::Connection(error.to_string());
                }
            },
            Some(event) = outbound_rx.recv() => {
                if let Err(error) = send_events(&mut write, vec![event]).await {
                    return error;
                }
            },
            Ok(()) = rooms_rx.changed() => {
                let joins = rooms_rx.borrow_and_update().join_events(token);
                if let Err(error) = send_events(&mut write, joins).await {
                    return error;
                }
            },
        }
    }
}

/// Parse and dispatch one inbound text frame.
///
/// Frames that do not match a known server event are dropped; unknown
/// event names are how the backend ships features ahead of the client.
fn handle_frame(text: &str, shared: &SyncShared) {
    match serde_json::from_str::<ServerEvent>(text) {
        Ok(event) => shared.dispatch(event),
        Err(error) => {
            tracing::debug!(%error, frame = text, "ignoring unrecognized frame");
        }
    }
}

async fn send_events(write: &mut WsSink, events: Vec<ClientEvent>) -> Result<(), SyncError> {
    for event in events {
        let json = serde_json::to_string(&event)
            .map_err(|error| SyncError::Connection(format!("encode failed: {error}")))?;
        tracing::debug!(frame = %json, "sending frame");
        write
            .send(Message::Text(json.into()))
            .await
            .map_err(|error| SyncError::Connection(error.to_string()))?;
    }
    Ok(())
}
