//! Error types for the real-time synchronization client.

use thiserror::Error;

/// Errors surfaced by the synchronization client.
///
/// None of these are fatal to the host application; the worst case is a
/// degraded (disconnected) real-time channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Transport-level failure (handshake, read, write). Recovered
    /// automatically by the bounded reconnection policy.
    #[error("connection error: {0}")]
    Connection(String),

    /// The server rejected the auth token. Not auto-recovered; the host
    /// must re-authenticate and open a fresh connection.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// An emit was attempted while the transport is not connected.
    /// Rejected locally before any network activity.
    #[error("not connected to the sync server")]
    NotConnected,
}
