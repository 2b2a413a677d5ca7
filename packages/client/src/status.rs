//! Observable connection status.

use crate::error::SyncError;

/// Connection state of one synchronization handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No live transport. Also the terminal state after the reconnection
    /// policy is exhausted.
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Transport established; rooms are (being) joined.
    Connected,
}

/// Status snapshot published through the handle's watch channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStatus {
    /// Current connection state.
    pub state: ConnectionState,
    /// Most recent error, if any. Cleared on a successful connect.
    pub last_error: Option<SyncError>,
}

impl SyncStatus {
    /// Initial status: disconnected, no error recorded.
    pub fn disconnected() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            last_error: None,
        }
    }
}

impl Default for SyncStatus {
    fn default() -> Self {
        Self::disconnected()
    }
}
