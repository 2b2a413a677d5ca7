//! Client configuration: server endpoint, auth token, reconnection policy.

use std::time::Duration;

/// Environment variable holding the sync server URL.
pub const SERVER_URL_ENV_KEY: &str = "TSUNAGI_SERVER_URL";

/// Environment variable holding the persisted auth token.
pub const AUTH_TOKEN_ENV_KEY: &str = "TSUNAGI_AUTH_TOKEN";

/// Compiled-in fallback when no server URL is configured.
pub const DEFAULT_SERVER_URL: &str = "ws://127.0.0.1:8080/ws";

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Reconnection policy: fixed attempt cap, fixed delay.
///
/// No exponential backoff or jitter. The attempt counter resets on each
/// successful connect, so the cap bounds one disconnection episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Connection attempts per disconnection episode before giving up.
    pub max_attempts: u32,
    /// Delay between attempts.
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RECONNECT_ATTEMPTS,
            delay: Duration::from_secs(RECONNECT_INTERVAL_SECS),
        }
    }
}

/// Configuration for [`crate::SyncClient`].
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// WebSocket endpoint of the escrow backend.
    pub server_url: String,
    /// Auth token required for any room join. A missing token suppresses
    /// all connection attempts (an expected "not ready yet" state, not an
    /// error).
    pub token: Option<String>,
    /// Reconnection policy.
    pub reconnect: ReconnectPolicy,
}

impl SyncConfig {
    /// Create a config with an explicit server URL and token.
    pub fn new(server_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            server_url: server_url.into(),
            token,
            reconnect: ReconnectPolicy::default(),
        }
    }

    /// Read server URL and token from the environment.
    ///
    /// Falls back to [`DEFAULT_SERVER_URL`] when `TSUNAGI_SERVER_URL` is
    /// unset. An unset `TSUNAGI_AUTH_TOKEN` leaves the token `None`.
    pub fn from_env() -> Self {
        let server_url =
            std::env::var(SERVER_URL_ENV_KEY).unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        let token = std::env::var(AUTH_TOKEN_ENV_KEY).ok();
        Self::new(server_url, token)
    }
}
