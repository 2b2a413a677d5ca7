//! Real-time synchronization client for the escrow dashboard.
//!
//! This library keeps a dashboard view in sync with the escrow backend
//! over a WebSocket channel. It owns the connection lifecycle
//! (connect, bounded reconnection, teardown), re-joins escrow / dispute /
//! conversation rooms on every reconnect, routes server-pushed events to
//! the host application, and bridges `reload` hints into query cache
//! invalidation so dependent views refetch.
//!
//! The host application supplies its side of the integration through two
//! trait seams: [`QueryCache`] (marks cached query results stale) and
//! [`Notifier`] (surfaces non-blocking, user-visible notices).
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use tsunagi_client::{RoomSet, SyncClient, SyncConfig, TracingNotifier};
//! # use tsunagi_client::{QueryCache, QueryKey};
//! # struct AppCache;
//! # impl QueryCache for AppCache { fn invalidate(&self, _key: QueryKey) {} }
//!
//! # async fn example() {
//! let client = SyncClient::new(
//!     SyncConfig::from_env(),
//!     Arc::new(AppCache),
//!     Arc::new(TracingNotifier),
//! );
//!
//! let rooms = RoomSet::new()
//!     .with_escrow("0xAAA")
//!     .with_disputes(["0xBBB", "0xCCC"]);
//! let handle = client.open(rooms);
//! let mut messages = handle.messages();
//! while let Some(msg) = messages.recv().await {
//!     println!("{:?}", msg.message);
//! }
//! // dropping `handle` closes the connection and deregisters everything
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod notify;
pub mod rooms;
pub mod status;

mod dispatch;
mod handle;
mod runner;
mod session;

pub use cache::{QueryCache, QueryKey};
pub use config::{ReconnectPolicy, SyncConfig};
pub use error::SyncError;
pub use handle::{SyncClient, SyncHandle};
pub use notify::{Notice, Notifier, Severity, TracingNotifier};
pub use rooms::RoomSet;
pub use status::{ConnectionState, SyncStatus};

// Wire types the host application interacts with directly.
pub use tsunagi_shared::protocol::{ChatMessage, MediaAttachment};
