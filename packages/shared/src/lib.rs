//! Shared library for Tsunagi, the real-time synchronization layer of the
//! escrow dashboard.
//!
//! This crate holds the code shared between the client library and test
//! harnesses: the WebSocket wire protocol, time utilities, and logging
//! setup.

pub mod logger;
pub mod protocol;
pub mod time;
