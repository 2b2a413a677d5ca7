//! Room membership: which escrow, dispute and conversation rooms this
//! handle should be joined to.
//!
//! Server-side membership does not survive a transport reconnect, so the
//! session re-sends the full join set on every `connect`. Duplicates and
//! empty identifiers are excluded before any join request is built.

use std::collections::HashSet;

use tsunagi_shared::protocol::{ClientEvent, DisputeRoomJoin, EscrowRoomJoin};

/// The set of rooms a handle wants to be a member of.
///
/// Identifiers are normalized (trimmed, de-duplicated, empties dropped)
/// when join events are built, not on insertion, so the caller can pass
/// raw lists straight from its own state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomSet {
    escrow: Option<String>,
    disputes: Vec<String>,
    conversation: Option<String>,
}

impl RoomSet {
    /// Empty room set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the escrow room (contract address).
    pub fn with_escrow(mut self, address: impl Into<String>) -> Self {
        self.escrow = Some(address.into());
        self
    }

    /// Set the dispute rooms (contract addresses).
    pub fn with_disputes<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disputes = addresses.into_iter().map(Into::into).collect();
        self
    }

    /// Set the chat conversation room.
    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation = Some(conversation_id.into());
        self
    }

    /// Whether the set contains no usable identifier after normalization.
    pub fn is_empty(&self) -> bool {
        normalize(self.escrow.as_deref()).is_none()
            && self.normalized_disputes().is_empty()
            && normalize(self.conversation.as_deref()).is_none()
    }

    /// Build the join events for this set, one per room.
    ///
    /// Escrow and dispute joins carry the auth token; a conversation join
    /// is the conversation id alone.
    pub fn join_events(&self, token: &str) -> Vec<ClientEvent> {
        let mut events = Vec::new();

        if let Some(address) = normalize(self.escrow.as_deref()) {
            events.push(ClientEvent::JoinEscrowRoom(EscrowRoomJoin {
                escrow_contract_address: address,
                token: token.to_string(),
            }));
        }

        for address in self.normalized_disputes() {
            events.push(ClientEvent::JoinDisputeRoom(DisputeRoomJoin {
                dispute_contract_address: address,
                token: token.to_string(),
            }));
        }

        if let Some(conversation_id) = normalize(self.conversation.as_deref()) {
            events.push(ClientEvent::JoinConversation(conversation_id));
        }

        events
    }

    /// Dispute addresses with empties dropped and duplicates removed,
    /// first occurrence wins.
    fn normalized_disputes(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.disputes
            .iter()
            .filter_map(|address| normalize(Some(address)))
            .filter(|address| seen.insert(address.clone()))
            .collect()
    }
}

fn normalize(identifier: Option<&str>) -> Option<String> {
    let trimmed = identifier?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
